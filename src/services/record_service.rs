//! Domain service for entering bloqueo records.
//!
//! Validation happens here, before anything reaches the store, so a rejected
//! submission never leaves a partial row behind.

use chrono::NaiveDate;
use serde::Deserialize;
use thiserror::Error;

use crate::db::{Bloqueo, NewBloqueo, StoreError};
use crate::services::auth_service::AuthSession;

pub const FECHA_FORMAT: &str = "%Y-%m-%d";

const DEPARTAMENTO_MAX_LEN: usize = 100;
const PLACA_MAX_LEN: usize = 20;
const BARCODE_MAX_LEN: usize = 50;
const PIN_MAX_LEN: usize = 10;

#[derive(Debug, Error)]
pub enum RecordError {
    #[error("{0}")]
    Validation(String),

    /// Foreign-key or uniqueness violation reported by the database.
    #[error("{0}")]
    Integrity(String),

    #[error("{0}")]
    Database(String),
}

impl From<StoreError> for RecordError {
    fn from(err: StoreError) -> Self {
        if err.is_constraint_violation() {
            Self::Integrity(err.to_string())
        } else {
            Self::Database(err.to_string())
        }
    }
}

impl From<anyhow::Error> for RecordError {
    fn from(err: anyhow::Error) -> Self {
        Self::Database(err.to_string())
    }
}

/// Raw form fields as submitted from the entry page.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BloqueoForm {
    pub fecha: Option<String>,
    pub departamento: Option<String>,
    pub placa: Option<String>,
    pub barcode: Option<String>,
    pub pin: Option<String>,
    pub motivo: Option<String>,
}

/// Checks a submission and converts it into a storable record.
pub fn validate_form(form: &BloqueoForm) -> Result<NewBloqueo, RecordError> {
    let fecha_raw = required("fecha", form.fecha.as_deref(), None)?;
    if !is_iso_date_shape(&fecha_raw) {
        return Err(RecordError::Validation(format!(
            "fecha '{fecha_raw}' no es una fecha válida (AAAA-MM-DD)"
        )));
    }
    let fecha = NaiveDate::parse_from_str(&fecha_raw, FECHA_FORMAT)
        .map_err(|e| {
            RecordError::Validation(format!(
                "fecha '{fecha_raw}' no es una fecha válida (AAAA-MM-DD): {e}"
            ))
        })?
        .and_hms_opt(0, 0, 0);

    Ok(NewBloqueo {
        fecha,
        departamento: required(
            "departamento",
            form.departamento.as_deref(),
            Some(DEPARTAMENTO_MAX_LEN),
        )?,
        placa: required("placa", form.placa.as_deref(), Some(PLACA_MAX_LEN))?,
        barcode: required("barcode", form.barcode.as_deref(), Some(BARCODE_MAX_LEN))?,
        pin: required("pin", form.pin.as_deref(), Some(PIN_MAX_LEN))?,
        motivo: required("motivo", form.motivo.as_deref(), None)?,
    })
}

/// `%Y` alone also accepts signed and five-digit years, which SQLite's
/// date functions cannot read back.
fn is_iso_date_shape(raw: &str) -> bool {
    let bytes = raw.as_bytes();
    bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        })
}

fn required(field: &str, value: Option<&str>, max_len: Option<usize>) -> Result<String, RecordError> {
    let value = value.map(str::trim).unwrap_or_default();

    if value.is_empty() {
        return Err(RecordError::Validation(format!(
            "el campo '{field}' es obligatorio"
        )));
    }

    if let Some(max) = max_len
        && value.chars().count() > max
    {
        return Err(RecordError::Validation(format!(
            "el campo '{field}' admite como máximo {max} caracteres"
        )));
    }

    Ok(value.to_string())
}

/// Domain service trait for record entry.
#[async_trait::async_trait]
pub trait RecordService: Send + Sync {
    /// Validates and stores a record attributed to `session.user_id`.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::Validation`] for malformed input and
    /// [`RecordError::Integrity`] when the author does not exist.
    async fn submit(&self, form: &BloqueoForm, session: &AuthSession) -> Result<Bloqueo, RecordError>;

    /// Records entered by the session's user, oldest first.
    async fn list_own(&self, session: &AuthSession) -> Result<Vec<Bloqueo>, RecordError>;
}
