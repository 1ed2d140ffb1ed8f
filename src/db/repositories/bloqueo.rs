use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use sea_orm::sea_query::{Alias, Expr, Func, SimpleExpr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use tracing::warn;

use crate::db::StoreError;
use crate::entities::{bloqueos, prelude::*};

/// Fields of a new record. `fecha` falls back to the insertion time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBloqueo {
    pub fecha: Option<NaiveDateTime>,
    pub departamento: String,
    pub placa: String,
    pub barcode: String,
    pub pin: String,
    pub motivo: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bloqueo {
    pub id: i32,
    pub fecha: NaiveDateTime,
    pub departamento: String,
    pub placa: String,
    pub barcode: String,
    pub pin: String,
    pub motivo: String,
    pub user_id: i32,
}

impl From<bloqueos::Model> for Bloqueo {
    fn from(model: bloqueos::Model) -> Self {
        Self {
            id: model.id,
            fecha: model.fecha,
            departamento: model.departamento,
            placa: model.placa,
            barcode: model.barcode,
            pin: model.pin,
            motivo: model.motivo,
            user_id: model.user_id,
        }
    }
}

/// A record together with the username of its author.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BloqueoEntry {
    pub bloqueo: Bloqueo,
    pub username: Option<String>,
}

pub struct BloqueoRepository {
    conn: DatabaseConnection,
}

impl BloqueoRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn create(&self, new: NewBloqueo, user_id: i32) -> Result<Bloqueo, StoreError> {
        let fecha = new
            .fecha
            .unwrap_or_else(|| chrono::Utc::now().naive_utc());

        let active = bloqueos::ActiveModel {
            fecha: Set(fecha),
            departamento: Set(new.departamento),
            placa: Set(new.placa),
            barcode: Set(new.barcode),
            pin: Set(new.pin),
            motivo: Set(new.motivo),
            user_id: Set(user_id),
            ..Default::default()
        };

        let model = active.insert(&self.conn).await?;
        Ok(Bloqueo::from(model))
    }

    /// All records in insertion order, joined with their author.
    pub async fn list_all(&self) -> Result<Vec<BloqueoEntry>> {
        let rows = Bloqueos::find()
            .find_also_related(Users)
            .order_by_asc(bloqueos::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to list bloqueos")?;

        Ok(rows
            .into_iter()
            .map(|(bloqueo, user)| BloqueoEntry {
                bloqueo: Bloqueo::from(bloqueo),
                username: user.map(|u| u.username),
            })
            .collect())
    }

    pub async fn list_for_user(&self, user_id: i32) -> Result<Vec<Bloqueo>> {
        let rows = Bloqueos::find()
            .filter(bloqueos::Column::UserId.eq(user_id))
            .order_by_asc(bloqueos::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to list bloqueos for user")?;

        Ok(rows.into_iter().map(Bloqueo::from).collect())
    }

    pub async fn count(&self) -> Result<u64> {
        Bloqueos::find()
            .count(&self.conn)
            .await
            .context("Failed to count bloqueos")
    }

    pub async fn count_by_department(&self) -> Result<Vec<(String, i64)>> {
        let rows: Vec<(String, i64)> = Bloqueos::find()
            .select_only()
            .column(bloqueos::Column::Departamento)
            .column_as(bloqueos::Column::Id.count(), "count")
            .group_by(bloqueos::Column::Departamento)
            .into_tuple()
            .all(&self.conn)
            .await
            .context("Failed to aggregate bloqueos by department")?;

        Ok(rows)
    }

    /// Counts per calendar day of `fecha`, oldest day first. Rows whose
    /// `fecha` SQLite cannot read as a date are left out of the series.
    pub async fn count_by_date(&self) -> Result<Vec<(String, i64)>> {
        let rows: Vec<(Option<String>, i64)> = Bloqueos::find()
            .select_only()
            .column_as(day_of_fecha(), "day")
            .column_as(bloqueos::Column::Id.count(), "count")
            .group_by(day_of_fecha())
            .order_by_asc(day_of_fecha())
            .into_tuple()
            .all(&self.conn)
            .await
            .context("Failed to aggregate bloqueos by date")?;

        let mut days = Vec::with_capacity(rows.len());
        for (day, count) in rows {
            match day {
                Some(day) => days.push((day, count)),
                None => warn!(count, "Skipping bloqueos with an unreadable fecha"),
            }
        }

        Ok(days)
    }

    /// The `limit` most frequent plates, most frequent first. Equal counts
    /// are ordered by plate so the cut-off is deterministic.
    pub async fn top_plates(&self, limit: u64) -> Result<Vec<(String, i64)>> {
        let rows: Vec<(String, i64)> = Bloqueos::find()
            .select_only()
            .column(bloqueos::Column::Placa)
            .column_as(bloqueos::Column::Id.count(), "count")
            .group_by(bloqueos::Column::Placa)
            .order_by_desc(bloqueos::Column::Id.count())
            .order_by_asc(bloqueos::Column::Placa)
            .limit(limit)
            .into_tuple()
            .all(&self.conn)
            .await
            .context("Failed to aggregate top plates")?;

        Ok(rows)
    }
}

/// `date(fecha)`, which SQLite renders as `YYYY-MM-DD`.
fn day_of_fecha() -> SimpleExpr {
    Func::cust(Alias::new("date"))
        .arg(Expr::col(bloqueos::Column::Fecha))
        .into()
}
