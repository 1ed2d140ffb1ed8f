//! `SeaORM` implementation of the `RecordService` trait.

use crate::db::{Bloqueo, Store};
use crate::services::auth_service::AuthSession;
use crate::services::record_service::{BloqueoForm, RecordError, RecordService, validate_form};
use async_trait::async_trait;

pub struct SeaOrmRecordService {
    store: Store,
}

impl SeaOrmRecordService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }
}

#[async_trait]
impl RecordService for SeaOrmRecordService {
    async fn submit(&self, form: &BloqueoForm, session: &AuthSession) -> Result<Bloqueo, RecordError> {
        let new = validate_form(form)?;

        let bloqueo = self.store.create_bloqueo(new, session.user_id).await?;

        metrics::counter!("bloqueos_created_total").increment(1);
        tracing::info!(
            bloqueo_id = bloqueo.id,
            user_id = session.user_id,
            placa = %bloqueo.placa,
            "Bloqueo recorded"
        );

        Ok(bloqueo)
    }

    async fn list_own(&self, session: &AuthSession) -> Result<Vec<Bloqueo>, RecordError> {
        Ok(self.store.list_bloqueos_for_user(session.user_id).await?)
    }
}
