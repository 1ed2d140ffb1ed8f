use std::sync::Arc;

use crate::config::Config;
use crate::db::Store;
use crate::services::{
    AuthService, RecordService, ReportService, SeaOrmAuthService, SeaOrmRecordService,
    SeaOrmReportService,
};

#[derive(Clone)]
pub struct SharedState {
    pub config: Arc<Config>,

    pub store: Store,

    pub auth_service: Arc<dyn AuthService>,

    pub record_service: Arc<dyn RecordService>,

    pub report_service: Arc<dyn ReportService>,
}

impl SharedState {
    /// Opens the database, applies migrations, then seeds the configured
    /// accounts. Seeding always happens after the schema exists.
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let store = Store::with_pool_options(
            &config.general.database_path,
            config.general.max_db_connections,
            config.general.min_db_connections,
        )
        .await?;

        let created = store
            .seed_users(&config.seed_users, &config.security)
            .await?;
        if created > 0 {
            tracing::info!("Seeded {} account(s)", created);
        }

        let auth_service =
            Arc::new(SeaOrmAuthService::new(store.clone())) as Arc<dyn AuthService>;

        let record_service = Arc::new(SeaOrmRecordService::new(store.clone()))
            as Arc<dyn RecordService>;

        let report_service = Arc::new(SeaOrmReportService::new(store.clone()))
            as Arc<dyn ReportService>;

        Ok(Self {
            config: Arc::new(config),
            store,
            auth_service,
            record_service,
            report_service,
        })
    }
}
