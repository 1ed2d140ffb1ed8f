use anyhow::{Context, Result};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use std::path::Path;
use std::time::Duration;
use tracing::{info, warn};

use crate::config::{SecurityConfig, SeedUser};

mod error;
pub mod migrator;
pub mod repositories;

pub use error::StoreError;
pub use repositories::bloqueo::{Bloqueo, BloqueoEntry, NewBloqueo};
pub use repositories::user::User;

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        if !db_url.contains(":memory:") {
            let path_str = db_url.trim_start_matches("sqlite:");
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)
                    .with_context(|| format!("Failed to create database file: {path_str}"))?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    fn user_repo(&self) -> repositories::user::UserRepository {
        repositories::user::UserRepository::new(self.conn.clone())
    }

    fn bloqueo_repo(&self) -> repositories::bloqueo::BloqueoRepository {
        repositories::bloqueo::BloqueoRepository::new(self.conn.clone())
    }

    /// Creates every configured seed account that does not exist yet.
    /// Runs after migrations, so both tables are guaranteed to exist.
    /// Returns the number of accounts created.
    pub async fn seed_users(&self, seeds: &[SeedUser], security: &SecurityConfig) -> Result<usize> {
        let mut created = 0;

        for seed in seeds {
            if self.get_user_by_username(&seed.username).await?.is_some() {
                continue;
            }

            match self
                .create_user_with_password(&seed.username, &seed.password, seed.is_admin, security)
                .await
            {
                Ok(_) => {
                    created += 1;
                    info!(
                        username = %seed.username,
                        is_admin = seed.is_admin,
                        "Seed account created"
                    );
                }
                // Another process seeded the same account between the check and the insert.
                Err(e) if matches!(e.downcast_ref::<StoreError>(), Some(StoreError::UniqueViolation(_))) => {
                    warn!(username = %seed.username, "Seed account already exists");
                }
                Err(e) => return Err(e),
            }
        }

        Ok(created)
    }

    pub async fn create_user(
        &self,
        username: &str,
        password_hash: &str,
        is_admin: bool,
    ) -> Result<User, StoreError> {
        self.user_repo()
            .create(username, password_hash, is_admin)
            .await
    }

    /// Hashes `password` off the async executor, then inserts the user.
    pub async fn create_user_with_password(
        &self,
        username: &str,
        password: &str,
        is_admin: bool,
        security: &SecurityConfig,
    ) -> Result<User> {
        let password = password.to_string();
        let security = security.clone();
        let password_hash = tokio::task::spawn_blocking(move || {
            repositories::user::hash_password(&password, Some(&security))
        })
        .await
        .context("Password hashing task panicked")??;

        let user = self.create_user(username, &password_hash, is_admin).await?;
        Ok(user)
    }

    pub async fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        self.user_repo().get_by_username(username).await
    }

    pub async fn verify_user_password(&self, username: &str, password: &str) -> Result<Option<User>> {
        self.user_repo().verify_password(username, password).await
    }

    pub async fn create_bloqueo(&self, new: NewBloqueo, user_id: i32) -> Result<Bloqueo, StoreError> {
        self.bloqueo_repo().create(new, user_id).await
    }

    pub async fn list_bloqueos(&self) -> Result<Vec<BloqueoEntry>> {
        self.bloqueo_repo().list_all().await
    }

    pub async fn list_bloqueos_for_user(&self, user_id: i32) -> Result<Vec<Bloqueo>> {
        self.bloqueo_repo().list_for_user(user_id).await
    }

    pub async fn count_bloqueos(&self) -> Result<u64> {
        self.bloqueo_repo().count().await
    }

    pub async fn count_bloqueos_by_department(&self) -> Result<Vec<(String, i64)>> {
        self.bloqueo_repo().count_by_department().await
    }

    pub async fn count_bloqueos_by_date(&self) -> Result<Vec<(String, i64)>> {
        self.bloqueo_repo().count_by_date().await
    }

    pub async fn top_plates(&self, limit: u64) -> Result<Vec<(String, i64)>> {
        self.bloqueo_repo().top_plates(limit).await
    }
}
