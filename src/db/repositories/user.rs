use anyhow::{Context, Result};
use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use tokio::task;

use crate::config::SecurityConfig;
use crate::db::StoreError;
use crate::entities::users;

/// User data returned from repository (without sensitive password hash)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: i32,
    pub username: String,
    pub is_admin: bool,
}

impl From<users::Model> for User {
    fn from(model: users::Model) -> Self {
        Self {
            id: model.id,
            username: model.username,
            is_admin: model.is_admin,
        }
    }
}

pub struct UserRepository {
    conn: DatabaseConnection,
}

impl UserRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Insert a user whose password has already been hashed.
    pub async fn create(
        &self,
        username: &str,
        password_hash: &str,
        is_admin: bool,
    ) -> Result<User, StoreError> {
        let active = users::ActiveModel {
            username: Set(username.to_string()),
            password_hash: Set(password_hash.to_string()),
            is_admin: Set(is_admin),
            ..Default::default()
        };

        let model = active.insert(&self.conn).await?;
        Ok(User::from(model))
    }

    /// Get user by username
    pub async fn get_by_username(&self, username: &str) -> Result<Option<User>> {
        let user = users::Entity::find()
            .filter(users::Column::Username.eq(username))
            .one(&self.conn)
            .await
            .context("Failed to query user by username")?;

        Ok(user.map(User::from))
    }

    /// Verify password for a user, returning the user when it matches.
    /// Note: This uses `spawn_blocking` because Argon2 hashing is CPU-intensive
    /// and would block the async runtime if run directly.
    pub async fn verify_password(&self, username: &str, password: &str) -> Result<Option<User>> {
        let user = users::Entity::find()
            .filter(users::Column::Username.eq(username))
            .one(&self.conn)
            .await
            .context("Failed to query user for password verification")?;

        let Some(user) = user else {
            return Ok(None);
        };

        let password_hash = user.password_hash.clone();
        let password = password.to_string();

        let is_valid = task::spawn_blocking(move || verify_password_hash(&password, &password_hash))
            .await
            .context("Password verification task panicked")??;

        Ok(is_valid.then(|| User::from(user)))
    }
}

/// Hash a password using Argon2id with optional custom params.
/// If config is None, uses the argon2 crate defaults.
pub fn hash_password(password: &str, config: Option<&SecurityConfig>) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);

    let argon2 = if let Some(cfg) = config {
        let params = Params::new(
            cfg.argon2_memory_cost_kib,
            cfg.argon2_time_cost,
            cfg.argon2_parallelism,
            None, // output length (use default)
        )
        .map_err(|e| anyhow::anyhow!("Invalid Argon2 params: {e}"))?;
        Argon2::new(Algorithm::Argon2id, Version::V0x13, params)
    } else {
        Argon2::default()
    };

    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {e}"))?;

    Ok(hash.to_string())
}

/// Check a password against a stored PHC string. The parameters embedded in
/// the hash are used, so hashes made with any cost settings still verify.
pub fn verify_password_hash(password: &str, password_hash: &str) -> Result<bool> {
    let parsed_hash = PasswordHash::new(password_hash)
        .map_err(|e| anyhow::anyhow!("Invalid password hash format: {e}"))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cheap_config() -> SecurityConfig {
        SecurityConfig {
            argon2_memory_cost_kib: 1024,
            argon2_time_cost: 1,
            argon2_parallelism: 1,
        }
    }

    #[test]
    fn test_hash_is_salted_and_verifies() {
        let config = cheap_config();
        let first = hash_password("admin123", Some(&config)).unwrap();
        let second = hash_password("admin123", Some(&config)).unwrap();

        assert_ne!(first, second);
        assert!(first.starts_with("$argon2id$"));
        assert!(!first.contains("admin123"));

        assert!(verify_password_hash("admin123", &first).unwrap());
        assert!(verify_password_hash("admin123", &second).unwrap());
        assert!(!verify_password_hash("admin124", &first).unwrap());
    }

    #[test]
    fn test_invalid_stored_hash_is_an_error() {
        assert!(verify_password_hash("admin123", "admin123").is_err());
    }

    #[test]
    fn test_invalid_params_are_rejected() {
        let config = SecurityConfig {
            argon2_memory_cost_kib: 0,
            ..cheap_config()
        };
        assert!(hash_password("secret", Some(&config)).is_err());
    }
}
