//! `SeaORM` implementation of the `AuthService` trait.

use crate::db::Store;
use crate::services::auth_service::{AuthError, AuthService, AuthSession};
use async_trait::async_trait;

pub struct SeaOrmAuthService {
    store: Store,
}

impl SeaOrmAuthService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }
}

#[async_trait]
impl AuthService for SeaOrmAuthService {
    async fn login(&self, username: &str, password: &str) -> Result<AuthSession, AuthError> {
        if username.is_empty() || password.is_empty() {
            return Err(AuthError::InvalidCredentials);
        }

        let outcome = self.store.verify_user_password(username, password).await;

        let user = match outcome {
            Ok(Some(user)) => user,
            Ok(None) => {
                metrics::counter!("login_attempts_total", "outcome" => "rejected").increment(1);
                tracing::info!(username = %username, "Login rejected");
                return Err(AuthError::InvalidCredentials);
            }
            Err(e) => {
                metrics::counter!("login_attempts_total", "outcome" => "error").increment(1);
                return Err(e.into());
            }
        };

        metrics::counter!("login_attempts_total", "outcome" => "accepted").increment(1);
        tracing::info!(username = %user.username, is_admin = user.is_admin, "Login accepted");

        Ok(AuthSession {
            user_id: user.id,
            username: user.username,
            is_admin: user.is_admin,
        })
    }
}
