//! Domain service for authentication.
//!
//! Verifies credentials and produces the [`AuthSession`] value that the web
//! layer stores in the client's session.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors specific to authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Unknown username and wrong password are reported identically.
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<anyhow::Error> for AuthError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// Identity and role of an authenticated client.
///
/// Built once at login and never mutated; the web layer reads a copy of it
/// from the session store on every request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthSession {
    pub user_id: i32,
    pub username: String,
    pub is_admin: bool,
}

/// Domain service trait for authentication.
#[async_trait::async_trait]
pub trait AuthService: Send + Sync {
    /// Verifies credentials and returns the session to establish.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidCredentials`] if login fails.
    async fn login(&self, username: &str, password: &str) -> Result<AuthSession, AuthError>;
}
