use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use std::fmt;

use crate::services::{AuthError, RecordError, ReportError};

use super::views;

/// Failures that leave no page to re-render. Expected user errors (bad
/// credentials, invalid records, missing session) never reach this type.
#[derive(Debug)]
pub enum WebError {
    DatabaseError(String),

    SessionError(String),

    InternalError(String),
}

impl fmt::Display for WebError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WebError::DatabaseError(msg) => write!(f, "Database error: {}", msg),
            WebError::SessionError(msg) => write!(f, "Session error: {}", msg),
            WebError::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for WebError {}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        match &self {
            WebError::DatabaseError(msg) => tracing::error!("Database error: {}", msg),
            WebError::SessionError(msg) => tracing::error!("Session error: {}", msg),
            WebError::InternalError(msg) => tracing::error!("Internal error: {}", msg),
        }

        let message = match self {
            WebError::DatabaseError(_) => "Ocurrió un error en la base de datos",
            WebError::SessionError(_) => "No se pudo leer la sesión, vuelve a iniciar sesión",
            WebError::InternalError(_) => "Ocurrió un error interno",
        };

        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Html(views::error_page(message)),
        )
            .into_response()
    }
}

impl From<anyhow::Error> for WebError {
    fn from(err: anyhow::Error) -> Self {
        WebError::InternalError(err.to_string())
    }
}

impl From<tower_sessions::session::Error> for WebError {
    fn from(err: tower_sessions::session::Error) -> Self {
        WebError::SessionError(err.to_string())
    }
}

impl From<AuthError> for WebError {
    fn from(err: AuthError) -> Self {
        WebError::InternalError(err.to_string())
    }
}

impl From<RecordError> for WebError {
    fn from(err: RecordError) -> Self {
        WebError::DatabaseError(err.to_string())
    }
}

impl From<ReportError> for WebError {
    fn from(err: ReportError) -> Self {
        WebError::DatabaseError(err.to_string())
    }
}
