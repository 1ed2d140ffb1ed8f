use axum::{
    Form,
    extract::{FromRequestParts, State},
    http::request::Parts,
    response::{Html, IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use std::sync::Arc;
use tower_sessions::Session;

use super::flash::{self, Flash, FlashLevel};
use super::{AppState, LOGIN_PATH, WebError, views};
use crate::services::{AuthError, AuthSession};

/// Session key holding the serialized [`AuthSession`].
const AUTH_KEY: &str = "auth";

// ============================================================================
// Guards
// ============================================================================

/// Outcome of an authorization check. The routing layer renders on
/// `Authorized` and redirects to the login page on `Unauthorized`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Access {
    Authorized(AuthSession),
    Unauthorized,
}

impl Access {
    /// A non-admin session asking for an admin page is treated exactly like
    /// an anonymous client.
    #[must_use]
    pub fn admit(current: Option<AuthSession>, admin_only: bool) -> Self {
        match current {
            Some(session) if !admin_only || session.is_admin => Self::Authorized(session),
            _ => Self::Unauthorized,
        }
    }
}

/// Reads the authenticated identity from the session. An unreadable session
/// counts as anonymous.
pub async fn current_session(session: &Session) -> Option<AuthSession> {
    match session.get::<AuthSession>(AUTH_KEY).await {
        Ok(current) => current,
        Err(e) => {
            tracing::warn!("Failed to read session: {e}");
            None
        }
    }
}

pub async fn require_session(session: &Session) -> Access {
    Access::admit(current_session(session).await, false)
}

pub async fn require_admin(session: &Session) -> Access {
    Access::admit(current_session(session).await, true)
}

fn redirect_to_login() -> Response {
    Redirect::to(LOGIN_PATH).into_response()
}

/// Extractor for routes that need any authenticated user.
pub struct CurrentUser(pub AuthSession);

/// Extractor for routes that need an administrator.
pub struct AdminUser(pub AuthSession);

async fn session_from_parts<S: Send + Sync>(
    parts: &mut Parts,
    state: &S,
) -> Result<Session, Response> {
    Session::from_request_parts(parts, state)
        .await
        .map_err(IntoResponse::into_response)
}

impl<S: Send + Sync> FromRequestParts<S> for CurrentUser {
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let session = session_from_parts(parts, state).await?;
        match require_session(&session).await {
            Access::Authorized(current) => {
                tracing::Span::current().record("user_id", current.user_id);
                Ok(Self(current))
            }
            Access::Unauthorized => Err(redirect_to_login()),
        }
    }
}

impl<S: Send + Sync> FromRequestParts<S> for AdminUser {
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let session = session_from_parts(parts, state).await?;
        match require_admin(&session).await {
            Access::Authorized(current) => {
                tracing::Span::current().record("user_id", current.user_id);
                Ok(Self(current))
            }
            Access::Unauthorized => Err(redirect_to_login()),
        }
    }
}

// ============================================================================
// Handlers
// ============================================================================

#[derive(Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// GET /
/// Sends the client to the page matching its role.
pub async fn home(session: Session) -> Redirect {
    match current_session(&session).await {
        None => Redirect::to(LOGIN_PATH),
        Some(current) if current.is_admin => Redirect::to("/admin"),
        Some(_) => Redirect::to("/registro"),
    }
}

/// GET /login
pub async fn login_form(session: Session) -> Result<Html<String>, WebError> {
    let flashes = flash::take(&session).await?;
    Ok(views::login_page(&flashes, ""))
}

/// POST /login
/// Authenticate with username and password and establish the session.
pub async fn login(
    State(state): State<Arc<AppState>>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Result<Response, WebError> {
    match state
        .auth_service()
        .login(&form.username, &form.password)
        .await
    {
        Ok(current) => {
            // New id on privilege change.
            session.cycle_id().await?;
            session.insert(AUTH_KEY, &current).await?;
            flash::push(&session, FlashLevel::Success, "Inicio de sesión exitoso").await?;
            Ok(Redirect::to("/").into_response())
        }
        Err(AuthError::InvalidCredentials) => {
            let mut flashes = flash::take(&session).await?;
            flashes.push(Flash::new(
                FlashLevel::Danger,
                "Usuario o contraseña incorrectos",
            ));
            Ok(views::login_page(&flashes, &form.username).into_response())
        }
        Err(e) => Err(e.into()),
    }
}

/// GET /logout
/// Drops every session value, then leaves a notice for the login page.
pub async fn logout(session: Session) -> Result<Redirect, WebError> {
    if let Some(current) = current_session(&session).await {
        tracing::info!(username = %current.username, "Logged out");
    }

    session.flush().await?;
    flash::push(
        &session,
        FlashLevel::Info,
        "Has cerrado sesión correctamente",
    )
    .await?;

    Ok(Redirect::to(LOGIN_PATH))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(is_admin: bool) -> AuthSession {
        AuthSession {
            user_id: 7,
            username: "usuario1".to_string(),
            is_admin,
        }
    }

    #[test]
    fn test_anonymous_is_unauthorized() {
        assert_eq!(Access::admit(None, false), Access::Unauthorized);
        assert_eq!(Access::admit(None, true), Access::Unauthorized);
    }

    #[test]
    fn test_non_admin_is_unauthorized_for_admin_pages() {
        assert_eq!(Access::admit(Some(session(false)), true), Access::Unauthorized);
        assert_eq!(
            Access::admit(Some(session(false)), false),
            Access::Authorized(session(false))
        );
    }

    #[test]
    fn test_admin_is_authorized_everywhere() {
        assert_eq!(
            Access::admit(Some(session(true)), true),
            Access::Authorized(session(true))
        );
        assert_eq!(
            Access::admit(Some(session(true)), false),
            Access::Authorized(session(true))
        );
    }
}
