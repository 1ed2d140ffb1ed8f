use anyhow::Context;
use axum::{Router, middleware, routing::get};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tower_sessions::{Expiry, SessionManagerLayer};
use tower_sessions_sqlx_store::SqliteStore;

use crate::config::Config;
use crate::services::{AuthService, RecordService, ReportService};
use crate::state::SharedState;

mod admin;
pub mod auth;
mod error;
pub mod flash;
mod observability;
mod registro;
pub mod views;

pub use auth::{Access, AdminUser, CurrentUser};
pub use error::WebError;

pub const LOGIN_PATH: &str = "/login";
pub const SESSION_COOKIE_NAME: &str = "bloqueos_session";

#[derive(Clone)]
pub struct AppState {
    pub shared: Arc<SharedState>,

    pub prometheus_handle: Option<PrometheusHandle>,
}

impl AppState {
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.shared.config
    }

    #[must_use]
    pub fn store(&self) -> &crate::db::Store {
        &self.shared.store
    }

    #[must_use]
    pub fn auth_service(&self) -> &Arc<dyn AuthService> {
        &self.shared.auth_service
    }

    #[must_use]
    pub fn record_service(&self) -> &Arc<dyn RecordService> {
        &self.shared.record_service
    }

    #[must_use]
    pub fn report_service(&self) -> &Arc<dyn ReportService> {
        &self.shared.report_service
    }
}

#[must_use]
pub fn create_app_state(
    shared: Arc<SharedState>,
    prometheus_handle: Option<PrometheusHandle>,
) -> Arc<AppState> {
    Arc::new(AppState {
        shared,
        prometheus_handle,
    })
}

pub async fn create_app_state_from_config(
    config: Config,
    prometheus_handle: Option<PrometheusHandle>,
) -> anyhow::Result<Arc<AppState>> {
    let shared = Arc::new(SharedState::new(config).await?);
    Ok(create_app_state(shared, prometheus_handle))
}

/// Session records live in the application database next to the two
/// domain tables; the cookie only carries the session id.
pub async fn session_store(state: &AppState) -> anyhow::Result<SqliteStore> {
    let pool = state.store().conn.get_sqlite_connection_pool().clone();
    let session_store = SqliteStore::new(pool);
    session_store
        .migrate()
        .await
        .context("Failed to prepare session table")?;
    Ok(session_store)
}

fn session_layer(state: &AppState, store: SqliteStore) -> SessionManagerLayer<SqliteStore> {
    let server = &state.config().server;

    SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_secure(server.secure_cookies)
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(time::Duration::minutes(
            server.session_inactivity_minutes,
        )))
}

pub async fn router(state: Arc<AppState>) -> anyhow::Result<Router> {
    let store = session_store(&state).await?;
    router_with_session_store(state, store)
}

/// Builds the router around an existing session store, so the caller can
/// also run expired-session cleanup against it.
pub fn router_with_session_store(
    state: Arc<AppState>,
    store: SqliteStore,
) -> anyhow::Result<Router> {
    let session_layer = session_layer(&state, store);
    let security_headers =
        observability::SecurityHeaders::new(&state.config().server.script_sources)?;

    Ok(Router::new()
        .route("/", get(auth::home))
        .route(LOGIN_PATH, get(auth::login_form).post(auth::login))
        .route("/logout", get(auth::logout))
        .route(
            "/registro",
            get(registro::registro_form).post(registro::registrar),
        )
        .route("/admin", get(admin::list_bloqueos))
        .route("/admin/graficos", get(admin::graficos))
        .route("/admin/metrics", get(observability::get_metrics))
        .layer(session_layer)
        .with_state(state)
        .layer(middleware::from_fn(observability::logging_middleware))
        .layer(middleware::from_fn_with_state(
            security_headers,
            observability::security_headers_middleware,
        ))
        .layer(TraceLayer::new_for_http()))
}
