use axum::{extract::State, response::Html};
use std::sync::Arc;
use tower_sessions::Session;

use super::flash;
use super::{AdminUser, AppState, WebError, views};

/// GET /admin
/// Every record from every user.
pub async fn list_bloqueos(
    State(state): State<Arc<AppState>>,
    AdminUser(current): AdminUser,
    session: Session,
) -> Result<Html<String>, WebError> {
    let flashes = flash::take(&session).await?;
    let entries = state.report_service().list_bloqueos().await?;

    Ok(views::admin_page(&current, &flashes, &entries))
}

/// GET /admin/graficos
pub async fn graficos(
    State(state): State<Arc<AppState>>,
    AdminUser(current): AdminUser,
    session: Session,
) -> Result<Html<String>, WebError> {
    let flashes = flash::take(&session).await?;
    let dashboard = state.report_service().build_dashboard().await?;

    Ok(views::graficos_page(&current, &flashes, &dashboard))
}
