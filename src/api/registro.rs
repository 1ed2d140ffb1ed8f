use axum::{
    Form,
    extract::State,
    response::{Html, IntoResponse, Redirect, Response},
};
use std::sync::Arc;
use tower_sessions::Session;

use super::flash::{self, Flash, FlashLevel};
use super::{AppState, CurrentUser, WebError, views};
use crate::services::BloqueoForm;

/// GET /registro
pub async fn registro_form(
    State(state): State<Arc<AppState>>,
    CurrentUser(current): CurrentUser,
    session: Session,
) -> Result<Html<String>, WebError> {
    let flashes = flash::take(&session).await?;
    let own = state.record_service().list_own(&current).await?;

    Ok(views::registro_page(
        &current,
        &flashes,
        &BloqueoForm::default(),
        &own,
    ))
}

/// POST /registro
/// Stores the record and redirects back to an empty form. On failure the
/// form is re-rendered with the submitted values and the error text.
pub async fn registrar(
    State(state): State<Arc<AppState>>,
    CurrentUser(current): CurrentUser,
    session: Session,
    Form(form): Form<BloqueoForm>,
) -> Result<Response, WebError> {
    match state.record_service().submit(&form, &current).await {
        Ok(_) => {
            flash::push(
                &session,
                FlashLevel::Success,
                "Registro de bloqueo guardado exitosamente",
            )
            .await?;
            Ok(Redirect::to("/registro").into_response())
        }
        Err(e) => {
            tracing::warn!(user_id = current.user_id, error = %e, "Bloqueo rejected");

            let mut flashes = flash::take(&session).await?;
            flashes.push(Flash::new(
                FlashLevel::Danger,
                format!("Error al guardar el registro: {e}"),
            ));
            let own = state.record_service().list_own(&current).await?;

            Ok(views::registro_page(&current, &flashes, &form, &own).into_response())
        }
    }
}
