//! # Editor Handlers
//!
//! The review form's round trips.
//!
//! ## Session Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  POST /api/generate ─┐                                                  │
//! │  POST /api/editor ───┼──► session open ──► POST /api/editor/edits ◄──┐ │
//! │  POST /invoices/{id}/edit                        │  (debounced draft) │ │
//! │                                                  └────────────────────┘ │
//! │                             │                                           │
//! │            ┌────────────────┴───────────────┐                           │
//! │            ▼                                ▼                           │
//! │  POST /api/editor/save              DELETE /api/editor                  │
//! │  validate, remember, persist        clear draft                         │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::Html;
use axum::Json;
use paylance_core::editor::{EditSession, InvoiceEdit};
use paylance_core::render::render_invoice;
use paylance_core::Invoice;
use tracing::{debug, info};

use super::{SessionView, TemplateQuery};
use crate::error::ApiError;
use crate::state::AppState;

/// Returns the invoice under review.
pub async fn get_session(State(state): State<AppState>) -> Result<Json<SessionView>, ApiError> {
    let invoice = state.editor.snapshot().await.ok_or_else(ApiError::no_session)?;
    Ok(Json(SessionView::from(&invoice)))
}

/// Starts a blank invoice, replacing whatever was open.
pub async fn start_session(
    State(state): State<AppState>,
) -> (StatusCode, Json<SessionView>) {
    let invoice = state.editor.open(EditSession::blank(state.stores())).await;
    debug!(invoice_number = %invoice.invoice_number, "Blank invoice started");
    (StatusCode::CREATED, Json(SessionView::from(&invoice)))
}

/// Closes the session and clears its draft.
pub async fn discard_session(State(state): State<AppState>) -> Result<StatusCode, ApiError> {
    match state.editor.close().await {
        Some(session) => session.discard().await?,
        None => state.db.inner().drafts().remove().await?,
    }
    info!("Editing session discarded");
    Ok(StatusCode::NO_CONTENT)
}

/// Applies a batch of edits. Nothing changes if any edit fails.
///
/// ## Example
/// ```json
/// [
///   { "op": "update_item", "index": 0, "quantity": "3", "rate": 120 },
///   { "op": "set_tax_rate", "value": 8.25 }
/// ]
/// ```
pub async fn apply_edits(
    State(state): State<AppState>,
    Json(edits): Json<Vec<InvoiceEdit>>,
) -> Result<Json<SessionView>, ApiError> {
    let view = {
        let mut guard = state.editor.lock().await;
        let session = guard.as_mut().ok_or_else(ApiError::no_session)?;

        let count = edits.len();
        session.apply_all(edits)?;
        debug!(count, total = session.invoice().totals().total, "Edits applied");

        SessionView::from(session.invoice())
    };

    state.editor.schedule_autosave();
    Ok(Json(view))
}

/// Validates and stores the invoice, then closes the session.
pub async fn save_session(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<Invoice>), ApiError> {
    let mut guard = state.editor.lock().await;
    let session = guard.as_mut().ok_or_else(ApiError::no_session)?;

    let invoice = session.finalize().await?;
    state.editor.cancel_autosave();

    let saved = match state.db.inner().invoices().save(&invoice).await {
        Ok(saved) => saved,
        Err(e) => {
            // finalize cleared the draft; put it back
            drop(guard);
            state.editor.schedule_autosave();
            return Err(e.into());
        }
    };

    *guard = None;
    info!(id = %saved.id, invoice_number = %saved.invoice_number, "Invoice saved");

    Ok((StatusCode::CREATED, Json(saved)))
}

/// Renders the invoice under review as HTML.
pub async fn preview_session(
    State(state): State<AppState>,
    Query(query): Query<TemplateQuery>,
) -> Result<Html<String>, ApiError> {
    let invoice = state.editor.snapshot().await.ok_or_else(ApiError::no_session)?;
    let branding = state.db.inner().settings().load_branding().await?;
    let template = query.resolve(&branding);

    Ok(Html(render_invoice(&invoice, &branding, template)?))
}
