//! # Invoice Handlers
//!
//! Saved invoices: the list, the read-only view and its actions.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Html;
use axum::Json;
use paylance_core::editor::EditSession;
use paylance_core::render::render_invoice;
use paylance_core::InvoiceStatus;
use paylance_db::{DbError, InvoiceSort};
use serde::Deserialize;
use tracing::info;

use super::{today, InvoiceDetail, SessionView, TemplateQuery};
use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    /// Sort key such as `-created_at` or `total`.
    #[serde(default)]
    pub order: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    pub status: InvoiceStatus,
}

/// Lists saved invoices, newest first unless `?order=` says otherwise.
pub async fn list_invoices(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<InvoiceDetail>>, ApiError> {
    let sort: InvoiceSort = query.order.as_deref().unwrap_or_default().parse()?;
    let today = today();

    let invoices = state.db.inner().invoices().list(sort).await?;
    Ok(Json(
        invoices
            .into_iter()
            .map(|invoice| InvoiceDetail::new(invoice, today))
            .collect(),
    ))
}

/// Gets one invoice.
pub async fn get_invoice(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<InvoiceDetail>, ApiError> {
    let invoice = state
        .db
        .inner()
        .invoices()
        .get_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("Invoice", &id))?;

    Ok(Json(InvoiceDetail::new(invoice, today())))
}

/// Deletes one invoice.
pub async fn delete_invoice(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.db.inner().invoices().delete(&id).await?;
    info!(id = %id, "Invoice deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// Changes the stored status (e.g. marks an invoice paid).
pub async fn update_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<StatusRequest>,
) -> Result<Json<InvoiceDetail>, ApiError> {
    let invoices = state.db.inner().invoices();
    invoices.update_status(&id, request.status).await?;

    let invoice = invoices
        .get_by_id(&id)
        .await?
        .ok_or_else(|| DbError::not_found("Invoice", &id))?;

    info!(id = %id, status = %request.status, "Invoice status changed");
    Ok(Json(InvoiceDetail::new(invoice, today())))
}

/// Opens a saved invoice in the editor.
pub async fn edit_invoice(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SessionView>, ApiError> {
    let invoice = state
        .db
        .inner()
        .invoices()
        .get_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("Invoice", &id))?;

    let invoice = state
        .editor
        .open(EditSession::new(invoice, state.stores()))
        .await;

    Ok(Json(SessionView::from(&invoice)))
}

/// Renders a saved invoice as a standalone HTML document.
pub async fn render(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<TemplateQuery>,
) -> Result<Html<String>, ApiError> {
    let db = state.db.inner();
    let invoice = db
        .invoices()
        .get_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("Invoice", &id))?;
    let branding = db.settings().load_branding().await?;
    let template = query.resolve(&branding);

    Ok(Html(render_invoice(&invoice, &branding, template)?))
}
