//! Dashboard statistics handler.

use axum::extract::State;
use axum::Json;
use paylance_core::stats::{dashboard_stats, DashboardStats};
use paylance_db::InvoiceSort;

use super::today;
use crate::error::ApiError;
use crate::state::AppState;

/// Headline figures over every saved invoice.
pub async fn get_stats(State(state): State<AppState>) -> Result<Json<DashboardStats>, ApiError> {
    let invoices = state
        .db
        .inner()
        .invoices()
        .list(InvoiceSort::default())
        .await?;

    Ok(Json(dashboard_stats(&invoices, today())))
}
