//! # Generate Handler
//!
//! Turns a free-text description into an invoice under review.
//!
//! ```text
//! POST /api/generate { "description": "Logo for Acme, 2 rounds at $400" }
//!        │
//!        ├── build_prompt(description, today)
//!        ├── extractor.complete(prompt)          (language model)
//!        ├── parse_model_output(text)            (strip fences, find JSON)
//!        ├── normalize_extracted(value, today)   (defaults + totals)
//!        └── editor.open(session)                (replaces current session)
//! ```

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use paylance_core::editor::EditSession;
use paylance_core::extraction::{build_prompt, normalize_extracted, parse_model_output};
use serde::Deserialize;
use tracing::info;

use super::{today, SessionView};
use crate::error::ApiError;
use crate::state::AppState;

/// Longest description accepted.
pub const MAX_DESCRIPTION_LEN: usize = 5000;

#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    #[serde(default)]
    pub description: String,
}

/// Generates an invoice from a description and opens it in the editor.
pub async fn generate_invoice(
    State(state): State<AppState>,
    Json(request): Json<GenerateRequest>,
) -> Result<(StatusCode, Json<SessionView>), ApiError> {
    let description = request.description.trim();
    if description.is_empty() {
        return Err(ApiError::validation("description is required"));
    }
    if description.chars().count() > MAX_DESCRIPTION_LEN {
        return Err(ApiError::validation(format!(
            "description must be at most {} characters",
            MAX_DESCRIPTION_LEN
        )));
    }

    let today = today();
    let prompt = build_prompt(description, today);
    let text = state.extractor.complete(&prompt).await?;

    let value = parse_model_output(&text)?;
    let invoice = normalize_extracted(value, today)?;

    info!(
        invoice_number = %invoice.invoice_number,
        items = invoice.items().len(),
        total = invoice.totals().total,
        "Invoice generated"
    );

    let invoice = state
        .editor
        .open(EditSession::new(invoice, state.stores()))
        .await;

    Ok((StatusCode::CREATED, Json(SessionView::from(&invoice))))
}
