//! Autocomplete handlers for the client and item fields.
//!
//! With a session open the session's stores answer; otherwise the SQLite
//! stores are asked directly.

use axum::extract::{Query, State};
use axum::Json;
use paylance_core::memory::{ClientSuggestionStore, ItemSuggestionStore, SavedClient, SavedItem};
use paylance_core::validation::validate_search_query;
use serde::Deserialize;

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct SuggestionQuery {
    #[serde(default)]
    pub q: String,
}

/// Remembered clients matching `q`, most recent first.
pub async fn suggest_clients(
    State(state): State<AppState>,
    Query(query): Query<SuggestionQuery>,
) -> Result<Json<Vec<SavedClient>>, ApiError> {
    let guard = state.editor.lock().await;
    let clients = match guard.as_ref() {
        Some(session) => session.suggest_clients(&query.q).await?,
        None => {
            let q = validate_search_query(&query.q)?;
            state.db.inner().clients().search(&q).await?
        }
    };
    Ok(Json(clients))
}

/// Remembered items matching `q`, most used first.
pub async fn suggest_items(
    State(state): State<AppState>,
    Query(query): Query<SuggestionQuery>,
) -> Result<Json<Vec<SavedItem>>, ApiError> {
    let guard = state.editor.lock().await;
    let items = match guard.as_ref() {
        Some(session) => session.suggest_items(&query.q).await?,
        None => {
            let q = validate_search_query(&query.q)?;
            state.db.inner().items().search(&q).await?
        }
    };
    Ok(Json(items))
}
