//! # State Module
//!
//! Shared state handed to every handler.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    State Architecture                                   │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                      AppState (Clone)                           │   │
//! │  │  Router::new()...with_state(state)                              │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                              │                                          │
//! │          ┌──────────────────┼──────────────────┐                       │
//! │          ▼                  ▼                  ▼                        │
//! │  ┌──────────────┐  ┌──────────────────┐  ┌──────────────────┐          │
//! │  │   DbState    │  │   EditorState    │  │ InvoiceExtractor │          │
//! │  │              │  │                  │  │                  │          │
//! │  │  Database    │  │  Mutex<Option<   │  │  LLM client      │          │
//! │  │  (SQLite     │  │   EditSession>>  │  │  (dyn trait)     │          │
//! │  │   pool)      │  │  + autosave gen  │  │                  │          │
//! │  └──────────────┘  └──────────────────┘  └──────────────────┘          │
//! │                                                                         │
//! │  THREAD SAFETY:                                                        │
//! │  • DbState: Database has internal connection pool (thread-safe)        │
//! │  • EditorState: tokio Mutex, held across each edit                     │
//! │  • Extractor / Config: read-only after initialization                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod db;
mod editor;

use std::sync::Arc;

use paylance_core::editor::{EditSession, SessionStores};
use paylance_db::Database;
use tracing::info;

use crate::config::AppConfig;
use crate::error::ApiError;
use crate::llm::InvoiceExtractor;

pub use db::DbState;
pub use editor::EditorState;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DbState>,
    pub editor: EditorState,
    pub extractor: Arc<dyn InvoiceExtractor>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(db: Database, extractor: Arc<dyn InvoiceExtractor>, config: AppConfig) -> Self {
        AppState {
            db: Arc::new(DbState::new(db)),
            editor: EditorState::new(config.autosave_delay()),
            extractor,
            config: Arc::new(config),
        }
    }

    /// Builds the state and reopens a stored draft, if there is one.
    pub async fn initialize(
        db: Database,
        extractor: Arc<dyn InvoiceExtractor>,
        config: AppConfig,
    ) -> Result<Self, ApiError> {
        let state = AppState::new(db, extractor, config);

        if let Some(session) = EditSession::resume(state.stores()).await? {
            info!(
                invoice_number = %session.invoice().invoice_number,
                "Resuming draft"
            );
            state.editor.restore(session).await;
        }

        Ok(state)
    }

    /// SQLite-backed stores for a new editing session.
    pub fn stores(&self) -> SessionStores {
        self.db.inner().session_stores()
    }
}
