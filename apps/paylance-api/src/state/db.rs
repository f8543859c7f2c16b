//! # Database State
//!
//! Wraps the `Database` connection for use in handlers.
//!
//! ## Thread Safety
//! The `Database` struct from `paylance-db` contains a `SqlitePool` which
//! is inherently thread-safe. Multiple requests can execute queries
//! concurrently without explicit locking.
//!
//! ## Usage in Handlers
//! ```rust,ignore
//! async fn list_invoices(State(state): State<AppState>) -> Result<Json<Vec<Invoice>>, ApiError> {
//!     let invoices = state.db.inner().invoices().list(InvoiceSort::default()).await?;
//!     Ok(Json(invoices))
//! }
//! ```

use paylance_db::Database;

/// Wrapper around `Database` for shared handler state.
#[derive(Debug)]
pub struct DbState {
    db: Database,
}

impl DbState {
    /// Creates a new DbState wrapping the database connection.
    pub fn new(db: Database) -> Self {
        DbState { db }
    }

    /// Returns a reference to the inner Database.
    pub fn inner(&self) -> &Database {
        &self.db
    }
}
