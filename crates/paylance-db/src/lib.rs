//! # paylance-db: Database Layer for PayLance
//!
//! SQLite storage for invoices, suggestion memory, the draft slot and
//! settings, using sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        PayLance Data Flow                               │
//! │                                                                         │
//! │  HTTP handler (save invoice)                                           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   paylance-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌─────────────────┐   ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories   │   │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │                 │   │  (embedded)  │  │   │
//! │  │   │               │    │ InvoiceRepo     │   │              │  │   │
//! │  │   │ SqlitePool    │◄───│ Client/ItemMem  │   │ 001_init.sql │  │   │
//! │  │   │               │    │ DraftRepo       │   │              │  │   │
//! │  │   │               │    │ SettingsRepo    │   │              │  │   │
//! │  │   └───────────────┘    └─────────────────┘   └──────────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite database in the platform data directory (paylance.db)          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use paylance_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("paylance.db")).await?;
//! let saved = db.invoices().save(&invoice).await?;
//! let recent = db.invoices().list("-created_at".parse()?).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

pub use repository::draft::DraftRepository;
pub use repository::invoice::{InvoiceRepository, InvoiceSort, SortColumn};
pub use repository::memory::{ClientMemoryRepository, ItemMemoryRepository};
pub use repository::settings::SettingsRepository;
