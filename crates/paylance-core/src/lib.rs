//! # paylance-core: Pure Invoice Logic for PayLance
//!
//! This crate holds the business logic of the PayLance invoice generator
//! with zero I/O dependencies. Its centre is the totals engine: line items,
//! surcharges and a tax rate go in, a consistent set of derived figures
//! comes out.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        PayLance Architecture                            │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Browser client                               │   │
//! │  │    Prompt ──► Review form ──► Preview ──► Invoice list          │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ HTTP / JSON                            │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    paylance-api (axum)                          │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ paylance-core (THIS CRATE) ★                    │   │
//! │  │                                                                 │   │
//! │  │   extraction ──┐                                                │   │
//! │  │   editor ──────┼──► totals::compute_totals ◄── render           │   │
//! │  │   invoice ─────┘                                                │   │
//! │  │                                                                 │   │
//! │  │   NO DATABASE • NO NETWORK • NO TIMERS                          │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    paylance-db (SQLite)                         │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`totals`] - The totals engine (the only place totals are computed)
//! - [`types`] - Line items, surcharges, statuses, client info
//! - [`invoice`] - The `Invoice` aggregate, which recomputes on every mutation
//! - [`coerce`] - Lenient serde helpers (bad numbers become zero)
//! - [`editor`] - Interactive editing session
//! - [`memory`] - Client / item suggestion stores
//! - [`draft`] - Draft store interface
//! - [`extraction`] - Post-processing of language model output
//! - [`render`] - Template catalog and HTML rendering
//! - [`currency`] - Currency symbols and display formatting
//! - [`stats`] - Dashboard statistics
//! - [`validation`] - Business rule validation
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use paylance_core::totals::compute_totals;
//! use paylance_core::{LineItem, Surcharge, SurchargeKind};
//!
//! let items = vec![LineItem::new("Design", 2.0, 100.0), LineItem::new("Hosting", 1.0, 50.0)];
//! let surcharges = vec![Surcharge::new("Rush fee", 25.0, SurchargeKind::Fixed)];
//!
//! let totals = compute_totals(&items, &surcharges, 10.0);
//! assert_eq!(totals.subtotal, 250.0);
//! assert_eq!(totals.tax_amount, 25.0);
//! assert_eq!(totals.total, 300.0);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod coerce;
pub mod currency;
pub mod draft;
pub mod editor;
pub mod error;
pub mod extraction;
pub mod invoice;
pub mod memory;
pub mod render;
pub mod stats;
pub mod totals;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use invoice::{Invoice, InvoiceInput};
pub use totals::compute_totals;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Currency used when none is given (or the model omits it).
pub const DEFAULT_CURRENCY: &str = "USD";

/// Days between invoice date and due date when the due date is missing.
pub const DEFAULT_DUE_DAYS: i64 = 30;

/// Payment terms used when none are given.
pub const DEFAULT_PAYMENT_TERMS: &str = "Net 30";
