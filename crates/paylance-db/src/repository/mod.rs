//! # Repository Module
//!
//! Database repository implementations for PayLance.
//!
//! ## Available Repositories
//!
//! - [`InvoiceRepository`](invoice::InvoiceRepository) - Saved invoices
//! - [`ClientMemoryRepository`](memory::ClientMemoryRepository) - Client suggestions
//! - [`ItemMemoryRepository`](memory::ItemMemoryRepository) - Item suggestions
//! - [`DraftRepository`](draft::DraftRepository) - Auto-saved draft
//! - [`SettingsRepository`](settings::SettingsRepository) - Branding settings
//!
//! The memory and draft repositories implement the store traits from
//! `paylance-core`, so an editing session can run against SQLite or the
//! in-memory stores unchanged.

pub mod draft;
pub mod invoice;
pub mod memory;
pub mod settings;
