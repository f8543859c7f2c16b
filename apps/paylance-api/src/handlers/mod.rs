//! # Handlers Module
//!
//! Every route the browser client calls.
//!
//! ## Handler Organization
//! ```text
//! handlers/
//! ├── mod.rs          ◄─── You are here (shared response types)
//! ├── health.rs       ◄─── Liveness + database check
//! ├── generate.rs     ◄─── Description → language model → editor
//! ├── editor.rs       ◄─── Editing session: edits, preview, save
//! ├── suggestions.rs  ◄─── Client / item autocomplete
//! ├── invoices.rs     ◄─── Saved invoices: list, view, status, render
//! ├── settings.rs     ◄─── Branding, currencies, template catalog
//! └── stats.rs        ◄─── Dashboard figures
//! ```
//!
//! Handlers stay thin: they pick state, call into `paylance-core` or
//! `paylance-db` and shape the response.

pub mod editor;
pub mod generate;
pub mod health;
pub mod invoices;
pub mod settings;
pub mod stats;
pub mod suggestions;

use chrono::{NaiveDate, Utc};
use paylance_core::render::{Branding, TemplateId};
use paylance_core::stats::effective_status;
use paylance_core::totals::{surcharge_breakdown, SurchargeLine};
use paylance_core::{Invoice, InvoiceStatus};
use serde::{Deserialize, Serialize};

/// The date used for defaults and overdue checks.
pub(crate) fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// An invoice plus the per-surcharge amounts the form displays.
#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
    pub invoice: Invoice,
    pub surcharge_lines: Vec<SurchargeLine>,
}

impl From<&Invoice> for SessionView {
    fn from(invoice: &Invoice) -> Self {
        SessionView {
            surcharge_lines: surcharge_breakdown(invoice.surcharges(), invoice.totals().subtotal),
            invoice: invoice.clone(),
        }
    }
}

/// A saved invoice with the status it should be shown with.
#[derive(Debug, Clone, Serialize)]
pub struct InvoiceDetail {
    #[serde(flatten)]
    pub invoice: Invoice,
    pub display_status: InvoiceStatus,
    pub surcharge_lines: Vec<SurchargeLine>,
}

impl InvoiceDetail {
    pub fn new(invoice: Invoice, today: NaiveDate) -> Self {
        InvoiceDetail {
            display_status: effective_status(&invoice, today),
            surcharge_lines: surcharge_breakdown(invoice.surcharges(), invoice.totals().subtotal),
            invoice,
        }
    }
}

/// `?template=` on preview and render routes.
#[derive(Debug, Default, Deserialize)]
pub struct TemplateQuery {
    #[serde(default)]
    pub template: Option<String>,
}

impl TemplateQuery {
    /// The requested template, or the one saved in branding.
    pub fn resolve(&self, branding: &Branding) -> TemplateId {
        self.template
            .as_deref()
            .map_or(branding.template, TemplateId::from_id)
    }
}
