//! # Domain Types
//!
//! Core domain types used throughout PayLance.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    LineItem     │   │    Surcharge    │   │  InvoiceTotals  │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  description    │   │  description    │   │  subtotal       │       │
//! │  │  quantity       │   │  amount         │   │  tax_amount     │       │
//! │  │  rate           │   │  type ──────────┼─┐ │  surcharge_total│       │
//! │  │  amount (derived│   └─────────────────┘ │ │  total          │       │
//! │  └─────────────────┘                       │ └─────────────────┘       │
//! │                        ┌─────────────────┐ │ ┌─────────────────┐       │
//! │                        │ SurchargeKind   │◄┘ │ InvoiceStatus   │       │
//! │                        │  Fixed          │   │  Draft, Sent    │       │
//! │                        │  Percentage     │   │  Paid, Overdue  │       │
//! │                        └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Amounts are `f64` and never rounded here. Two-decimal output is the job
//! of [`crate::currency::format_amount`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use ts_rs::TS;

use crate::coerce;
use crate::totals::{line_amount, sanitize};

// =============================================================================
// Line Item
// =============================================================================

/// One billable row on an invoice.
///
/// `amount` is private: it is always `quantity * rate` and is refreshed by
/// every constructor and setter. Incoming JSON may carry an `amount`, but it
/// is ignored on deserialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(from = "RawLineItem")]
#[ts(export)]
pub struct LineItem {
    pub description: String,
    quantity: f64,
    rate: f64,
    amount: f64,
}

impl LineItem {
    /// Creates a line item and derives its amount.
    pub fn new(description: impl Into<String>, quantity: f64, rate: f64) -> Self {
        let quantity = sanitize(quantity);
        let rate = sanitize(rate);
        LineItem {
            description: description.into(),
            quantity,
            rate,
            amount: line_amount(quantity, rate),
        }
    }

    /// The blank row a form adds: no description, quantity 1, rate 0.
    pub fn blank() -> Self {
        LineItem::new("", 1.0, 0.0)
    }

    #[inline]
    pub fn quantity(&self) -> f64 {
        self.quantity
    }

    #[inline]
    pub fn rate(&self) -> f64 {
        self.rate
    }

    #[inline]
    pub fn amount(&self) -> f64 {
        self.amount
    }

    pub fn set_quantity(&mut self, quantity: f64) {
        self.quantity = sanitize(quantity);
        self.amount = line_amount(self.quantity, self.rate);
    }

    pub fn set_rate(&mut self, rate: f64) {
        self.rate = sanitize(rate);
        self.amount = line_amount(self.quantity, self.rate);
    }
}

/// Wire shape of a line item before the amount is derived.
#[derive(Deserialize)]
struct RawLineItem {
    #[serde(default, deserialize_with = "coerce::string")]
    description: String,
    #[serde(default, deserialize_with = "coerce::number")]
    quantity: f64,
    #[serde(default, deserialize_with = "coerce::number")]
    rate: f64,
}

impl From<RawLineItem> for LineItem {
    fn from(raw: RawLineItem) -> Self {
        LineItem::new(raw.description, raw.quantity, raw.rate)
    }
}

// =============================================================================
// Surcharge
// =============================================================================

/// How a surcharge's `amount` is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum SurchargeKind {
    /// `amount` is added verbatim.
    #[default]
    Fixed,
    /// `amount` is a percentage of the item subtotal.
    Percentage,
}

impl SurchargeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SurchargeKind::Fixed => "fixed",
            SurchargeKind::Percentage => "percentage",
        }
    }
}

impl<'de> Deserialize<'de> for SurchargeKind {
    /// Anything other than `"percentage"` reads as `Fixed`.
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(coerce::surcharge_kind(&value))
    }
}

/// An additional charge on top of the item subtotal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Surcharge {
    #[serde(default, deserialize_with = "coerce::string")]
    pub description: String,

    /// Currency amount for `Fixed`, percent for `Percentage`.
    #[serde(default, deserialize_with = "coerce::number")]
    pub amount: f64,

    #[serde(rename = "type", default)]
    pub kind: SurchargeKind,
}

impl Surcharge {
    pub fn new(description: impl Into<String>, amount: f64, kind: SurchargeKind) -> Self {
        Surcharge {
            description: description.into(),
            amount,
            kind,
        }
    }

    /// The blank row a form adds.
    pub fn blank() -> Self {
        Surcharge::new("", 0.0, SurchargeKind::Fixed)
    }
}

// =============================================================================
// Totals
// =============================================================================

/// Figures derived from items, surcharges and tax rate.
///
/// Only [`crate::totals::compute_totals`] produces these.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct InvoiceTotals {
    pub subtotal: f64,
    pub tax_amount: f64,
    pub surcharge_total: f64,
    pub total: f64,
}

// =============================================================================
// Invoice Status
// =============================================================================

/// Stored lifecycle status of an invoice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum InvoiceStatus {
    #[default]
    Draft,
    Sent,
    Paid,
    Overdue,
}

impl InvoiceStatus {
    pub const ALL: [InvoiceStatus; 4] = [
        InvoiceStatus::Draft,
        InvoiceStatus::Sent,
        InvoiceStatus::Paid,
        InvoiceStatus::Overdue,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            InvoiceStatus::Draft => "draft",
            InvoiceStatus::Sent => "sent",
            InvoiceStatus::Paid => "paid",
            InvoiceStatus::Overdue => "overdue",
        }
    }
}

impl fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a status label is not recognised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownStatus(pub String);

impl fmt::Display for UnknownStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown status '{}', expected one of: draft, sent, paid, overdue",
            self.0
        )
    }
}

impl std::error::Error for UnknownStatus {}

impl FromStr for InvoiceStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "draft" => Ok(InvoiceStatus::Draft),
            "sent" => Ok(InvoiceStatus::Sent),
            "paid" => Ok(InvoiceStatus::Paid),
            "overdue" => Ok(InvoiceStatus::Overdue),
            _ => Err(UnknownStatus(s.to_string())),
        }
    }
}

// =============================================================================
// Client Info
// =============================================================================

/// Who the invoice is billed to.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ClientInfo {
    #[serde(default, deserialize_with = "coerce::string")]
    pub name: String,
    #[serde(default, deserialize_with = "coerce::opt_text")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "coerce::opt_text")]
    pub address: Option<String>,
}

// =============================================================================
// Unit Tests
// =============================================================================
