//! # Invoice Aggregate
//!
//! The `Invoice` owns its line items, surcharges, tax rate and the totals
//! derived from them. Those four are private: the only way to change items,
//! surcharges or the tax rate is through a method that reruns
//! [`compute_totals`] before returning.
//!
//! ## Mutation Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  add_item / update_item / select_item / remove_item ──┐                │
//! │  add_surcharge / update_surcharge / remove_surcharge ─┼──► recalculate │
//! │  set_tax_rate / replace_items / replace_surcharges ───┘        │       │
//! │                                                                 ▼       │
//! │                                           totals::compute_totals        │
//! │                                                                         │
//! │  Deserialize ──► InvoiceInput ──► From<InvoiceInput> ──► recalculate   │
//! │  (incoming totals are never read)                                      │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Metadata (client, dates, currency, notes, status) is public and has no
//! effect on totals.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::coerce;
use crate::error::{CoreError, CoreResult};
use crate::totals::compute_totals;
use crate::types::{ClientInfo, InvoiceStatus, InvoiceTotals, LineItem, Surcharge, SurchargeKind};
use crate::DEFAULT_CURRENCY;

// =============================================================================
// Invoice
// =============================================================================

/// An invoice with its derived totals.
///
/// Serialized flat: `subtotal`, `tax_amount`, `surcharge_total` and `total`
/// appear next to the metadata fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(from = "InvoiceInput")]
#[ts(export)]
pub struct Invoice {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Human-readable number, e.g. `INV-0042`.
    pub invoice_number: String,

    pub client_name: String,
    pub client_email: Option<String>,
    pub client_address: Option<String>,

    #[ts(as = "Option<String>")]
    pub invoice_date: Option<NaiveDate>,
    #[ts(as = "Option<String>")]
    pub due_date: Option<NaiveDate>,

    /// ISO 4217 code.
    pub currency: String,

    pub payment_terms: Option<String>,
    pub notes: Option<String>,
    pub status: InvoiceStatus,

    items: Vec<LineItem>,
    surcharges: Vec<Surcharge>,
    tax_rate: f64,

    #[serde(flatten)]
    totals: InvoiceTotals,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Invoice {
    /// Creates an empty draft with a generated number.
    pub fn new() -> Self {
        Invoice::from(InvoiceInput::default())
    }

    // -------------------------------------------------------------------------
    // Read access
    // -------------------------------------------------------------------------

    #[inline]
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    #[inline]
    pub fn surcharges(&self) -> &[Surcharge] {
        &self.surcharges
    }

    #[inline]
    pub fn tax_rate(&self) -> f64 {
        self.tax_rate
    }

    #[inline]
    pub fn totals(&self) -> InvoiceTotals {
        self.totals
    }

    pub fn client(&self) -> ClientInfo {
        ClientInfo {
            name: self.client_name.clone(),
            email: self.client_email.clone(),
            address: self.client_address.clone(),
        }
    }

    // -------------------------------------------------------------------------
    // Totals-affecting mutations
    // -------------------------------------------------------------------------

    pub fn set_tax_rate(&mut self, tax_rate: f64) {
        self.tax_rate = crate::totals::sanitize(tax_rate);
        self.recalculate();
    }

    /// Appends a line item and returns its index.
    pub fn add_item(&mut self, item: LineItem) -> usize {
        self.items.push(item);
        self.recalculate();
        self.items.len() - 1
    }

    /// Applies a partial change to one line item.
    pub fn update_item(&mut self, index: usize, patch: ItemPatch) -> CoreResult<&LineItem> {
        let item = self.item_mut(index)?;
        if let Some(description) = patch.description {
            item.description = description;
        }
        if let Some(quantity) = patch.quantity {
            item.set_quantity(quantity);
        }
        if let Some(rate) = patch.rate {
            item.set_rate(rate);
        }
        self.recalculate();
        Ok(&self.items[index])
    }

    /// Fills a row from a remembered item: description and rate are taken,
    /// quantity is kept unless it is zero, in which case it becomes 1.
    pub fn select_item(
        &mut self,
        index: usize,
        description: impl Into<String>,
        rate: f64,
    ) -> CoreResult<&LineItem> {
        let item = self.item_mut(index)?;
        item.description = description.into();
        if item.quantity() == 0.0 {
            item.set_quantity(1.0);
        }
        item.set_rate(rate);
        self.recalculate();
        Ok(&self.items[index])
    }

    pub fn remove_item(&mut self, index: usize) -> CoreResult<LineItem> {
        if index >= self.items.len() {
            return Err(CoreError::ItemNotFound {
                index,
                len: self.items.len(),
            });
        }
        let removed = self.items.remove(index);
        self.recalculate();
        Ok(removed)
    }

    pub fn replace_items(&mut self, items: Vec<LineItem>) {
        self.items = items;
        self.recalculate();
    }

    /// Appends a surcharge and returns its index.
    pub fn add_surcharge(&mut self, surcharge: Surcharge) -> usize {
        self.surcharges.push(surcharge);
        self.recalculate();
        self.surcharges.len() - 1
    }

    pub fn update_surcharge(&mut self, index: usize, patch: SurchargePatch) -> CoreResult<&Surcharge> {
        let len = self.surcharges.len();
        let surcharge = self
            .surcharges
            .get_mut(index)
            .ok_or(CoreError::SurchargeNotFound { index, len })?;
        if let Some(description) = patch.description {
            surcharge.description = description;
        }
        if let Some(amount) = patch.amount {
            surcharge.amount = crate::totals::sanitize(amount);
        }
        if let Some(kind) = patch.kind {
            surcharge.kind = kind;
        }
        self.recalculate();
        Ok(&self.surcharges[index])
    }

    pub fn remove_surcharge(&mut self, index: usize) -> CoreResult<Surcharge> {
        if index >= self.surcharges.len() {
            return Err(CoreError::SurchargeNotFound {
                index,
                len: self.surcharges.len(),
            });
        }
        let removed = self.surcharges.remove(index);
        self.recalculate();
        Ok(removed)
    }

    pub fn replace_surcharges(&mut self, surcharges: Vec<Surcharge>) {
        self.surcharges = surcharges;
        self.recalculate();
    }

    // -------------------------------------------------------------------------
    // Metadata
    // -------------------------------------------------------------------------

    /// Copies client details onto the invoice (autocomplete selection).
    pub fn apply_client(&mut self, client: ClientInfo) {
        self.client_name = client.name;
        self.client_email = client.email;
        self.client_address = client.address;
    }

    /// Stamps `updated_at` with the current time.
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    fn item_mut(&mut self, index: usize) -> CoreResult<&mut LineItem> {
        let len = self.items.len();
        self.items
            .get_mut(index)
            .ok_or(CoreError::ItemNotFound { index, len })
    }

    fn recalculate(&mut self) {
        self.totals = compute_totals(&self.items, &self.surcharges, self.tax_rate);
    }
}

impl Default for Invoice {
    fn default() -> Self {
        Invoice::new()
    }
}

// =============================================================================
// Patches
// =============================================================================

/// Partial update of a line item; `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemPatch {
    pub description: Option<String>,
    pub quantity: Option<f64>,
    pub rate: Option<f64>,
}

/// Partial update of a surcharge; `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SurchargePatch {
    pub description: Option<String>,
    pub amount: Option<f64>,
    pub kind: Option<SurchargeKind>,
}

// =============================================================================
// Input
// =============================================================================

/// Loosely-typed invoice data from a model, a form, a draft or a row.
///
/// Every field is optional and every value is coerced; converting into an
/// [`Invoice`] fills defaults and computes totals. Any `subtotal` / `total`
/// present in the source is ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InvoiceInput {
    #[serde(default, deserialize_with = "coerce::opt_text")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "coerce::opt_text")]
    pub invoice_number: Option<String>,
    #[serde(default, deserialize_with = "coerce::string")]
    pub client_name: String,
    #[serde(default, deserialize_with = "coerce::opt_text")]
    pub client_email: Option<String>,
    #[serde(default, deserialize_with = "coerce::opt_text")]
    pub client_address: Option<String>,
    #[serde(default, deserialize_with = "coerce::date")]
    pub invoice_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "coerce::date")]
    pub due_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "coerce::opt_text")]
    pub currency: Option<String>,
    #[serde(default, deserialize_with = "coerce::opt_text")]
    pub payment_terms: Option<String>,
    #[serde(default, deserialize_with = "coerce::opt_text")]
    pub notes: Option<String>,
    #[serde(default, deserialize_with = "coerce::status")]
    pub status: InvoiceStatus,
    #[serde(default, deserialize_with = "coerce::seq")]
    pub items: Vec<LineItem>,
    #[serde(default, deserialize_with = "coerce::seq")]
    pub surcharges: Vec<Surcharge>,
    #[serde(default, deserialize_with = "coerce::number")]
    pub tax_rate: f64,
    #[serde(default, deserialize_with = "coerce::timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "coerce::timestamp")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<InvoiceInput> for Invoice {
    fn from(input: InvoiceInput) -> Self {
        let now = Utc::now();
        let currency = input
            .currency
            .map(|code| code.trim().to_uppercase())
            .unwrap_or_else(|| DEFAULT_CURRENCY.to_string());

        let mut invoice = Invoice {
            id: input.id.unwrap_or_else(generate_invoice_id),
            invoice_number: input.invoice_number.unwrap_or_else(generate_invoice_number),
            client_name: input.client_name,
            client_email: input.client_email,
            client_address: input.client_address,
            invoice_date: input.invoice_date,
            due_date: input.due_date,
            currency,
            payment_terms: input.payment_terms,
            notes: input.notes,
            status: input.status,
            items: input.items,
            surcharges: input.surcharges,
            tax_rate: crate::totals::sanitize(input.tax_rate),
            totals: InvoiceTotals::default(),
            created_at: input.created_at.unwrap_or(now),
            updated_at: input.updated_at.unwrap_or(now),
        };
        invoice.recalculate();
        invoice
    }
}

// =============================================================================
// Identifiers
// =============================================================================

/// Generates a new invoice ID.
pub fn generate_invoice_id() -> String {
    Uuid::new_v4().to_string()
}

/// Generates a number in the `INV-XXXX` form.
pub fn generate_invoice_number() -> String {
    let n = Uuid::new_v4().as_u128() % 10_000;
    format!("INV-{:04}", n)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn assert_consistent(invoice: &Invoice) {
        assert_eq!(
            invoice.totals(),
            compute_totals(invoice.items(), invoice.surcharges(), invoice.tax_rate())
        );
    }

    #[test]
    fn test_new_invoice_defaults() {
        let invoice = Invoice::new();
        assert!(invoice.invoice_number.starts_with("INV-"));
        assert_eq!(invoice.invoice_number.len(), 8);
        assert_eq!(invoice.currency, "USD");
        assert_eq!(invoice.status, InvoiceStatus::Draft);
        assert_eq!(invoice.totals(), InvoiceTotals::default());
    }

    #[test]
    fn test_every_mutation_recomputes() {
        let mut invoice = Invoice::new();

        let first = invoice.add_item(LineItem::new("Design", 2.0, 100.0));
        assert_consistent(&invoice);
        assert_eq!(invoice.totals().subtotal, 200.0);

        invoice.set_tax_rate(10.0);
        assert_consistent(&invoice);
        assert_eq!(invoice.totals().tax_amount, 20.0);

        let pct = invoice.add_surcharge(Surcharge::new("Service", 5.0, SurchargeKind::Percentage));
        assert_consistent(&invoice);
        assert_eq!(invoice.totals().surcharge_total, 10.0);

        invoice
            .update_item(
                first,
                ItemPatch {
                    quantity: Some(4.0),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_consistent(&invoice);
        assert_eq!(invoice.items()[0].amount(), 400.0);
        // Percentage surcharge follows the new subtotal
        assert_eq!(invoice.totals().surcharge_total, 20.0);

        invoice
            .update_surcharge(
                pct,
                SurchargePatch {
                    kind: Some(SurchargeKind::Fixed),
                    amount: Some(15.0),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_consistent(&invoice);
        assert_eq!(invoice.totals().total, 400.0 + 40.0 + 15.0);

        invoice.remove_surcharge(pct).unwrap();
        invoice.remove_item(first).unwrap();
        assert_consistent(&invoice);
        assert_eq!(invoice.totals().total, 0.0);
    }

    #[test]
    fn test_select_item_keeps_quantity_or_defaults_to_one() {
        let mut invoice = Invoice::new();
        invoice.add_item(LineItem::new("", 3.0, 0.0));
        invoice.add_item(LineItem::new("", 0.0, 0.0));

        invoice.select_item(0, "Hosting", 20.0).unwrap();
        invoice.select_item(1, "Domain", 12.0).unwrap();

        assert_eq!(invoice.items()[0].amount(), 60.0);
        assert_eq!(invoice.items()[1].quantity(), 1.0);
        assert_eq!(invoice.totals().subtotal, 72.0);
    }

    #[test]
    fn test_out_of_range_edits_fail() {
        let mut invoice = Invoice::new();
        assert!(matches!(
            invoice.remove_item(0),
            Err(CoreError::ItemNotFound { index: 0, len: 0 })
        ));
        assert!(matches!(
            invoice.update_surcharge(2, SurchargePatch::default()),
            Err(CoreError::SurchargeNotFound { index: 2, len: 0 })
        ));
    }

    #[test]
    fn test_deserialize_discards_incoming_totals() {
        let invoice: Invoice = serde_json::from_value(json!({
            "invoice_number": "INV-0007",
            "client_name": "Acme",
            "currency": "eur",
            "tax_rate": "10",
            "items": [{ "description": "Work", "quantity": 2, "rate": 100, "amount": 1 }],
            "surcharges": [{ "description": "Rush", "amount": 25, "type": "fixed" }],
            "subtotal": 5,
            "total": 5
        }))
        .unwrap();

        assert_eq!(invoice.currency, "EUR");
        assert_eq!(invoice.totals().subtotal, 200.0);
        assert_eq!(invoice.totals().total, 245.0);
        assert_consistent(&invoice);
    }

    #[test]
    fn test_serialized_shape_is_flat() {
        let mut invoice = Invoice::new();
        invoice.add_item(LineItem::new("Work", 1.0, 50.0));

        let value = serde_json::to_value(&invoice).unwrap();
        assert_eq!(value["subtotal"], 50.0);
        assert_eq!(value["total"], 50.0);
        assert_eq!(value["items"][0]["amount"], 50.0);
        assert_eq!(value["status"], "draft");

        let back: Invoice = serde_json::from_value(value).unwrap();
        assert_eq!(back, invoice);
    }

    #[test]
    fn test_client_round_trip() {
        let mut invoice = Invoice::new();
        invoice.apply_client(ClientInfo {
            name: "Globex".to_string(),
            email: Some("ap@globex.test".to_string()),
            address: None,
        });
        assert_eq!(invoice.client().name, "Globex");
        assert_eq!(invoice.client_email.as_deref(), Some("ap@globex.test"));
    }
}
