//! # Editing Session
//!
//! Interactive review of one invoice: field edits, autocomplete
//! suggestions, draft auto-save and the final save.
//!
//! ## Session Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  EditSession::new(invoice, stores)                                     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  apply(InvoiceEdit) ◄──────────────┐   every edit goes through the     │
//! │       │                            │   Invoice aggregate, so totals    │
//! │       ├── save_draft()  (debounced │   are fresh before apply returns  │
//! │       │   by the caller)           │                                    │
//! │       ├── suggest_clients(q) ──────┤                                    │
//! │       ├── suggest_items(q) ────────┘                                    │
//! │       │                                                                 │
//! │       ├──► finalize()   validate, remember client + items,             │
//! │       │                 clear draft, hand back the invoice              │
//! │       │                                                                 │
//! │       └──► discard()    clear draft                                     │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use chrono::NaiveDate;
use serde::Deserialize;

use crate::coerce;
use crate::draft::{DraftStore, InMemoryDraftStore};
use crate::error::CoreResult;
use crate::invoice::{Invoice, ItemPatch, SurchargePatch};
use crate::memory::{
    ClientSuggestionStore, InMemoryClientStore, InMemoryItemStore, ItemSuggestionStore,
    SavedClient, SavedItem,
};
use crate::types::{ClientInfo, InvoiceStatus, LineItem, Surcharge, SurchargeKind};
use crate::validation::{validate_invoice, validate_search_query};

// =============================================================================
// Stores
// =============================================================================

/// The stores a session talks to.
#[derive(Clone)]
pub struct SessionStores {
    pub clients: Arc<dyn ClientSuggestionStore>,
    pub items: Arc<dyn ItemSuggestionStore>,
    pub drafts: Arc<dyn DraftStore>,
}

impl SessionStores {
    /// Process-local stores (tests, previews).
    pub fn in_memory() -> Self {
        SessionStores {
            clients: Arc::new(InMemoryClientStore::new()),
            items: Arc::new(InMemoryItemStore::new()),
            drafts: Arc::new(InMemoryDraftStore::new()),
        }
    }
}

impl std::fmt::Debug for SessionStores {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStores").finish_non_exhaustive()
    }
}

// =============================================================================
// Edits
// =============================================================================

/// One change a reviewer can make to the invoice.
///
/// Wire form is tagged by `op`, e.g.
/// `{"op": "update_item", "index": 0, "quantity": "3"}`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum InvoiceEdit {
    SetInvoiceNumber {
        #[serde(deserialize_with = "coerce::string")]
        value: String,
    },
    SetCurrency {
        #[serde(deserialize_with = "coerce::string")]
        value: String,
    },
    SetInvoiceDate {
        #[serde(default, deserialize_with = "coerce::date")]
        value: Option<NaiveDate>,
    },
    SetDueDate {
        #[serde(default, deserialize_with = "coerce::date")]
        value: Option<NaiveDate>,
    },
    SetTaxRate {
        #[serde(default, deserialize_with = "coerce::number")]
        value: f64,
    },
    SetClientName {
        #[serde(default, deserialize_with = "coerce::string")]
        value: String,
    },
    SetClientEmail {
        #[serde(default, deserialize_with = "coerce::opt_text")]
        value: Option<String>,
    },
    SetClientAddress {
        #[serde(default, deserialize_with = "coerce::opt_text")]
        value: Option<String>,
    },
    /// Autocomplete pick: replaces name, email and address together.
    SelectClient {
        #[serde(default, deserialize_with = "coerce::string")]
        name: String,
        #[serde(default, deserialize_with = "coerce::opt_text")]
        email: Option<String>,
        #[serde(default, deserialize_with = "coerce::opt_text")]
        address: Option<String>,
    },
    SetPaymentTerms {
        #[serde(default, deserialize_with = "coerce::opt_text")]
        value: Option<String>,
    },
    SetNotes {
        #[serde(default, deserialize_with = "coerce::opt_text")]
        value: Option<String>,
    },
    SetStatus {
        value: InvoiceStatus,
    },
    /// Appends a blank row (quantity 1, rate 0).
    AddItem,
    UpdateItem {
        index: usize,
        #[serde(default)]
        description: Option<String>,
        #[serde(default, deserialize_with = "coerce::opt_number")]
        quantity: Option<f64>,
        #[serde(default, deserialize_with = "coerce::opt_number")]
        rate: Option<f64>,
    },
    /// Autocomplete pick for a row: description and rate from memory.
    SelectItem {
        index: usize,
        #[serde(deserialize_with = "coerce::string")]
        description: String,
        #[serde(default, deserialize_with = "coerce::number")]
        rate: f64,
    },
    RemoveItem {
        index: usize,
    },
    /// Appends a blank fixed surcharge.
    AddSurcharge,
    UpdateSurcharge {
        index: usize,
        #[serde(default)]
        description: Option<String>,
        #[serde(default, deserialize_with = "coerce::opt_number")]
        amount: Option<f64>,
        #[serde(default, rename = "type")]
        kind: Option<SurchargeKind>,
    },
    RemoveSurcharge {
        index: usize,
    },
}

// =============================================================================
// Session
// =============================================================================

/// An invoice under review plus the stores it reads from and writes to.
#[derive(Debug, Clone)]
pub struct EditSession {
    invoice: Invoice,
    stores: SessionStores,
}

impl EditSession {
    pub fn new(invoice: Invoice, stores: SessionStores) -> Self {
        EditSession { invoice, stores }
    }

    /// Starts from an empty invoice with one blank row.
    pub fn blank(stores: SessionStores) -> Self {
        let mut invoice = Invoice::new();
        invoice.add_item(LineItem::blank());
        EditSession::new(invoice, stores)
    }

    /// Picks up the stored draft, if there is one.
    pub async fn resume(stores: SessionStores) -> CoreResult<Option<Self>> {
        let draft = stores.drafts.load().await?;
        Ok(draft.map(|invoice| EditSession::new(invoice, stores)))
    }

    #[inline]
    pub fn invoice(&self) -> &Invoice {
        &self.invoice
    }

    /// Applies one edit. Totals are current when this returns.
    pub fn apply(&mut self, edit: InvoiceEdit) -> CoreResult<()> {
        let invoice = &mut self.invoice;
        match edit {
            InvoiceEdit::SetInvoiceNumber { value } => invoice.invoice_number = value,
            InvoiceEdit::SetCurrency { value } => invoice.currency = value.trim().to_uppercase(),
            InvoiceEdit::SetInvoiceDate { value } => invoice.invoice_date = value,
            InvoiceEdit::SetDueDate { value } => invoice.due_date = value,
            InvoiceEdit::SetTaxRate { value } => invoice.set_tax_rate(value),
            InvoiceEdit::SetClientName { value } => invoice.client_name = value,
            InvoiceEdit::SetClientEmail { value } => invoice.client_email = value,
            InvoiceEdit::SetClientAddress { value } => invoice.client_address = value,
            InvoiceEdit::SelectClient { name, email, address } => {
                invoice.apply_client(ClientInfo { name, email, address })
            }
            InvoiceEdit::SetPaymentTerms { value } => invoice.payment_terms = value,
            InvoiceEdit::SetNotes { value } => invoice.notes = value,
            InvoiceEdit::SetStatus { value } => invoice.status = value,
            InvoiceEdit::AddItem => {
                invoice.add_item(LineItem::blank());
            }
            InvoiceEdit::UpdateItem {
                index,
                description,
                quantity,
                rate,
            } => {
                invoice.update_item(
                    index,
                    ItemPatch {
                        description,
                        quantity,
                        rate,
                    },
                )?;
            }
            InvoiceEdit::SelectItem {
                index,
                description,
                rate,
            } => {
                invoice.select_item(index, description, rate)?;
            }
            InvoiceEdit::RemoveItem { index } => {
                invoice.remove_item(index)?;
            }
            InvoiceEdit::AddSurcharge => {
                invoice.add_surcharge(Surcharge::blank());
            }
            InvoiceEdit::UpdateSurcharge {
                index,
                description,
                amount,
                kind,
            } => {
                invoice.update_surcharge(
                    index,
                    SurchargePatch {
                        description,
                        amount,
                        kind,
                    },
                )?;
            }
            InvoiceEdit::RemoveSurcharge { index } => {
                invoice.remove_surcharge(index)?;
            }
        }
        invoice.touch();
        Ok(())
    }

    /// Applies a batch of edits all-or-nothing.
    pub fn apply_all(&mut self, edits: impl IntoIterator<Item = InvoiceEdit>) -> CoreResult<()> {
        let mut staged = self.clone();
        for edit in edits {
            staged.apply(edit)?;
        }
        self.invoice = staged.invoice;
        Ok(())
    }

    /// Writes the current state to the draft store.
    pub async fn save_draft(&self) -> CoreResult<()> {
        self.stores.drafts.save(&self.invoice).await
    }

    pub async fn suggest_clients(&self, query: &str) -> CoreResult<Vec<SavedClient>> {
        let query = validate_search_query(query)?;
        self.stores.clients.search(&query).await
    }

    pub async fn suggest_items(&self, query: &str) -> CoreResult<Vec<SavedItem>> {
        let query = validate_search_query(query)?;
        self.stores.items.search(&query).await
    }

    /// Validates the invoice, remembers its client and items, clears the
    /// draft and returns the invoice for persistence.
    ///
    /// Items are remembered only when they have a description and a
    /// non-zero rate.
    pub async fn finalize(&mut self) -> CoreResult<Invoice> {
        validate_invoice(&self.invoice)?;

        if !self.invoice.client_name.trim().is_empty() {
            self.stores.clients.save(self.invoice.client()).await?;
        }

        for item in self.invoice.items() {
            if !item.description.trim().is_empty() && item.rate() != 0.0 {
                self.stores.items.save(&item.description, item.rate()).await?;
            }
        }

        self.stores.drafts.clear().await?;
        self.invoice.touch();
        Ok(self.invoice.clone())
    }

    /// Drops the session's draft.
    pub async fn discard(self) -> CoreResult<()> {
        self.stores.drafts.clear().await
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;
    use crate::totals::compute_totals;
    use serde_json::json;

    fn edits(value: serde_json::Value) -> Vec<InvoiceEdit> {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_blank_session_has_one_row() {
        let session = EditSession::blank(SessionStores::in_memory());
        assert_eq!(session.invoice().items().len(), 1);
        assert_eq!(session.invoice().items()[0].quantity(), 1.0);
        assert_eq!(session.invoice().totals().total, 0.0);
    }

    #[test]
    fn test_edits_from_json_keep_totals_fresh() {
        let mut session = EditSession::blank(SessionStores::in_memory());
        session
            .apply_all(edits(json!([
                { "op": "update_item", "index": 0, "description": "Design", "quantity": "2", "rate": 100 },
                { "op": "add_item" },
                { "op": "update_item", "index": 1, "quantity": 1, "rate": "50" },
                { "op": "set_tax_rate", "value": 10 },
                { "op": "add_surcharge" },
                { "op": "update_surcharge", "index": 0, "amount": 25, "type": "fixed" }
            ])))
            .unwrap();

        let invoice = session.invoice();
        assert_eq!(invoice.totals().subtotal, 250.0);
        assert_eq!(invoice.totals().tax_amount, 25.0);
        assert_eq!(invoice.totals().total, 300.0);
        assert_eq!(
            invoice.totals(),
            compute_totals(invoice.items(), invoice.surcharges(), invoice.tax_rate())
        );

        session
            .apply(InvoiceEdit::UpdateSurcharge {
                index: 0,
                description: None,
                amount: Some(10.0),
                kind: Some(SurchargeKind::Percentage),
            })
            .unwrap();
        assert_eq!(session.invoice().totals().surcharge_total, 25.0);
    }

    #[test]
    fn test_blank_description_clears_row_text() {
        let mut session = EditSession::blank(SessionStores::in_memory());
        session
            .apply_all(edits(json!([
                { "op": "update_item", "index": 0, "description": "Design", "rate": 80 },
                { "op": "add_surcharge" },
                { "op": "update_surcharge", "index": 0, "description": "Rush fee" }
            ])))
            .unwrap();

        session
            .apply_all(edits(json!([
                { "op": "update_item", "index": 0, "description": "" },
                { "op": "update_surcharge", "index": 0, "description": "" }
            ])))
            .unwrap();

        let invoice = session.invoice();
        assert_eq!(invoice.items()[0].description, "");
        assert_eq!(invoice.items()[0].rate(), 80.0);
        assert_eq!(invoice.surcharges()[0].description, "");
    }

    #[test]
    fn test_failed_batch_changes_nothing() {
        let mut session = EditSession::blank(SessionStores::in_memory());
        let before = session.invoice().clone();

        let result = session.apply_all(edits(json!([
            { "op": "set_tax_rate", "value": 20 },
            { "op": "remove_item", "index": 5 }
        ])));

        assert!(matches!(result, Err(CoreError::ItemNotFound { index: 5, .. })));
        assert_eq!(session.invoice(), &before);
    }

    #[test]
    fn test_select_client_replaces_details() {
        let mut session = EditSession::blank(SessionStores::in_memory());
        session
            .apply(InvoiceEdit::SetClientAddress {
                value: Some("Old street".to_string()),
            })
            .unwrap();
        session
            .apply_all(edits(json!([
                { "op": "select_client", "name": "Acme", "email": "ap@acme.test" }
            ])))
            .unwrap();

        assert_eq!(session.invoice().client_name, "Acme");
        assert_eq!(session.invoice().client_address, None);
    }

    #[tokio::test]
    async fn test_finalize_remembers_and_clears_draft() {
        let stores = SessionStores::in_memory();
        let mut session = EditSession::blank(stores.clone());
        session
            .apply_all(edits(json!([
                { "op": "set_client_name", "value": "Acme" },
                { "op": "update_item", "index": 0, "description": "Retainer", "rate": 900 },
                { "op": "add_item" },
                { "op": "update_item", "index": 1, "description": "Free call", "rate": 0 }
            ])))
            .unwrap();
        session.save_draft().await.unwrap();
        assert!(stores.drafts.load().await.unwrap().is_some());

        let saved = session.finalize().await.unwrap();
        assert_eq!(saved.totals().total, 900.0);

        assert_eq!(session.suggest_clients("ac").await.unwrap().len(), 1);
        assert_eq!(session.suggest_items("retainer").await.unwrap().len(), 1);
        assert!(session.suggest_items("free").await.unwrap().is_empty());
        assert!(stores.drafts.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_finalize_rejects_invalid_invoice() {
        let stores = SessionStores::in_memory();
        let mut session = EditSession::blank(stores.clone());
        session
            .apply(InvoiceEdit::SetInvoiceNumber {
                value: String::new(),
            })
            .unwrap();
        session.save_draft().await.unwrap();

        assert!(matches!(
            session.finalize().await,
            Err(CoreError::Validation(_))
        ));
        // Draft survives a failed save
        assert!(stores.drafts.load().await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_resume_and_discard() {
        let stores = SessionStores::in_memory();
        assert!(EditSession::resume(stores.clone()).await.unwrap().is_none());

        let session = EditSession::blank(stores.clone());
        session.save_draft().await.unwrap();

        let resumed = EditSession::resume(stores.clone()).await.unwrap().unwrap();
        assert_eq!(resumed.invoice().id, session.invoice().id);

        resumed.discard().await.unwrap();
        assert!(stores.drafts.load().await.unwrap().is_none());
    }
}
