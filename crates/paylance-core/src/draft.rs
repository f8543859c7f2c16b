//! # Draft Store
//!
//! One auto-saved work-in-progress invoice.
//!
//! The store only persists what it is handed. When to save (the debounce)
//! belongs to whoever drives the editing session.

use std::sync::Mutex;

use async_trait::async_trait;
use tracing::warn;

use crate::error::{CoreError, CoreResult};
use crate::invoice::Invoice;

/// Keeps a single current draft.
#[async_trait]
pub trait DraftStore: Send + Sync {
    /// Replaces the current draft.
    async fn save(&self, invoice: &Invoice) -> CoreResult<()>;

    /// Returns the current draft, or `None` if there is none or it cannot be read.
    async fn load(&self) -> CoreResult<Option<Invoice>>;

    /// Removes the current draft.
    async fn clear(&self) -> CoreResult<()>;
}

/// Reads a stored draft payload. Unreadable payloads are logged and dropped.
pub fn decode_draft(payload: &str) -> Option<Invoice> {
    match serde_json::from_str::<Invoice>(payload) {
        Ok(invoice) => Some(invoice),
        Err(e) => {
            warn!(error = %e, "Discarding unreadable draft");
            None
        }
    }
}

/// Serializes a draft for storage.
pub fn encode_draft(invoice: &Invoice) -> CoreResult<String> {
    serde_json::to_string(invoice).map_err(|e| CoreError::Store(e.to_string()))
}

/// Process-local draft slot, stored as JSON like the SQLite store.
#[derive(Debug, Default)]
pub struct InMemoryDraftStore {
    payload: Mutex<Option<String>>,
}

impl InMemoryDraftStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Puts a raw payload in the slot.
    pub fn put_raw(&self, payload: impl Into<String>) -> CoreResult<()> {
        *self.payload.lock().map_err(poisoned)? = Some(payload.into());
        Ok(())
    }
}

#[async_trait]
impl DraftStore for InMemoryDraftStore {
    async fn save(&self, invoice: &Invoice) -> CoreResult<()> {
        let payload = encode_draft(invoice)?;
        *self.payload.lock().map_err(poisoned)? = Some(payload);
        Ok(())
    }

    async fn load(&self) -> CoreResult<Option<Invoice>> {
        let payload = self.payload.lock().map_err(poisoned)?.clone();
        Ok(payload.as_deref().and_then(decode_draft))
    }

    async fn clear(&self) -> CoreResult<()> {
        *self.payload.lock().map_err(poisoned)? = None;
        Ok(())
    }
}

fn poisoned<T>(_: std::sync::PoisonError<T>) -> CoreError {
    CoreError::Store("draft store lock poisoned".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::LineItem;

    #[tokio::test]
    async fn test_save_load_clear() {
        let store = InMemoryDraftStore::new();
        assert!(store.load().await.unwrap().is_none());

        let mut invoice = Invoice::new();
        invoice.add_item(LineItem::new("Work", 2.0, 40.0));
        store.save(&invoice).await.unwrap();

        let loaded = store.load().await.unwrap().unwrap();
        assert_eq!(loaded.id, invoice.id);
        assert_eq!(loaded.totals().total, 80.0);

        store.clear().await.unwrap();
        assert!(store.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_corrupt_draft_loads_as_none() {
        let store = InMemoryDraftStore::new();
        store.put_raw("{not json").unwrap();
        assert!(store.load().await.unwrap().is_none());
    }

    #[test]
    fn test_draft_totals_are_recomputed() {
        let payload = r#"{"items":[{"quantity":3,"rate":10}],"tax_rate":10,"total":1}"#;
        let invoice = decode_draft(payload).unwrap();
        assert_eq!(invoice.totals().total, 33.0);
    }
}
