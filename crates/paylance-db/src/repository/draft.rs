//! # Draft Repository
//!
//! SQLite implementation of the single-slot draft store.

use async_trait::async_trait;
use chrono::Utc;
use paylance_core::draft::{decode_draft, encode_draft, DraftStore};
use paylance_core::{CoreResult, Invoice};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;

/// Key of the one draft slot.
const CURRENT_SLOT: &str = "current";

/// Draft store backed by the `drafts` table.
#[derive(Debug, Clone)]
pub struct DraftRepository {
    pool: SqlitePool,
}

impl DraftRepository {
    pub fn new(pool: SqlitePool) -> Self {
        DraftRepository { pool }
    }

    /// Writes a raw payload into the slot.
    pub async fn put_payload(&self, payload: &str) -> DbResult<()> {
        sqlx::query(
            r#"
            INSERT INTO drafts (slot, payload, saved_at) VALUES (?1, ?2, ?3)
            ON CONFLICT(slot) DO UPDATE SET
                payload = excluded.payload,
                saved_at = excluded.saved_at
            "#,
        )
        .bind(CURRENT_SLOT)
        .bind(payload)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Reads the raw payload in the slot.
    pub async fn payload(&self) -> DbResult<Option<String>> {
        let payload: Option<String> =
            sqlx::query_scalar("SELECT payload FROM drafts WHERE slot = ?1")
                .bind(CURRENT_SLOT)
                .fetch_optional(&self.pool)
                .await?;

        Ok(payload)
    }

    /// Empties the slot.
    pub async fn remove(&self) -> DbResult<()> {
        sqlx::query("DELETE FROM drafts WHERE slot = ?1")
            .bind(CURRENT_SLOT)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

#[async_trait]
impl DraftStore for DraftRepository {
    async fn save(&self, invoice: &Invoice) -> CoreResult<()> {
        debug!(id = %invoice.id, "Saving draft");
        let payload = encode_draft(invoice)?;
        Ok(self.put_payload(&payload).await?)
    }

    async fn load(&self) -> CoreResult<Option<Invoice>> {
        let payload = self.payload().await?;
        Ok(payload.as_deref().and_then(decode_draft))
    }

    async fn clear(&self) -> CoreResult<()> {
        debug!("Clearing draft");
        Ok(self.remove().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use paylance_core::LineItem;

    async fn repo() -> DraftRepository {
        Database::new(DbConfig::in_memory()).await.unwrap().drafts()
    }

    #[tokio::test]
    async fn test_save_replaces_and_clear_empties() {
        let repo = repo().await;
        assert!(repo.load().await.unwrap().is_none());

        let mut first = Invoice::new();
        first.add_item(LineItem::new("First", 1.0, 10.0));
        repo.save(&first).await.unwrap();

        let mut second = Invoice::new();
        second.add_item(LineItem::new("Second", 3.0, 10.0));
        repo.save(&second).await.unwrap();

        let loaded = repo.load().await.unwrap().unwrap();
        assert_eq!(loaded.id, second.id);
        assert_eq!(loaded.totals().total, 30.0);

        repo.clear().await.unwrap();
        assert!(repo.load().await.unwrap().is_none());
        // Clearing an empty slot is fine
        repo.clear().await.unwrap();
    }

    #[tokio::test]
    async fn test_corrupt_draft_loads_as_none() {
        let repo = repo().await;
        repo.put_payload("{\"items\": [").await.unwrap();
        assert!(repo.load().await.unwrap().is_none());
    }
}
