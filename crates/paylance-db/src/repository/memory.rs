//! # Suggestion Memory Repositories
//!
//! SQLite implementations of the client and item suggestion stores.
//!
//! The lists are small (20 clients, 30 items), so each save reads the whole
//! list, applies the shared rules from `paylance_core::memory` and writes it
//! back inside one transaction. Ranking and eviction therefore match the
//! in-memory stores exactly.
//!
//! ```text
//! save(x) ──► BEGIN
//!             SELECT all ORDER BY position
//!             remember_*(&mut list, x, now)
//!             DELETE all; INSERT list with position = index
//!             COMMIT
//! ```

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use paylance_core::memory::{
    rank_clients, rank_items, remember_client, remember_item, ClientSuggestionStore,
    ItemSuggestionStore, SavedClient, SavedItem,
};
use paylance_core::{ClientInfo, CoreResult};
use sqlx::{Sqlite, SqlitePool, Transaction};
use tracing::debug;

use crate::error::DbResult;

// =============================================================================
// Clients
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct ClientRow {
    name: String,
    email: Option<String>,
    address: Option<String>,
    last_used_at: DateTime<Utc>,
}

impl From<ClientRow> for SavedClient {
    fn from(row: ClientRow) -> Self {
        SavedClient {
            name: row.name,
            email: row.email,
            address: row.address,
            last_used: row.last_used_at,
        }
    }
}

/// Client suggestion store backed by the `saved_clients` table.
#[derive(Debug, Clone)]
pub struct ClientMemoryRepository {
    pool: SqlitePool,
}

impl ClientMemoryRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ClientMemoryRepository { pool }
    }

    /// Every remembered client, most recent first.
    pub async fn all(&self) -> DbResult<Vec<SavedClient>> {
        let rows: Vec<ClientRow> = sqlx::query_as(
            "SELECT name, email, address, last_used_at FROM saved_clients ORDER BY position",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(SavedClient::from).collect())
    }

    /// Records a client as just used.
    pub async fn remember(&self, client: ClientInfo) -> DbResult<()> {
        debug!(name = %client.name, "Remembering client");

        let mut tx = self.pool.begin().await?;

        let rows: Vec<ClientRow> = sqlx::query_as(
            "SELECT name, email, address, last_used_at FROM saved_clients ORDER BY position",
        )
        .fetch_all(&mut *tx)
        .await?;
        let mut clients: Vec<SavedClient> = rows.into_iter().map(SavedClient::from).collect();

        remember_client(&mut clients, client, Utc::now());
        write_clients(&mut tx, &clients).await?;

        tx.commit().await?;
        Ok(())
    }
}

async fn write_clients(tx: &mut Transaction<'_, Sqlite>, clients: &[SavedClient]) -> DbResult<()> {
    sqlx::query("DELETE FROM saved_clients")
        .execute(&mut **tx)
        .await?;

    for (position, client) in clients.iter().enumerate() {
        sqlx::query(
            r#"
            INSERT INTO saved_clients (name, email, address, last_used_at, position)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(&client.name)
        .bind(&client.email)
        .bind(&client.address)
        .bind(client.last_used)
        .bind(position as i64)
        .execute(&mut **tx)
        .await?;
    }

    Ok(())
}

#[async_trait]
impl ClientSuggestionStore for ClientMemoryRepository {
    async fn save(&self, client: ClientInfo) -> CoreResult<()> {
        Ok(self.remember(client).await?)
    }

    async fn search(&self, query: &str) -> CoreResult<Vec<SavedClient>> {
        let clients = self.all().await?;
        Ok(rank_clients(&clients, query))
    }
}

// =============================================================================
// Items
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct ItemRow {
    description: String,
    rate: f64,
    use_count: i64,
    last_used_at: DateTime<Utc>,
}

impl From<ItemRow> for SavedItem {
    fn from(row: ItemRow) -> Self {
        SavedItem {
            description: row.description,
            rate: row.rate,
            use_count: u32::try_from(row.use_count).unwrap_or(0),
            last_used: row.last_used_at,
        }
    }
}

/// Item suggestion store backed by the `saved_items` table.
#[derive(Debug, Clone)]
pub struct ItemMemoryRepository {
    pool: SqlitePool,
}

impl ItemMemoryRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ItemMemoryRepository { pool }
    }

    /// Every remembered item, most recent first.
    pub async fn all(&self) -> DbResult<Vec<SavedItem>> {
        let rows: Vec<ItemRow> = sqlx::query_as(
            "SELECT description, rate, use_count, last_used_at FROM saved_items ORDER BY position",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(SavedItem::from).collect())
    }

    /// Records an item as just used.
    pub async fn remember(&self, description: &str, rate: f64) -> DbResult<()> {
        debug!(description = %description, rate = rate, "Remembering item");

        let mut tx = self.pool.begin().await?;

        let rows: Vec<ItemRow> = sqlx::query_as(
            "SELECT description, rate, use_count, last_used_at FROM saved_items ORDER BY position",
        )
        .fetch_all(&mut *tx)
        .await?;
        let mut items: Vec<SavedItem> = rows.into_iter().map(SavedItem::from).collect();

        remember_item(&mut items, description, rate, Utc::now());
        write_items(&mut tx, &items).await?;

        tx.commit().await?;
        Ok(())
    }
}

async fn write_items(tx: &mut Transaction<'_, Sqlite>, items: &[SavedItem]) -> DbResult<()> {
    sqlx::query("DELETE FROM saved_items")
        .execute(&mut **tx)
        .await?;

    for (position, item) in items.iter().enumerate() {
        sqlx::query(
            r#"
            INSERT INTO saved_items (description, rate, use_count, last_used_at, position)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(&item.description)
        .bind(item.rate)
        .bind(i64::from(item.use_count))
        .bind(item.last_used)
        .bind(position as i64)
        .execute(&mut **tx)
        .await?;
    }

    Ok(())
}

#[async_trait]
impl ItemSuggestionStore for ItemMemoryRepository {
    async fn save(&self, description: &str, rate: f64) -> CoreResult<()> {
        Ok(self.remember(description, rate).await?)
    }

    async fn search(&self, query: &str) -> CoreResult<Vec<SavedItem>> {
        let items = self.all().await?;
        Ok(rank_items(&items, query))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use paylance_core::memory::{CLIENT_CAPACITY, ITEM_CAPACITY, SUGGESTION_LIMIT};

    async fn db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    fn client(name: &str, email: Option<&str>) -> ClientInfo {
        ClientInfo {
            name: name.to_string(),
            email: email.map(str::to_string),
            address: None,
        }
    }

    #[tokio::test]
    async fn test_client_resave_replaces_and_reorders() {
        let store = db().await.clients();
        store.save(client("Acme", Some("ap@acme.test"))).await.unwrap();
        store.save(client("Globex", None)).await.unwrap();
        store.save(client("Acme", None)).await.unwrap();

        let all = store.all().await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].name, "Acme");
        assert!(all[0].email.is_none());

        assert_eq!(store.search("ACME").await.unwrap().len(), 1);
        assert!(store.search("").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_client_capacity() {
        let store = db().await.clients();
        for i in 0..(CLIENT_CAPACITY + 2) {
            store.save(client(&format!("Client {i}"), None)).await.unwrap();
        }

        let all = store.all().await.unwrap();
        assert_eq!(all.len(), CLIENT_CAPACITY);
        assert!(!all.iter().any(|c| c.name == "Client 0"));
        assert_eq!(
            store.search("client").await.unwrap().len(),
            SUGGESTION_LIMIT
        );
    }

    #[tokio::test]
    async fn test_item_use_count_ranking() {
        let store = db().await.items();
        store.save("Web hosting", 10.0).await.unwrap();
        store.save("Web design", 400.0).await.unwrap();
        store.save("Web design", 450.0).await.unwrap();
        store.save("Web fonts", 20.0).await.unwrap();

        let ranked = store.search("web").await.unwrap();
        assert_eq!(ranked[0].description, "Web design");
        assert_eq!(ranked[0].use_count, 2);
        assert_eq!(ranked[0].rate, 450.0);
        assert_eq!(ranked[1].description, "Web fonts");
    }

    #[tokio::test]
    async fn test_item_capacity() {
        let store = db().await.items();
        for i in 0..(ITEM_CAPACITY + 1) {
            store.save(&format!("Task {i}"), 1.0).await.unwrap();
        }
        let all = store.all().await.unwrap();
        assert_eq!(all.len(), ITEM_CAPACITY);
        assert_eq!(all[0].description, format!("Task {}", ITEM_CAPACITY));
    }
}
