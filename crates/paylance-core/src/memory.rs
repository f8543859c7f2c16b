//! # Suggestion Memory
//!
//! Recently used clients and frequently used items, offered as
//! autocomplete suggestions while editing.
//!
//! ## Store Contract
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                   Client memory          Item memory                    │
//! │  ─────────────    ─────────────────      ─────────────────────────      │
//! │  key              exact name             exact description              │
//! │  save again       merge, move to front   new rate, use_count + 1,       │
//! │                                          move to front                  │
//! │  capacity         20 most recent         30 most recent                 │
//! │  search match     name or email          description                    │
//! │                   (case-insensitive substring)                          │
//! │  search order     most recent first      use_count desc, then recency   │
//! │  search limit     5                      5                              │
//! │  empty query      no results             no results                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The rules live in the pure functions [`remember_client`], [`rank_clients`],
//! [`remember_item`] and [`rank_items`]. The in-memory stores below and the
//! SQLite stores in `paylance-db` both apply them, so ranking cannot drift
//! between backends.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::types::ClientInfo;

/// Clients kept in memory.
pub const CLIENT_CAPACITY: usize = 20;

/// Items kept in memory.
pub const ITEM_CAPACITY: usize = 30;

/// Suggestions returned per search.
pub const SUGGESTION_LIMIT: usize = 5;

// =============================================================================
// Saved Records
// =============================================================================

/// A remembered client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SavedClient {
    pub name: String,
    pub email: Option<String>,
    pub address: Option<String>,
    #[ts(as = "String")]
    pub last_used: DateTime<Utc>,
}

impl From<SavedClient> for ClientInfo {
    fn from(saved: SavedClient) -> Self {
        ClientInfo {
            name: saved.name,
            email: saved.email,
            address: saved.address,
        }
    }
}

/// A remembered line item description with its last rate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SavedItem {
    pub description: String,
    pub rate: f64,
    pub use_count: u32,
    #[ts(as = "String")]
    pub last_used: DateTime<Utc>,
}

// =============================================================================
// Store Interfaces
// =============================================================================

/// Remembers clients and suggests them back.
#[async_trait]
pub trait ClientSuggestionStore: Send + Sync {
    /// Records a client as just used. Blank names are ignored.
    async fn save(&self, client: ClientInfo) -> CoreResult<()>;

    /// Up to [`SUGGESTION_LIMIT`] clients matching `query`, best first.
    async fn search(&self, query: &str) -> CoreResult<Vec<SavedClient>>;
}

/// Remembers item descriptions with rates and suggests them back.
#[async_trait]
pub trait ItemSuggestionStore: Send + Sync {
    /// Records an item as just used. Blank descriptions are ignored.
    async fn save(&self, description: &str, rate: f64) -> CoreResult<()>;

    /// Up to [`SUGGESTION_LIMIT`] items matching `query`, most used first.
    async fn search(&self, query: &str) -> CoreResult<Vec<SavedItem>>;
}

// =============================================================================
// Shared Rules
// =============================================================================

/// Inserts or refreshes a client in a most-recent-first list.
///
/// The new record's email and address replace the stored ones, even when empty.
pub fn remember_client(clients: &mut Vec<SavedClient>, client: ClientInfo, now: DateTime<Utc>) {
    if client.name.trim().is_empty() {
        return;
    }

    clients.retain(|saved| saved.name != client.name);

    clients.insert(
        0,
        SavedClient {
            name: client.name,
            email: client.email,
            address: client.address,
            last_used: now,
        },
    );
    clients.truncate(CLIENT_CAPACITY);
}

/// Filters a most-recent-first client list by `query`.
pub fn rank_clients(clients: &[SavedClient], query: &str) -> Vec<SavedClient> {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return Vec::new();
    }

    clients
        .iter()
        .filter(|client| {
            client.name.to_lowercase().contains(&query)
                || client
                    .email
                    .as_deref()
                    .is_some_and(|email| email.to_lowercase().contains(&query))
        })
        .take(SUGGESTION_LIMIT)
        .cloned()
        .collect()
}

/// Inserts or refreshes an item in a most-recent-first list.
pub fn remember_item(items: &mut Vec<SavedItem>, description: &str, rate: f64, now: DateTime<Utc>) {
    if description.trim().is_empty() {
        return;
    }

    let use_count = items
        .iter()
        .position(|saved| saved.description == description)
        .map(|index| items.remove(index).use_count)
        .unwrap_or(0)
        .saturating_add(1);

    items.insert(
        0,
        SavedItem {
            description: description.to_string(),
            rate: crate::totals::sanitize(rate),
            use_count,
            last_used: now,
        },
    );
    items.truncate(ITEM_CAPACITY);
}

/// Filters a most-recent-first item list by `query`, most used first.
pub fn rank_items(items: &[SavedItem], query: &str) -> Vec<SavedItem> {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return Vec::new();
    }

    let mut matches: Vec<SavedItem> = items
        .iter()
        .filter(|item| item.description.to_lowercase().contains(&query))
        .cloned()
        .collect();

    // Stable sort keeps recency order among equal counts
    matches.sort_by(|a, b| b.use_count.cmp(&a.use_count));
    matches.truncate(SUGGESTION_LIMIT);
    matches
}

// =============================================================================
// In-Memory Stores
// =============================================================================

/// Process-local client memory.
#[derive(Debug, Default)]
pub struct InMemoryClientStore {
    clients: Mutex<Vec<SavedClient>>,
}

impl InMemoryClientStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every remembered client, most recent first.
    pub fn all(&self) -> CoreResult<Vec<SavedClient>> {
        Ok(self.clients.lock().map_err(poisoned)?.clone())
    }
}

#[async_trait]
impl ClientSuggestionStore for InMemoryClientStore {
    async fn save(&self, client: ClientInfo) -> CoreResult<()> {
        let mut clients = self.clients.lock().map_err(poisoned)?;
        remember_client(&mut clients, client, Utc::now());
        Ok(())
    }

    async fn search(&self, query: &str) -> CoreResult<Vec<SavedClient>> {
        let clients = self.clients.lock().map_err(poisoned)?;
        Ok(rank_clients(&clients, query))
    }
}

/// Process-local item memory.
#[derive(Debug, Default)]
pub struct InMemoryItemStore {
    items: Mutex<Vec<SavedItem>>,
}

impl InMemoryItemStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every remembered item, most recent first.
    pub fn all(&self) -> CoreResult<Vec<SavedItem>> {
        Ok(self.items.lock().map_err(poisoned)?.clone())
    }
}

#[async_trait]
impl ItemSuggestionStore for InMemoryItemStore {
    async fn save(&self, description: &str, rate: f64) -> CoreResult<()> {
        let mut items = self.items.lock().map_err(poisoned)?;
        remember_item(&mut items, description, rate, Utc::now());
        Ok(())
    }

    async fn search(&self, query: &str) -> CoreResult<Vec<SavedItem>> {
        let items = self.items.lock().map_err(poisoned)?;
        Ok(rank_items(&items, query))
    }
}

fn poisoned<T>(_: std::sync::PoisonError<T>) -> CoreError {
    CoreError::Store("suggestion store lock poisoned".to_string())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn client(name: &str, email: Option<&str>) -> ClientInfo {
        ClientInfo {
            name: name.to_string(),
            email: email.map(str::to_string),
            address: None,
        }
    }

    #[test]
    fn test_client_resave_moves_to_front_and_replaces_fields() {
        let mut clients = Vec::new();
        let now = Utc::now();
        remember_client(&mut clients, client("Acme", Some("ap@acme.test")), now);
        remember_client(&mut clients, client("Globex", None), now);
        remember_client(&mut clients, client("Acme", Some("billing@acme.test")), now);

        assert_eq!(clients.len(), 2);
        assert_eq!(clients[0].name, "Acme");
        assert_eq!(clients[0].email.as_deref(), Some("billing@acme.test"));

        // A cleared email is not resurrected
        remember_client(&mut clients, client("Acme", None), now);
        assert_eq!(clients.len(), 2);
        assert!(clients[0].email.is_none());
    }

    #[test]
    fn test_blank_client_is_ignored() {
        let mut clients = Vec::new();
        remember_client(&mut clients, client("  ", None), Utc::now());
        assert!(clients.is_empty());
    }

    #[test]
    fn test_client_capacity_evicts_oldest() {
        let mut clients = Vec::new();
        for i in 0..(CLIENT_CAPACITY + 3) {
            remember_client(&mut clients, client(&format!("Client {i}"), None), Utc::now());
        }

        assert_eq!(clients.len(), CLIENT_CAPACITY);
        assert_eq!(clients[0].name, format!("Client {}", CLIENT_CAPACITY + 2));
        assert!(!clients.iter().any(|c| c.name == "Client 0"));
    }

    #[test]
    fn test_rank_clients_matches_name_or_email() {
        let mut clients = Vec::new();
        let now = Utc::now();
        remember_client(&mut clients, client("Acme", Some("billing@acme.test")), now);
        remember_client(&mut clients, client("Initech", Some("pay@initech.test")), now);

        assert_eq!(rank_clients(&clients, "ACME").len(), 1);
        assert_eq!(rank_clients(&clients, "pay@")[0].name, "Initech");
        assert_eq!(rank_clients(&clients, ".test").len(), 2);
        assert!(rank_clients(&clients, "").is_empty());
    }

    #[test]
    fn test_item_use_count_and_rate_update() {
        let mut items = Vec::new();
        let now = Utc::now();
        remember_item(&mut items, "Logo design", 300.0, now);
        remember_item(&mut items, "Logo design", 350.0, now);

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].use_count, 2);
        assert_eq!(items[0].rate, 350.0);
    }

    #[test]
    fn test_rank_items_by_use_count_then_recency() {
        let mut items = Vec::new();
        let now = Utc::now();
        remember_item(&mut items, "Web hosting", 10.0, now);
        remember_item(&mut items, "Web design", 500.0, now);
        remember_item(&mut items, "Web design", 500.0, now);
        remember_item(&mut items, "Web fonts", 20.0, now);

        let ranked = rank_items(&items, "web");
        let order: Vec<&str> = ranked.iter().map(|i| i.description.as_str()).collect();
        assert_eq!(order, vec!["Web design", "Web fonts", "Web hosting"]);
    }

    #[test]
    fn test_rank_limit() {
        let mut items = Vec::new();
        for i in 0..10 {
            remember_item(&mut items, &format!("Task {i}"), 1.0, Utc::now());
        }
        assert_eq!(rank_items(&items, "task").len(), SUGGESTION_LIMIT);
    }

    #[tokio::test]
    async fn test_in_memory_stores() {
        let clients = InMemoryClientStore::new();
        clients.save(client("Acme", None)).await.unwrap();
        assert_eq!(clients.search("ac").await.unwrap().len(), 1);

        let items = InMemoryItemStore::new();
        items.save("Support", 80.0).await.unwrap();
        items.save("  ", 80.0).await.unwrap();
        assert_eq!(items.all().unwrap().len(), 1);
        assert_eq!(items.search("SUPP").await.unwrap()[0].rate, 80.0);
    }
}
