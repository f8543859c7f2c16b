//! # Settings Repository
//!
//! Key/value settings stored as JSON. Currently holds the branding used
//! for rendered invoices.

use chrono::Utc;
use paylance_core::render::Branding;
use sqlx::SqlitePool;
use tracing::{debug, warn};

use crate::error::DbResult;

const BRANDING_KEY: &str = "branding";

/// Repository for application settings.
#[derive(Debug, Clone)]
pub struct SettingsRepository {
    pool: SqlitePool,
}

impl SettingsRepository {
    pub fn new(pool: SqlitePool) -> Self {
        SettingsRepository { pool }
    }

    async fn get(&self, key: &str) -> DbResult<Option<String>> {
        let value: Option<String> = sqlx::query_scalar("SELECT value FROM settings WHERE key = ?1")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;

        Ok(value)
    }

    async fn put(&self, key: &str, value: &str) -> DbResult<()> {
        sqlx::query(
            r#"
            INSERT INTO settings (key, value, updated_at) VALUES (?1, ?2, ?3)
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(key)
        .bind(value)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Loads branding, falling back to defaults when none is stored or the
    /// stored value cannot be read.
    pub async fn load_branding(&self) -> DbResult<Branding> {
        let Some(value) = self.get(BRANDING_KEY).await? else {
            return Ok(Branding::default());
        };

        match serde_json::from_str(&value) {
            Ok(branding) => Ok(branding),
            Err(e) => {
                warn!(error = %e, "Stored branding unreadable, using defaults");
                Ok(Branding::default())
            }
        }
    }

    /// Stores branding.
    pub async fn save_branding(&self, branding: &Branding) -> DbResult<()> {
        debug!(template = %branding.template, "Saving branding");
        let value = serde_json::to_string(branding)?;
        self.put(BRANDING_KEY, &value).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use paylance_core::render::TemplateId;

    async fn repo() -> SettingsRepository {
        Database::new(DbConfig::in_memory()).await.unwrap().settings()
    }

    #[tokio::test]
    async fn test_branding_defaults_when_absent() {
        let repo = repo().await;
        assert_eq!(repo.load_branding().await.unwrap(), Branding::default());
    }

    #[tokio::test]
    async fn test_branding_round_trip() {
        let repo = repo().await;
        let branding = Branding {
            logo: Some("https://example.test/logo.png".to_string()),
            primary_color: "#10b981".to_string(),
            secondary_color: "#059669".to_string(),
            template: TemplateId::Bold,
        };

        repo.save_branding(&branding).await.unwrap();
        assert_eq!(repo.load_branding().await.unwrap(), branding);
    }

    #[tokio::test]
    async fn test_corrupt_branding_falls_back() {
        let repo = repo().await;
        repo.put(BRANDING_KEY, "not json").await.unwrap();
        assert_eq!(repo.load_branding().await.unwrap(), Branding::default());
    }
}
