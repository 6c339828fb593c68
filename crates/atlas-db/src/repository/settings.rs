//! # Settings Store
//!
//! Free-form key/value configuration (store name, tax rate, receipt
//! footer, currency symbol). Values are uninterpreted text; typed
//! accessors live with the callers that know the expected shape.
//!
//! Writes are upserts: setting an existing key overwrites its value and
//! bumps `updated_at`, keeping any description already stored.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use atlas_core::Setting;

use crate::error::DbResult;

/// Repository for configuration rows.
#[derive(Debug, Clone)]
pub struct SettingsRepository {
    pool: SqlitePool,
}

impl SettingsRepository {
    /// Creates a new SettingsRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SettingsRepository { pool }
    }

    /// Gets a setting value. `Ok(None)` for unknown keys.
    pub async fn get(&self, key: &str) -> DbResult<Option<String>> {
        let value: Option<Option<String>> =
            sqlx::query_scalar("SELECT value FROM settings WHERE key = ?1")
                .bind(key)
                .fetch_optional(&self.pool)
                .await?;

        Ok(value.flatten())
    }

    /// Upserts a setting value.
    pub async fn set(&self, key: &str, value: &str) -> DbResult<()> {
        debug!(key = %key, "Setting updated");

        sqlx::query(
            r#"
            INSERT INTO settings (key, value, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT (key) DO UPDATE SET value = excluded.value,
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

    /// Upserts a setting with a description. Used by bootstrap to seed
    /// defaults; the description survives later plain `set` calls.
    pub async fn set_with_description(
        &self,
        key: &str,
        value: &str,
        description: &str,
    ) -> DbResult<()> {
        sqlx::query(
            r#"
            INSERT INTO settings (key, value, description, updated_at)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT (key) DO UPDATE SET value = excluded.value,
                                            description = excluded.description,
                                            updated_at = excluded.updated_at
            "#,
        )
        .bind(key)
        .bind(value)
        .bind(description)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Returns all settings rows, by key.
    pub async fn all(&self) -> DbResult<Vec<Setting>> {
        let rows = sqlx::query_as::<_, Setting>("SELECT * FROM settings ORDER BY key")
            .fetch_all(&self.pool)
            .await?;

        Ok(rows)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    #[tokio::test]
    async fn test_get_unknown_key() {
        let db = test_db().await;
        assert_eq!(db.settings().get("no_such_key").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_set_then_overwrite() {
        let db = test_db().await;
        let repo = db.settings();

        repo.set("store_name", "Atlas Mart").await.unwrap();
        assert_eq!(repo.get("store_name").await.unwrap().as_deref(), Some("Atlas Mart"));

        repo.set("store_name", "Atlas Supermart").await.unwrap();
        assert_eq!(
            repo.get("store_name").await.unwrap().as_deref(),
            Some("Atlas Supermart")
        );

        // Still one row.
        assert_eq!(repo.all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_description_survives_plain_set() {
        let db = test_db().await;
        let repo = db.settings();

        repo.set_with_description("tax_rate", "0", "Sales tax percentage")
            .await
            .unwrap();
        repo.set("tax_rate", "8.25").await.unwrap();

        let rows = repo.all().await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].value.as_deref(), Some("8.25"));
        assert_eq!(rows[0].description.as_deref(), Some("Sales tax percentage"));
    }
}
