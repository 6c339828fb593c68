//! # Activity Log
//!
//! Append-only audit trail. Two write paths:
//!
//! - [`record`](ActivityLogRepository::record): fallible, for callers
//!   that treat the audit entry as part of their operation
//! - [`record_best_effort`](ActivityLogRepository::record_best_effort):
//!   swallows and logs failures, for callers whose primary operation
//!   (login, committed sale) must never be undone by a full audit table

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::warn;

use atlas_core::ActivityLog;

use crate::error::{DbError, DbResult};

/// Repository for audit trail entries.
#[derive(Debug, Clone)]
pub struct ActivityLogRepository {
    pool: SqlitePool,
}

impl ActivityLogRepository {
    /// Creates a new ActivityLogRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ActivityLogRepository { pool }
    }

    /// Appends an audit entry. The action tag is required.
    pub async fn record(
        &self,
        user_id: i64,
        action: &str,
        details: Option<String>,
        ip_address: Option<String>,
    ) -> DbResult<()> {
        let action = action.trim();
        if action.is_empty() {
            return Err(DbError::Validation(
                atlas_core::ValidationError::Required {
                    field: "action".to_string(),
                },
            ));
        }

        sqlx::query(
            r#"
            INSERT INTO activity_logs (user_id, action, details, ip_address, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(user_id)
        .bind(action)
        .bind(details)
        .bind(ip_address)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Appends an audit entry, logging instead of failing on error.
    pub async fn record_best_effort(
        &self,
        user_id: i64,
        action: &str,
        details: Option<String>,
        ip_address: Option<String>,
    ) {
        if let Err(e) = self.record(user_id, action, details, ip_address).await {
            warn!(user_id, action, error = %e, "Failed to write activity log entry");
        }
    }

    /// Returns the most recent entries, newest first.
    pub async fn recent(&self, limit: i64) -> DbResult<Vec<ActivityLog>> {
        let entries = sqlx::query_as::<_, ActivityLog>(
            "SELECT * FROM activity_logs ORDER BY created_at DESC, id DESC LIMIT ?1",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use atlas_core::{NewUser, Role};

    async fn test_db_with_user() -> (Database, i64) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let user = db
            .users()
            .create(&NewUser {
                username: "admin".to_string(),
                password: "admin123".to_string(),
                role: Role::Admin,
                full_name: "Admin".to_string(),
                email: None,
            })
            .await
            .unwrap();
        (db, user.id)
    }

    #[tokio::test]
    async fn test_record_and_recent() {
        let (db, user_id) = test_db_with_user().await;
        let repo = db.activity();

        repo.record(user_id, "product_created", Some("Bread".to_string()), None)
            .await
            .unwrap();
        repo.record(user_id, "product_updated", None, Some("127.0.0.1".to_string()))
            .await
            .unwrap();

        let entries = repo.recent(10).await.unwrap();
        // user creation does not log; the two explicit entries do,
        // newest first.
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].action, "product_updated");
        assert_eq!(entries[1].action, "product_created");
        assert_eq!(entries[1].details.as_deref(), Some("Bread"));
    }

    #[tokio::test]
    async fn test_empty_action_rejected() {
        let (db, user_id) = test_db_with_user().await;

        let result = db.activity().record(user_id, "   ", None, None).await;
        assert!(matches!(result, Err(DbError::Validation(_))));
    }

    #[tokio::test]
    async fn test_best_effort_swallows_fk_failure() {
        let (db, _) = test_db_with_user().await;

        // user_id 9999 violates the FK; the call must not panic or error.
        db.activity()
            .record_best_effort(9999, "ghost", None, None)
            .await;

        assert_eq!(db.activity().recent(10).await.unwrap().len(), 0);
    }

    #[tokio::test]
    async fn test_login_is_logged() {
        let (db, user_id) = test_db_with_user().await;

        db.users().authenticate("admin", "admin123").await.unwrap();

        let entries = db.activity().recent(10).await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].action, "login");
        assert_eq!(entries[0].user_id, user_id);
    }
}
