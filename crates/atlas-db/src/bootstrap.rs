//! # First-Run Bootstrap
//!
//! Idempotent setup for a fresh installation: a default admin account,
//! a starter set of categories, and the settings rows the presentation
//! layer expects to find.
//!
//! Runs on every startup; existing data short-circuits each step. The
//! default admin password is intended to be changed on first login.

use tracing::{info, warn};

use atlas_core::password::{hash_password, StoredHash};
use atlas_core::{NewCategory, NewUser, Role};

use crate::error::DbResult;
use crate::pool::Database;

/// Username of the bootstrap admin account.
pub const DEFAULT_ADMIN_USERNAME: &str = "admin";

/// Initial password for the bootstrap admin account.
pub const DEFAULT_ADMIN_PASSWORD: &str = "admin123";

const DEFAULT_CATEGORIES: &[(&str, &str)] = &[
    ("Electronics", "Electronic devices and accessories"),
    ("Clothing", "Apparel and fashion items"),
    ("Food & Beverages", "Food and drink items"),
    ("Books", "Books and educational materials"),
    ("Home & Garden", "Home improvement and garden items"),
];

const DEFAULT_SETTINGS: &[(&str, &str, &str)] = &[
    ("currency", "USD", "Default currency"),
    ("language", "en", "Default language"),
    ("theme", "light", "Default theme"),
    ("receipt_printer", "", "Receipt printer name"),
    ("company_name", "Atlas POS", "Company name for receipts"),
    ("company_address", "", "Company address"),
    ("company_phone", "", "Company phone number"),
    ("company_email", "", "Company email"),
    ("tax_rate", "0.0", "Tax rate percentage"),
    ("receipt_footer", "Thank you for your business!", "Receipt footer message"),
];

/// Ensures the default admin, categories, and settings exist.
///
/// Safe to call on every startup. If the admin account still carries a
/// legacy hash for the default password, it is upgraded in place.
pub async fn ensure_defaults(db: &Database) -> DbResult<()> {
    let admin_count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE role = 'admin'")
            .fetch_one(db.pool())
            .await?;

    if admin_count == 0 {
        info!("No admin account found, creating defaults");

        db.users()
            .create(&NewUser {
                username: DEFAULT_ADMIN_USERNAME.to_string(),
                password: DEFAULT_ADMIN_PASSWORD.to_string(),
                role: Role::Admin,
                full_name: "System Administrator".to_string(),
                email: None,
            })
            .await?;

        for (name, description) in DEFAULT_CATEGORIES {
            db.categories()
                .create(&NewCategory {
                    name: (*name).to_string(),
                    description: Some((*description).to_string()),
                })
                .await?;
        }

        for (key, value, description) in DEFAULT_SETTINGS {
            db.settings()
                .set_with_description(key, value, description)
                .await?;
        }

        warn!(
            username = DEFAULT_ADMIN_USERNAME,
            "Default admin created; change the password on first login"
        );
    } else {
        upgrade_legacy_admin_hash(db).await?;
    }

    Ok(())
}

/// Upgrades the admin account's hash if it is still the legacy scheme
/// and matches the default password. A legacy hash with a changed
/// password upgrades on the owner's next login instead.
async fn upgrade_legacy_admin_hash(db: &Database) -> DbResult<()> {
    let stored = match db.users().stored_hash(DEFAULT_ADMIN_USERNAME).await? {
        Some(hash) => hash,
        None => return Ok(()),
    };

    let parsed = StoredHash::parse(&stored);
    if parsed.needs_upgrade() && parsed.verify(DEFAULT_ADMIN_PASSWORD) {
        info!("Upgrading admin account to the current hash scheme");
        let new_hash = hash_password(DEFAULT_ADMIN_PASSWORD)?;
        sqlx::query("UPDATE users SET password_hash = ?1 WHERE username = ?2")
            .bind(&new_hash)
            .bind(DEFAULT_ADMIN_USERNAME)
            .execute(db.pool())
            .await?;
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use atlas_core::password::legacy_sha256_hex;
    use chrono::Utc;

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    #[tokio::test]
    async fn test_bootstrap_creates_defaults() {
        let db = test_db().await;
        ensure_defaults(&db).await.unwrap();

        let admin = db
            .users()
            .authenticate(DEFAULT_ADMIN_USERNAME, DEFAULT_ADMIN_PASSWORD)
            .await
            .unwrap();
        assert_eq!(admin.role, atlas_core::Role::Admin);

        assert_eq!(db.categories().list().await.unwrap().len(), 5);
        assert_eq!(
            db.settings().get("receipt_footer").await.unwrap().as_deref(),
            Some("Thank you for your business!")
        );
    }

    #[tokio::test]
    async fn test_bootstrap_idempotent() {
        let db = test_db().await;
        ensure_defaults(&db).await.unwrap();
        ensure_defaults(&db).await.unwrap();

        assert_eq!(db.categories().list().await.unwrap().len(), 5);
        assert_eq!(db.users().list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_bootstrap_skips_when_admin_exists() {
        let db = test_db().await;
        db.users()
            .create(&NewUser {
                username: "owner".to_string(),
                password: "ownerpass".to_string(),
                role: Role::Admin,
                full_name: "Owner".to_string(),
                email: None,
            })
            .await
            .unwrap();

        ensure_defaults(&db).await.unwrap();

        // No default admin, categories, or settings were added.
        assert!(db.categories().list().await.unwrap().is_empty());
        assert!(matches!(
            db.users().authenticate("admin", "admin123").await,
            Err(crate::error::DbError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn test_legacy_admin_hash_upgraded() {
        let db = test_db().await;

        let legacy = legacy_sha256_hex(DEFAULT_ADMIN_PASSWORD);
        sqlx::query(
            r#"
            INSERT INTO users (username, password_hash, role, full_name, status, created_at)
            VALUES ('admin', ?1, 'admin', 'System Administrator', 'active', ?2)
            "#,
        )
        .bind(&legacy)
        .bind(Utc::now())
        .execute(db.pool())
        .await
        .unwrap();

        ensure_defaults(&db).await.unwrap();

        let stored = db.users().stored_hash("admin").await.unwrap().unwrap();
        assert!(stored.starts_with("$2"));

        db.users()
            .authenticate(DEFAULT_ADMIN_USERNAME, DEFAULT_ADMIN_PASSWORD)
            .await
            .unwrap();
    }
}
