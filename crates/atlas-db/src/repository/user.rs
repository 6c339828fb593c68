//! # User Repository
//!
//! Operator accounts and authentication.
//!
//! ## Authentication Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │  authenticate(username, password)                               │
//! │       │                                                         │
//! │       ▼                                                         │
//! │  load hash ──► unknown user?   ──► InvalidCredentials           │
//! │       │        inactive user?  ──► InvalidCredentials           │
//! │       ▼                                                         │
//! │  StoredHash::verify                                             │
//! │       │  mismatch ────────────────► InvalidCredentials          │
//! │       ▼                                                         │
//! │  legacy hash? ──► rehash with bcrypt, store                     │
//! │       │                                                         │
//! │       ▼                                                         │
//! │  update last_login, log "login", return stripped User           │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! All three failure modes return the same [`DbError::InvalidCredentials`]
//! so a caller cannot enumerate usernames; the distinction is logged.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info, warn};

use atlas_core::password::{hash_password, StoredHash};
use atlas_core::validation::validate_username;
use atlas_core::{NewUser, RecordStatus, User, UserUpdate};

use crate::error::{DbError, DbResult};
use crate::repository::activity::ActivityLogRepository;

/// Columns returned to callers. The password hash is never selected here.
const USER_COLUMNS: &str = "id, username, role, full_name, email, status, created_at, last_login";

/// Internal row for credential checks only.
#[derive(sqlx::FromRow)]
struct AuthRow {
    id: i64,
    password_hash: String,
    status: RecordStatus,
}

/// Repository for operator accounts.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    /// Creates a new UserRepository.
    pub fn new(pool: SqlitePool) -> Self {
        UserRepository { pool }
    }

    /// Creates a new user account.
    ///
    /// The plaintext password is hashed with bcrypt before storage. A
    /// duplicate username surfaces as [`DbError::Conflict`].
    pub async fn create(&self, new_user: &NewUser) -> DbResult<User> {
        validate_username(&new_user.username)?;

        let password_hash = hash_password(&new_user.password)?;
        let now = Utc::now();

        debug!(username = %new_user.username, "Creating user");

        let result = sqlx::query(
            r#"
            INSERT INTO users (username, password_hash, role, full_name, email, status, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, 'active', ?6)
            "#,
        )
        .bind(new_user.username.trim())
        .bind(&password_hash)
        .bind(new_user.role)
        .bind(&new_user.full_name)
        .bind(&new_user.email)
        .bind(now)
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_rowid();
        info!(user_id = id, username = %new_user.username, "User created");

        self.get_by_id(id).await
    }

    /// Gets a user by ID, regardless of status.
    pub async fn get_by_id(&self, id: i64) -> DbResult<User> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1");

        sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("User", id.to_string()))
    }

    /// Lists active users, newest first.
    pub async fn list(&self) -> DbResult<Vec<User>> {
        let sql = format!(
            "SELECT {USER_COLUMNS} FROM users WHERE status = 'active' ORDER BY created_at DESC"
        );

        let users = sqlx::query_as::<_, User>(&sql).fetch_all(&self.pool).await?;
        Ok(users)
    }

    /// Updates a user account.
    ///
    /// `update.password = Some(..)` rehashes with the strong scheme;
    /// `None` leaves the stored hash untouched.
    pub async fn update(&self, id: i64, update: &UserUpdate) -> DbResult<User> {
        validate_username(&update.username)?;

        debug!(user_id = id, "Updating user");

        let result = match &update.password {
            Some(password) => {
                let password_hash = hash_password(password)?;
                sqlx::query(
                    r#"
                    UPDATE users
                    SET username = ?1, role = ?2, full_name = ?3, email = ?4,
                        status = ?5, password_hash = ?6
                    WHERE id = ?7
                    "#,
                )
                .bind(update.username.trim())
                .bind(update.role)
                .bind(&update.full_name)
                .bind(&update.email)
                .bind(update.status)
                .bind(&password_hash)
                .bind(id)
                .execute(&self.pool)
                .await?
            }
            None => {
                sqlx::query(
                    r#"
                    UPDATE users
                    SET username = ?1, role = ?2, full_name = ?3, email = ?4, status = ?5
                    WHERE id = ?6
                    "#,
                )
                .bind(update.username.trim())
                .bind(update.role)
                .bind(&update.full_name)
                .bind(&update.email)
                .bind(update.status)
                .bind(id)
                .execute(&self.pool)
                .await?
            }
        };

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("User", id.to_string()));
        }

        self.get_by_id(id).await
    }

    /// Soft-deletes a user: flips status to inactive. The row stays so
    /// past sales and activity entries keep their reference.
    pub async fn deactivate(&self, id: i64) -> DbResult<()> {
        let result = sqlx::query("UPDATE users SET status = 'inactive' WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("User", id.to_string()));
        }

        info!(user_id = id, "User deactivated");
        Ok(())
    }

    /// Authenticates an operator by username and password.
    ///
    /// Returns the stripped [`User`] record on success. All failure modes
    /// collapse to [`DbError::InvalidCredentials`]; a legacy hash that
    /// verifies is transparently upgraded to bcrypt.
    pub async fn authenticate(&self, username: &str, password: &str) -> DbResult<User> {
        let username = username.trim();

        let row = sqlx::query_as::<_, AuthRow>(
            "SELECT id, password_hash, status FROM users WHERE username = ?1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        let row = match row {
            Some(row) => row,
            None => {
                warn!(username = %username, "Login attempt for unknown username");
                return Err(DbError::InvalidCredentials);
            }
        };

        if !row.status.is_active() {
            warn!(user_id = row.id, "Login attempt for inactive account");
            return Err(DbError::InvalidCredentials);
        }

        let stored = StoredHash::parse(&row.password_hash);
        if !stored.verify(password) {
            warn!(user_id = row.id, "Login attempt with wrong password");
            return Err(DbError::InvalidCredentials);
        }

        if stored.needs_upgrade() {
            self.upgrade_hash(row.id, password).await?;
        }

        let now = Utc::now();
        sqlx::query("UPDATE users SET last_login = ?1 WHERE id = ?2")
            .bind(now)
            .bind(row.id)
            .execute(&self.pool)
            .await?;

        // Best effort: a full audit table must never block a login.
        ActivityLogRepository::new(self.pool.clone())
            .record_best_effort(row.id, "login", None, None)
            .await;

        info!(user_id = row.id, username = %username, "User authenticated");
        self.get_by_id(row.id).await
    }

    /// Replaces a verified legacy hash with a bcrypt hash.
    async fn upgrade_hash(&self, id: i64, password: &str) -> DbResult<()> {
        let new_hash = hash_password(password)?;

        sqlx::query("UPDATE users SET password_hash = ?1 WHERE id = ?2")
            .bind(&new_hash)
            .bind(id)
            .execute(&self.pool)
            .await?;

        info!(user_id = id, "Upgraded legacy password hash");
        Ok(())
    }

    /// Returns the raw stored hash for a username. Bootstrap-only helper;
    /// not exposed through the Database accessors' public surface.
    pub(crate) async fn stored_hash(&self, username: &str) -> DbResult<Option<String>> {
        let hash: Option<String> =
            sqlx::query_scalar("SELECT password_hash FROM users WHERE username = ?1")
                .bind(username)
                .fetch_optional(&self.pool)
                .await?;
        Ok(hash)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
