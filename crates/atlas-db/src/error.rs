//! # Database Error Types
//!
//! Error taxonomy for storage operations.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │  SQLite Error (sqlx::Error)                                     │
//! │       │                                                         │
//! │       ▼                                                         │
//! │  DbError (this module) ← categorized: Conflict, NotFound,       │
//! │       │                  InsufficientStock, InvalidCredentials  │
//! │       ▼                                                         │
//! │  Presentation layer renders a user-facing message               │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Storage failures are always fatal to the current operation and never
//! swallowed - except activity-log writes, whose callers use the
//! explicit best-effort path (see `repository::activity`).

use thiserror::Error;

use atlas_core::{CoreError, ValidationError};

/// Database operation errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// Entity not found, or soft-deleted and therefore invisible.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Uniqueness violation: duplicate username, category name, barcode
    /// or sale number. Surfaced to the caller; the core never retries.
    #[error("Duplicate {field}: already exists")]
    Conflict { field: String },

    /// Foreign key constraint violation.
    #[error("Foreign key violation: {message}")]
    ForeignKeyViolation { message: String },

    /// A sale line requested more than the available quantity at write
    /// time. The whole sale was rolled back.
    #[error("Insufficient stock for product {product_id}: available {available}, requested {requested}")]
    InsufficientStock {
        product_id: i64,
        available: i64,
        requested: i64,
    },

    /// Uniform authentication failure. Deliberately does not say whether
    /// the user is unknown, inactive, or the password mismatched - that
    /// distinction lives only in logs.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Malformed input, rejected before any write.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Core domain failure (e.g. password hashing).
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Database connection failed.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Migration failed.
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// Query execution failed.
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Pool exhausted (all connections in use).
    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// Internal database error.
    #[error("Internal database error: {0}")]
    Internal(String),
}

impl DbError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Creates a Conflict error for a duplicate field.
    pub fn conflict(field: impl Into<String>) -> Self {
        DbError::Conflict {
            field: field.into(),
        }
    }
}

/// Convert sqlx errors to DbError.
///
/// ## Error Mapping
/// ```text
/// sqlx::Error::RowNotFound  → DbError::NotFound
/// sqlx::Error::Database     → analyze message for constraint type
/// sqlx::Error::PoolTimedOut → DbError::PoolExhausted
/// Other                     → DbError::Internal
/// ```
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::NotFound {
                entity: "Record".to_string(),
                id: "unknown".to_string(),
            },

            sqlx::Error::Database(db_err) => {
                let msg = db_err.message();

                // SQLite constraint messages:
                // "UNIQUE constraint failed: <table>.<column>"
                // "FOREIGN KEY constraint failed"
                if msg.contains("UNIQUE constraint failed") {
                    let field = msg
                        .split("UNIQUE constraint failed: ")
                        .nth(1)
                        .unwrap_or("unknown")
                        .to_string();
                    DbError::Conflict { field }
                } else if msg.contains("FOREIGN KEY constraint failed") {
                    DbError::ForeignKeyViolation {
                        message: msg.to_string(),
                    }
                } else {
                    DbError::QueryFailed(msg.to_string())
                }
            }

            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,

            sqlx::Error::PoolClosed => DbError::ConnectionFailed("Pool is closed".to_string()),

            _ => DbError::Internal(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;
