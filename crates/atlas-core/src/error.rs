//! # Error Types
//!
//! Domain-specific error types for atlas-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │  atlas-core errors (this file)                                  │
//! │  ├── CoreError        - domain failures (hashing, wrapped       │
//! │  │                      validation)                             │
//! │  └── ValidationError  - malformed input, caught before any      │
//! │                         write                                   │
//! │                                                                 │
//! │  atlas-db errors (separate crate)                               │
//! │  └── DbError          - storage failures, conflicts,            │
//! │                         insufficient stock, auth failure        │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. `thiserror` derive macros, not manual impls
//! 2. Context in messages (field names, limits)
//! 3. Errors are enum variants, never bare strings

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Password hashing failed (an internal bcrypt error, not a
    /// verification mismatch - mismatches are a boolean result).
    #[error("Password hashing failed: {0}")]
    PasswordHash(String),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These are raised before any write, so a failing input is never
/// partially applied.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., malformed barcode).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// A checkout was attempted with no line items.
    #[error("Cart is empty")]
    EmptyCart,

    /// Sale header totals do not satisfy
    /// `total = subtotal + tax - discount`.
    #[error("Sale totals are inconsistent: subtotal {subtotal} + tax {tax} - discount {discount} != total {total}")]
    InconsistentTotals {
        subtotal: i64,
        tax: i64,
        discount: i64,
        total: i64,
    },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
