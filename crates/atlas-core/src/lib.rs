//! # atlas-core: Pure Business Logic for Atlas POS
//!
//! This crate is the **heart** of Atlas POS. It contains all business rules
//! as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                     Atlas POS Data Flow                         │
//! │                                                                 │
//! │  Presentation layer (desktop shell, out of scope)               │
//! │       │                                                         │
//! │       ▼                                                         │
//! │  ┌─────────────────────────────────────────────────────────┐   │
//! │  │              ★ atlas-core (THIS CRATE) ★               │   │
//! │  │                                                         │   │
//! │  │  ┌────────┐ ┌───────┐ ┌──────┐ ┌──────────┐ ┌───────┐ │   │
//! │  │  │ types  │ │ money │ │ cart │ │ password │ │ valid │ │   │
//! │  │  └────────┘ └───────┘ └──────┘ └──────────┘ └───────┘ │   │
//! │  │                                                         │   │
//! │  │  NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS    │   │
//! │  └─────────────────────────────────────────────────────────┘   │
//! │       │                                                         │
//! │       ▼                                                         │
//! │  atlas-db (SQLite repositories, transaction engine)             │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//!
//! 1. **Integer Money**: All monetary values are cents (i64), never floats
//! 2. **Explicit Errors**: All errors are typed, never strings or panics
//! 3. **Carts are values**: a cart is an ordered list of line items handed
//!    wholesale to the transaction engine, never mutated by it

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod error;
pub mod money;
pub mod password;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use cart::{Cart, CartItem, SaleDraft, SaleLine};
pub use error::{CoreError, ValidationError};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum distinct line items allowed in a single cart.
///
/// Prevents runaway carts and keeps transactions reviewable on a receipt.
pub const MAX_CART_ITEMS: usize = 100;

/// Maximum quantity of a single line item.
///
/// Prevents accidental over-ordering (e.g., typing 1000 instead of 10).
pub const MAX_ITEM_QUANTITY: i64 = 999;
