//! # Domain Types
//!
//! Core domain types used throughout Atlas POS.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                        Domain Types                             │
//! │                                                                 │
//! │  ┌────────────┐  ┌────────────┐  ┌────────────┐                │
//! │  │  Product   │  │    Sale    │  │  SaleItem  │                │
//! │  │  ────────  │  │  ────────  │  │  ────────  │                │
//! │  │  barcode   │  │ sale_number│  │ unit_price │                │
//! │  │  quantity  │  │ total_cents│  │  (frozen)  │                │
//! │  └────────────┘  └────────────┘  └────────────┘                │
//! │                                                                 │
//! │  ┌────────────┐  ┌──────────────┐  ┌─────────────┐             │
//! │  │    Role    │  │ RecordStatus │  │ StockLevel  │             │
//! │  │  Admin     │  │  Active      │  │  InStock    │             │
//! │  │  Cashier   │  │  Inactive    │  │  LowStock   │             │
//! │  │  StockMgr  │  │  Archived    │  │  OutOfStock │             │
//! │  └────────────┘  └──────────────┘  └─────────────┘             │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Records deleted by operators are never removed: they carry a
//! [`RecordStatus`] tag instead, so sales and activity logs keep their
//! references intact.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::money::Money;

// =============================================================================
// Tax Rate
// =============================================================================

/// Tax rate represented in basis points (bps).
///
/// 1 basis point = 0.01% = 1/10000, so 825 bps = 8.25%. Integer basis
/// points keep tax math exact; percentages exist for display only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxRate(u32);

impl TaxRate {
    /// Creates a tax rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        TaxRate(bps)
    }

    /// Creates a tax rate from a percentage (settings store convenience).
    pub fn from_percentage(pct: f64) -> Self {
        TaxRate((pct * 100.0).round() as u32)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Zero tax rate.
    #[inline]
    pub const fn zero() -> Self {
        TaxRate(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl Default for TaxRate {
    fn default() -> Self {
        TaxRate::zero()
    }
}

// =============================================================================
// Enumerations
// =============================================================================

/// Operator role, controls which screens the presentation layer offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Cashier,
    StockManager,
}

/// Soft-delete status carried by users and products.
///
/// A tagged status instead of a boolean flag: `Archived` leaves room for
/// retention workflows without another migration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum RecordStatus {
    Active,
    Inactive,
    Archived,
}

impl RecordStatus {
    #[inline]
    pub const fn is_active(&self) -> bool {
        matches!(self, RecordStatus::Active)
    }
}

impl Default for RecordStatus {
    fn default() -> Self {
        RecordStatus::Active
    }
}

/// How the customer paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    Card,
    Mixed,
}

/// Stock classification for inventory reporting.
///
/// The three levels are mutually exclusive:
/// - `OutOfStock` iff quantity == 0 (a product at threshold with zero
///   stock is out-of-stock, not low-stock)
/// - `LowStock` iff 0 < quantity <= min_quantity
/// - `InStock` otherwise
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockLevel {
    InStock,
    LowStock,
    OutOfStock,
}

impl StockLevel {
    /// Classifies a quantity against its reorder threshold.
    pub const fn classify(quantity: i64, min_quantity: i64) -> Self {
        if quantity == 0 {
            StockLevel::OutOfStock
        } else if quantity <= min_quantity {
            StockLevel::LowStock
        } else {
            StockLevel::InStock
        }
    }
}

// =============================================================================
// User
// =============================================================================

/// An operator account.
///
/// Note there is no `password_hash` field: credential material never
/// leaves the storage layer. Authentication returns this stripped record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct User {
    pub id: i64,
    pub username: String,
    pub role: Role,
    pub full_name: String,
    pub email: Option<String>,
    pub status: RecordStatus,
    pub created_at: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
}

/// Input record for creating a user. Carries the plaintext password;
/// hashing happens at the storage boundary.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub password: String,
    pub role: Role,
    pub full_name: String,
    pub email: Option<String>,
}

/// Input record for updating a user. `password: None` keeps the stored
/// hash; `Some` rehashes with the strong scheme.
#[derive(Debug, Clone)]
pub struct UserUpdate {
    pub username: String,
    pub role: Role,
    pub full_name: String,
    pub email: Option<String>,
    pub status: RecordStatus,
    pub password: Option<String>,
}

// =============================================================================
// Category
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Category listing row with its active-product count.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct CategoryWithCount {
    #[cfg_attr(feature = "sqlx", sqlx(flatten))]
    #[serde(flatten)]
    pub category: Category,
    pub product_count: i64,
}

#[derive(Debug, Clone)]
pub struct NewCategory {
    pub name: String,
    pub description: Option<String>,
}

// =============================================================================
// Product
// =============================================================================

/// A product available for sale.
///
/// `quantity` is the one piece of shared mutable state in the system and
/// is only ever changed by stock-affecting operations (sale decrement,
/// restock, import).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Product {
    pub id: i64,
    pub name: String,
    /// Barcode (EAN-13, UPC-A, etc.). Unique when present.
    pub barcode: Option<String>,
    /// Weak reference: nulled out when the category is deleted.
    pub category_id: Option<i64>,
    /// Display name of the category, joined at read time.
    pub category_name: Option<String>,
    pub price_cents: i64,
    pub cost_price_cents: Option<i64>,
    /// Current stock level. Invariant: never negative.
    pub quantity: i64,
    /// Reorder threshold for low-stock classification.
    pub min_quantity: i64,
    pub description: Option<String>,
    pub image_path: Option<String>,
    pub status: RecordStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Returns the sale price as a Money type.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    /// Classifies the current stock against the reorder threshold.
    #[inline]
    pub fn stock_level(&self) -> StockLevel {
        StockLevel::classify(self.quantity, self.min_quantity)
    }

    /// Checks whether the requested quantity can be sold from stock.
    #[inline]
    pub fn can_sell(&self, requested: i64) -> bool {
        self.status.is_active() && self.quantity >= requested
    }
}

/// Input record for creating a product.
///
/// Manual entry and CSV import both construct this type and feed it to
/// the same insertion path; there is no separate import logic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewProduct {
    pub name: String,
    pub barcode: Option<String>,
    pub category_id: Option<i64>,
    pub price_cents: i64,
    pub cost_price_cents: Option<i64>,
    pub quantity: i64,
    pub min_quantity: i64,
    pub description: Option<String>,
    pub image_path: Option<String>,
}

// =============================================================================
// Sale
// =============================================================================

/// A persisted, immutable record of one completed checkout.
///
/// Invariant (by construction, see [`crate::cart::SaleDraft`]):
/// `total_cents == subtotal_cents + tax_cents - discount_cents`.
/// There is no update path; corrections happen via return records.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Sale {
    pub id: i64,
    /// Human-readable unique identifier, e.g. `SALE-20260823-1A2B3C4D`.
    pub sale_number: String,
    /// The cashier who rang the sale.
    pub user_id: i64,
    pub customer_name: Option<String>,
    pub subtotal_cents: i64,
    pub tax_cents: i64,
    pub discount_cents: i64,
    pub total_cents: i64,
    pub payment_method: PaymentMethod,
    pub payment_status: String,
    pub created_at: DateTime<Utc>,
}

impl Sale {
    /// Checks the sale total invariant.
    #[inline]
    pub fn totals_consistent(&self) -> bool {
        self.total_cents == self.subtotal_cents + self.tax_cents - self.discount_cents
    }

    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }
}

/// One priced line within a sale. Immutable.
///
/// `unit_price_cents` is the price captured at transaction time,
/// deliberately decoupled from the product's current price.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct SaleItem {
    pub id: i64,
    pub sale_id: i64,
    pub product_id: i64,
    pub quantity: i64,
    pub unit_price_cents: i64,
    pub total_price_cents: i64,
}

/// A sale joined with the owning cashier's display name, as returned by
/// the reporting queries.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct SaleWithCashier {
    #[cfg_attr(feature = "sqlx", sqlx(flatten))]
    #[serde(flatten)]
    pub sale: Sale,
    pub cashier_name: String,
}

// =============================================================================
// Activity Log
// =============================================================================

/// One append-only audit trail entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct ActivityLog {
    pub id: i64,
    pub user_id: i64,
    /// Free-text action tag, e.g. "login", "sale_completed".
    pub action: String,
    pub details: Option<String>,
    pub ip_address: Option<String>,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Setting
// =============================================================================

/// A key/value configuration row with upsert semantics.
/// Value content is uninterpreted; type coercion is the caller's job.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Setting {
    pub key: String,
    pub value: Option<String>,
    pub description: Option<String>,
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Unit Tests
// =============================================================================
