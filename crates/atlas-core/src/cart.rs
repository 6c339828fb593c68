//! # Cart Module
//!
//! The transient, unpersisted cart a cashier builds before checkout, and
//! the [`SaleDraft`] value handed wholesale to the transaction engine.
//!
//! ## Checkout Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                       Checkout Flow                             │
//! │                                                                 │
//! │  Scan barcode ────► Cart::add_item()   (price frozen here)     │
//! │  Change qty ──────► Cart::update_quantity()                    │
//! │  Remove line ─────► Cart::remove_item()                        │
//! │                                                                 │
//! │  Confirm ─────────► SaleDraft::from_cart()                     │
//! │                          │                                      │
//! │                          ▼  total = subtotal + tax − discount  │
//! │                     create_sale(draft)   (atlas-db, atomic)    │
//! │                                                                 │
//! │  On failure the cart is NOT cleared, so the cashier retries.   │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The engine never mutates a cart; a draft is a snapshot value.

use serde::{Deserialize, Serialize};

use crate::money::Money;
use crate::types::{PaymentMethod, Product, TaxRate};
use crate::{MAX_CART_ITEMS, MAX_ITEM_QUANTITY};

// =============================================================================
// Cart Item
// =============================================================================

/// One line in the cart.
///
/// Product details are frozen at add time: if the product's price changes
/// in the database afterwards, this line keeps the price the cashier saw.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartItem {
    pub product_id: i64,
    /// Product name at time of adding (frozen).
    pub name: String,
    /// Unit price in cents at time of adding (frozen).
    pub unit_price_cents: i64,
    pub quantity: i64,
}

impl CartItem {
    /// Creates a cart line from a product and quantity, freezing the price.
    pub fn from_product(product: &Product, quantity: i64) -> Self {
        CartItem {
            product_id: product.id,
            name: product.name.clone(),
            unit_price_cents: product.price_cents,
            quantity,
        }
    }

    /// Line total (unit price × quantity).
    #[inline]
    pub fn line_total_cents(&self) -> i64 {
        self.unit_price_cents * self.quantity
    }
}

// =============================================================================
// Cart
// =============================================================================

/// The cashier's cart: an ordered list of line items.
///
/// ## Invariants
/// - Lines are unique by `product_id` (re-adding merges quantities)
/// - Quantities are positive (updating to 0 removes the line)
/// - At most [`MAX_CART_ITEMS`] lines, [`MAX_ITEM_QUANTITY`] per line
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Cart {
    pub items: Vec<CartItem>,
}

impl Cart {
    /// Creates a new empty cart.
    pub fn new() -> Self {
        Cart { items: Vec::new() }
    }

    /// Adds a product to the cart, merging with an existing line.
    pub fn add_item(&mut self, product: &Product, quantity: i64) -> Result<(), String> {
        if let Some(item) = self.items.iter_mut().find(|i| i.product_id == product.id) {
            let new_qty = item.quantity + quantity;
            if new_qty > MAX_ITEM_QUANTITY {
                return Err(format!("Quantity would exceed maximum of {}", MAX_ITEM_QUANTITY));
            }
            item.quantity = new_qty;
            return Ok(());
        }

        if self.items.len() >= MAX_CART_ITEMS {
            return Err(format!("Cart cannot have more than {} items", MAX_CART_ITEMS));
        }

        self.items.push(CartItem::from_product(product, quantity));
        Ok(())
    }

    /// Updates the quantity of a line; 0 removes it.
    pub fn update_quantity(&mut self, product_id: i64, quantity: i64) -> Result<(), String> {
        if quantity == 0 {
            return self.remove_item(product_id);
        }

        if quantity > MAX_ITEM_QUANTITY {
            return Err(format!("Quantity cannot exceed {}", MAX_ITEM_QUANTITY));
        }

        if let Some(item) = self.items.iter_mut().find(|i| i.product_id == product_id) {
            item.quantity = quantity;
            Ok(())
        } else {
            Err(format!("Product {} not in cart", product_id))
        }
    }

    /// Removes a line by product id.
    pub fn remove_item(&mut self, product_id: i64) -> Result<(), String> {
        let initial_len = self.items.len();
        self.items.retain(|i| i.product_id != product_id);

        if self.items.len() == initial_len {
            Err(format!("Product {} not in cart", product_id))
        } else {
            Ok(())
        }
    }

    /// Clears all lines.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Number of distinct lines.
    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Total quantity across all lines.
    pub fn total_quantity(&self) -> i64 {
        self.items.iter().map(|i| i.quantity).sum()
    }

    /// Subtotal before tax and discount.
    pub fn subtotal_cents(&self) -> i64 {
        self.items.iter().map(|i| i.line_total_cents()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

// =============================================================================
// Sale Draft
// =============================================================================

/// One priced line of a draft, ready for persistence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaleLine {
    pub product_id: i64,
    pub quantity: i64,
    pub unit_price_cents: i64,
    pub total_price_cents: i64,
}

/// A complete, validated checkout request: the sale header plus its lines.
///
/// Built through [`SaleDraft::from_cart`], which computes
/// `total = subtotal + tax − discount` so the sale total invariant holds
/// by construction. The transaction engine consumes a draft by reference
/// and never mutates it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaleDraft {
    pub user_id: i64,
    pub customer_name: Option<String>,
    pub subtotal_cents: i64,
    pub tax_cents: i64,
    pub discount_cents: i64,
    pub total_cents: i64,
    pub payment_method: PaymentMethod,
    pub items: Vec<SaleLine>,
}

impl SaleDraft {
    /// Snapshots a cart into a draft, computing tax and totals.
    pub fn from_cart(
        cart: &Cart,
        user_id: i64,
        tax_rate: TaxRate,
        discount: Money,
        payment_method: PaymentMethod,
        customer_name: Option<String>,
    ) -> Self {
        let subtotal = Money::from_cents(cart.subtotal_cents());
        let tax = subtotal.calculate_tax(tax_rate);
        let total = subtotal + tax - discount;

        SaleDraft {
            user_id,
            customer_name,
            subtotal_cents: subtotal.cents(),
            tax_cents: tax.cents(),
            discount_cents: discount.cents(),
            total_cents: total.cents(),
            payment_method,
            items: cart
                .items
                .iter()
                .map(|i| SaleLine {
                    product_id: i.product_id,
                    quantity: i.quantity,
                    unit_price_cents: i.unit_price_cents,
                    total_price_cents: i.line_total_cents(),
                })
                .collect(),
        }
    }

    /// Checks the sale total invariant.
    #[inline]
    pub fn totals_consistent(&self) -> bool {
        self.total_cents == self.subtotal_cents + self.tax_cents - self.discount_cents
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
