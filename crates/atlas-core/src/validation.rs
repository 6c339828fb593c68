//! # Validation Module
//!
//! Input validation for Atlas POS. Runs before any write so that a
//! malformed request is never partially applied.
//!
//! ## Validation Layers
//! ```text
//! Layer 1: Presentation      basic format checks, immediate feedback
//! Layer 2: THIS MODULE       business rule validation, typed errors
//! Layer 3: SQLite            NOT NULL / UNIQUE / FK constraints
//! ```
//!
//! The transaction engine calls [`validate_sale_draft`] defensively even
//! though well-behaved callers validate first: the authoritative stock
//! check still happens inside the atomic write.

use crate::cart::SaleDraft;
use crate::error::ValidationError;
use crate::MAX_ITEM_QUANTITY;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a product name: non-empty, at most 200 characters.
pub fn validate_product_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }

    if name.len() > 200 {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: 200,
        });
    }

    Ok(())
}

/// Validates a username: non-empty, at most 50 characters, no spaces.
pub fn validate_username(username: &str) -> ValidationResult<()> {
    let username = username.trim();

    if username.is_empty() {
        return Err(ValidationError::Required {
            field: "username".to_string(),
        });
    }

    if username.len() > 50 {
        return Err(ValidationError::TooLong {
            field: "username".to_string(),
            max: 50,
        });
    }

    if username.chars().any(char::is_whitespace) {
        return Err(ValidationError::InvalidFormat {
            field: "username".to_string(),
            reason: "must not contain whitespace".to_string(),
        });
    }

    Ok(())
}

/// Validates a barcode when present: non-empty, at most 64 characters.
pub fn validate_barcode(barcode: &str) -> ValidationResult<()> {
    let barcode = barcode.trim();

    if barcode.is_empty() {
        return Err(ValidationError::Required {
            field: "barcode".to_string(),
        });
    }

    if barcode.len() > 64 {
        return Err(ValidationError::TooLong {
            field: "barcode".to_string(),
            max: 64,
        });
    }

    Ok(())
}

/// Validates a search term. Empty is fine (returns all products);
/// the cap keeps LIKE patterns bounded.
pub fn validate_search_term(term: &str) -> ValidationResult<String> {
    let term = term.trim();

    if term.len() > 100 {
        return Err(ValidationError::TooLong {
            field: "search term".to_string(),
            max: 100,
        });
    }

    Ok(term.to_string())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a line quantity: positive, at most [`MAX_ITEM_QUANTITY`].
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a sale price in cents: strictly positive.
pub fn validate_price_cents(cents: i64) -> ValidationResult<()> {
    if cents <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "price".to_string(),
        });
    }

    Ok(())
}

/// Validates a reorder threshold: non-negative.
pub fn validate_min_quantity(min_quantity: i64) -> ValidationResult<()> {
    if min_quantity < 0 {
        return Err(ValidationError::OutOfRange {
            field: "min_quantity".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

// =============================================================================
// Sale Draft Validation
// =============================================================================

/// Validates a checkout draft before it reaches the transaction engine.
///
/// Checks: non-empty cart, positive line quantities, positive line
/// prices, and the sale total invariant. Stock availability is NOT
/// checked here - only the atomic write can check it authoritatively.
///
/// Line prices are frozen from products, which themselves must carry a
/// positive price, so a zero here is a constructed draft gone wrong;
/// free items are expressed through the discount, not a zero price.
pub fn validate_sale_draft(draft: &SaleDraft) -> ValidationResult<()> {
    if draft.items.is_empty() {
        return Err(ValidationError::EmptyCart);
    }

    for item in &draft.items {
        validate_quantity(item.quantity)?;

        if item.unit_price_cents <= 0 {
            return Err(ValidationError::MustBePositive {
                field: "unit_price".to_string(),
            });
        }
    }

    if !draft.totals_consistent() {
        return Err(ValidationError::InconsistentTotals {
            subtotal: draft.subtotal_cents,
            tax: draft.tax_cents,
            discount: draft.discount_cents,
            total: draft.total_cents,
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cart::SaleLine;
    use crate::types::PaymentMethod;

    fn draft_with(items: Vec<SaleLine>, subtotal: i64, total: i64) -> SaleDraft {
        SaleDraft {
            user_id: 1,
            customer_name: None,
            subtotal_cents: subtotal,
            tax_cents: 0,
            discount_cents: 0,
            total_cents: total,
            payment_method: PaymentMethod::Cash,
            items,
        }
    }

    #[test]
    fn test_validate_product_name() {
        assert!(validate_product_name("Coca-Cola 330ml").is_ok());
        assert!(validate_product_name("").is_err());
        assert!(validate_product_name("   ").is_err());
        assert!(validate_product_name(&"A".repeat(300)).is_err());
    }

    #[test]
    fn test_validate_username() {
        assert!(validate_username("cashier1").is_ok());
        assert!(validate_username("").is_err());
        assert!(validate_username("has space").is_err());
        assert!(validate_username(&"a".repeat(60)).is_err());
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(999).is_ok());
        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-1).is_err());
        assert!(validate_quantity(1000).is_err());
    }

    #[test]
    fn test_validate_price_cents() {
        assert!(validate_price_cents(1099).is_ok());
        assert!(validate_price_cents(0).is_err());
        assert!(validate_price_cents(-100).is_err());
    }

    #[test]
    fn test_validate_search_term_trims() {
        assert_eq!(validate_search_term("  cola ").unwrap(), "cola");
        assert!(validate_search_term(&"x".repeat(200)).is_err());
    }

    #[test]
    fn test_empty_draft_rejected() {
        let draft = draft_with(vec![], 0, 0);
        assert!(matches!(
            validate_sale_draft(&draft),
            Err(ValidationError::EmptyCart)
        ));
    }

    #[test]
    fn test_inconsistent_totals_rejected() {
        let line = SaleLine {
            product_id: 1,
            quantity: 1,
            unit_price_cents: 1000,
            total_price_cents: 1000,
        };
        let draft = draft_with(vec![line], 1000, 999);
        assert!(matches!(
            validate_sale_draft(&draft),
            Err(ValidationError::InconsistentTotals { .. })
        ));
    }

    #[test]
    fn test_zero_unit_price_rejected() {
        let line = SaleLine {
            product_id: 1,
            quantity: 1,
            unit_price_cents: 0,
            total_price_cents: 0,
        };
        let draft = draft_with(vec![line], 0, 0);
        assert!(matches!(
            validate_sale_draft(&draft),
            Err(ValidationError::MustBePositive { .. })
        ));
    }

    #[test]
    fn test_valid_draft_accepted() {
        let line = SaleLine {
            product_id: 1,
            quantity: 2,
            unit_price_cents: 1000,
            total_price_cents: 2000,
        };
        let draft = draft_with(vec![line], 2000, 2000);
        assert!(validate_sale_draft(&draft).is_ok());
    }
}
