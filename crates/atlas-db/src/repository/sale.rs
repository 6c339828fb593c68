//! # Sale Repository - The Transaction Engine
//!
//! The one place where money and stock change together.
//!
//! ## Atomic Checkout
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │  create_sale(draft)                                              │
//! │       │                                                          │
//! │       ▼                                                          │
//! │  validate draft ──► BEGIN                                        │
//! │       │                                                          │
//! │       ▼                                                          │
//! │  INSERT sale header (unique sale_number)                         │
//! │       │                                                          │
//! │       ▼          for each line:                                  │
//! │  INSERT sale_item                                                │
//! │  UPDATE products SET quantity = quantity - n                     │
//! │        WHERE id = ? AND status = 'active' AND quantity >= n      │
//! │       │                                                          │
//! │       ├── 0 rows ──► InsufficientStock / NotFound ──► ROLLBACK   │
//! │       ▼                                                          │
//! │  COMMIT ──► CreatedSale { id, sale_number }                      │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The `quantity >= n` guard in the UPDATE itself is the authoritative
//! oversell check: two terminals selling the last unit race on the row
//! lock, and exactly one of them decrements. Any failure after BEGIN
//! rolls the whole sale back; stock is never partially decremented.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info, warn};
use uuid::Uuid;

use atlas_core::validation::validate_sale_draft;
use atlas_core::{Sale, SaleDraft, SaleItem};

use crate::error::{DbError, DbResult};

/// The identifiers handed back from a committed sale, for the receipt.
#[derive(Debug, Clone)]
pub struct CreatedSale {
    pub id: i64,
    pub sale_number: String,
}

/// Repository for sale persistence.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    /// Creates a new SaleRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    /// Persists a complete sale atomically: header, items, and stock
    /// decrements all commit together or not at all.
    ///
    /// Writes no activity entry of its own: the checkout caller records
    /// the audit trail (via the best-effort path) after this returns.
    ///
    /// ## Errors
    /// - [`DbError::Validation`] - empty cart, bad quantities, total
    ///   invariant broken; nothing was written
    /// - [`DbError::InsufficientStock`] - a line asked for more than the
    ///   available quantity at write time; rolled back
    /// - [`DbError::NotFound`] - a product vanished or went inactive
    ///   between cart and checkout; rolled back
    /// - [`DbError::Conflict`] - sale number collision (vanishingly rare);
    ///   the caller may simply retry the checkout
    pub async fn create_sale(&self, draft: &SaleDraft) -> DbResult<CreatedSale> {
        validate_sale_draft(draft)?;

        let sale_number = generate_sale_number();
        let now = Utc::now();

        debug!(
            sale_number = %sale_number,
            lines = draft.items.len(),
            total_cents = draft.total_cents,
            "Beginning sale transaction"
        );

        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            INSERT INTO sales
                (sale_number, user_id, customer_name, subtotal_cents, tax_cents,
                 discount_cents, total_cents, payment_method, payment_status, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, 'completed', ?9)
            "#,
        )
        .bind(&sale_number)
        .bind(draft.user_id)
        .bind(&draft.customer_name)
        .bind(draft.subtotal_cents)
        .bind(draft.tax_cents)
        .bind(draft.discount_cents)
        .bind(draft.total_cents)
        .bind(draft.payment_method)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        let sale_id = result.last_insert_rowid();

        for line in &draft.items {
            // The sale_id FK is known good (just inserted), so an FK
            // failure here can only mean the product row is gone.
            let item_result = sqlx::query(
                r#"
                INSERT INTO sale_items
                    (sale_id, product_id, quantity, unit_price_cents, total_price_cents)
                VALUES (?1, ?2, ?3, ?4, ?5)
                "#,
            )
            .bind(sale_id)
            .bind(line.product_id)
            .bind(line.quantity)
            .bind(line.unit_price_cents)
            .bind(line.total_price_cents)
            .execute(&mut *tx)
            .await;

            match item_result {
                Ok(_) => {}
                Err(e) => {
                    let mapped = DbError::from(e);
                    return Err(match mapped {
                        DbError::ForeignKeyViolation { .. } => {
                            DbError::not_found("Product", line.product_id.to_string())
                        }
                        other => other,
                    });
                }
            }

            // Conditional decrement: the WHERE clause IS the stock check.
            let decrement = sqlx::query(
                r#"
                UPDATE products
                SET quantity = quantity - ?1, updated_at = ?2
                WHERE id = ?3 AND status = 'active' AND quantity >= ?1
                "#,
            )
            .bind(line.quantity)
            .bind(now)
            .bind(line.product_id)
            .execute(&mut *tx)
            .await?;

            if decrement.rows_affected() == 0 {
                // Diagnose before the implicit rollback on drop.
                let available: Option<i64> = sqlx::query_scalar(
                    "SELECT quantity FROM products WHERE id = ?1 AND status = 'active'",
                )
                .bind(line.product_id)
                .fetch_optional(&mut *tx)
                .await?;

                return Err(match available {
                    Some(available) => {
                        warn!(
                            product_id = line.product_id,
                            available,
                            requested = line.quantity,
                            "Sale rejected: insufficient stock"
                        );
                        DbError::InsufficientStock {
                            product_id: line.product_id,
                            available,
                            requested: line.quantity,
                        }
                    }
                    None => DbError::not_found("Product", line.product_id.to_string()),
                });
            }
        }

        tx.commit().await?;

        info!(
            sale_id,
            sale_number = %sale_number,
            total_cents = draft.total_cents,
            "Sale committed"
        );

        Ok(CreatedSale {
            id: sale_id,
            sale_number,
        })
    }

    /// Gets a sale header by ID.
    pub async fn get_by_id(&self, id: i64) -> DbResult<Sale> {
        sqlx::query_as::<_, Sale>("SELECT * FROM sales WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("Sale", id.to_string()))
    }

    /// Gets a sale header by its human-readable number.
    pub async fn get_by_number(&self, sale_number: &str) -> DbResult<Sale> {
        sqlx::query_as::<_, Sale>("SELECT * FROM sales WHERE sale_number = ?1")
            .bind(sale_number)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("Sale", sale_number))
    }

    /// Gets the line items of a sale, in insertion order.
    pub async fn get_items(&self, sale_id: i64) -> DbResult<Vec<SaleItem>> {
        let items = sqlx::query_as::<_, SaleItem>(
            "SELECT * FROM sale_items WHERE sale_id = ?1 ORDER BY id",
        )
        .bind(sale_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }
}

/// Generates a unique, human-readable sale number.
///
/// Format: `SALE-YYYYMMDD-XXXXXXXX` where the suffix is the first eight
/// hex digits of a v4 UUID. The date prefix keeps receipts sortable by
/// eye; uniqueness is still enforced by the column constraint.
fn generate_sale_number() -> String {
    let date = Utc::now().format("%Y%m%d");
    let suffix = Uuid::new_v4().simple().to_string()[..8].to_uppercase();
    format!("SALE-{}-{}", date, suffix)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use atlas_core::{
        Cart, Money, NewProduct, NewUser, PaymentMethod, Product, Role, SaleLine, TaxRate,
    };

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    async fn seed_cashier(db: &Database) -> i64 {
        db.users()
            .create(&NewUser {
                username: "cashier1".to_string(),
                password: "secret123".to_string(),
                role: Role::Cashier,
                full_name: "Test Cashier".to_string(),
                email: None,
            })
            .await
            .unwrap()
            .id
    }

    async fn seed_product(db: &Database, name: &str, price_cents: i64, quantity: i64) -> Product {
        db.products()
            .insert(&NewProduct {
                name: name.to_string(),
                barcode: None,
                category_id: None,
                price_cents,
                cost_price_cents: None,
                quantity,
                min_quantity: 5,
                description: None,
                image_path: None,
            })
            .await
            .unwrap()
    }

    fn draft_for(user_id: i64, product: &Product, quantity: i64) -> SaleDraft {
        let mut cart = Cart::new();
        cart.add_item(product, quantity).unwrap();
        SaleDraft::from_cart(
            &cart,
            user_id,
            TaxRate::zero(),
            Money::zero(),
            PaymentMethod::Cash,
            None,
        )
    }

    #[tokio::test]
    async fn test_successful_sale_decrements_stock() {
        let db = test_db().await;
        let user_id = seed_cashier(&db).await;
        let product = seed_product(&db, "Coca-Cola 330ml", 1000, 100).await;

        let created = db
            .sales()
            .create_sale(&draft_for(user_id, &product, 2))
            .await
            .unwrap();

        let sale = db.sales().get_by_id(created.id).await.unwrap();
        assert_eq!(sale.total_cents, 2000);
        assert!(sale.totals_consistent());
        assert!(sale.sale_number.starts_with("SALE-"));

        let items = db.sales().get_items(created.id).await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].quantity, 2);
        assert_eq!(items[0].unit_price_cents, 1000);

        let after = db.products().get_by_id(product.id).await.unwrap();
        assert_eq!(after.quantity, 98);
    }

    #[tokio::test]
    async fn test_oversell_rolls_back_everything() {
        let db = test_db().await;
        let user_id = seed_cashier(&db).await;
        let cheap = seed_product(&db, "Bread", 300, 50).await;
        let scarce = seed_product(&db, "Last Bottle", 1500, 3).await;

        let mut cart = Cart::new();
        cart.add_item(&cheap, 2).unwrap();
        cart.add_item(&scarce, 5).unwrap(); // only 3 in stock
        let draft = SaleDraft::from_cart(
            &cart,
            user_id,
            TaxRate::zero(),
            Money::zero(),
            PaymentMethod::Cash,
            None,
        );

        let result = db.sales().create_sale(&draft).await;
        match result {
            Err(DbError::InsufficientStock {
                product_id,
                available,
                requested,
            }) => {
                assert_eq!(product_id, scarce.id);
                assert_eq!(available, 3);
                assert_eq!(requested, 5);
            }
            other => panic!("expected InsufficientStock, got {:?}", other),
        }

        // Nothing committed: both quantities untouched, no sale rows.
        assert_eq!(db.products().get_by_id(cheap.id).await.unwrap().quantity, 50);
        assert_eq!(db.products().get_by_id(scarce.id).await.unwrap().quantity, 3);

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sales")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(count, 0);
        let item_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sale_items")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(item_count, 0);
    }

    #[tokio::test]
    async fn test_exact_stock_sale_reaches_zero() {
        let db = test_db().await;
        let user_id = seed_cashier(&db).await;
        let product = seed_product(&db, "Last Units", 500, 3).await;

        db.sales()
            .create_sale(&draft_for(user_id, &product, 3))
            .await
            .unwrap();

        let after = db.products().get_by_id(product.id).await.unwrap();
        assert_eq!(after.quantity, 0);

        // The next attempt fails cleanly.
        let result = db.sales().create_sale(&draft_for(user_id, &product, 1)).await;
        assert!(matches!(result, Err(DbError::InsufficientStock { .. })));
    }

    #[tokio::test]
    async fn test_engine_leaves_audit_to_caller() {
        let db = test_db().await;
        let user_id = seed_cashier(&db).await;
        let product = seed_product(&db, "Widget", 1000, 10).await;

        db.sales()
            .create_sale(&draft_for(user_id, &product, 1))
            .await
            .unwrap();

        // The engine records nothing; the checkout caller owns the
        // audit entry.
        let entries = db.activity().recent(10).await.unwrap();
        assert!(entries.is_empty(), "unexpected entries: {:?}", entries);

        // The caller-side path still works after the commit.
        db.activity()
            .record_best_effort(user_id, "sale_completed", None, None)
            .await;
        assert_eq!(db.activity().recent(10).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_product_mid_sale_rolls_back() {
        let db = test_db().await;
        let user_id = seed_cashier(&db).await;
        let real_a = seed_product(&db, "Real A", 500, 10).await;
        let real_b = seed_product(&db, "Real B", 700, 10).await;

        // Second of three lines references a product that does not exist.
        let draft = SaleDraft {
            user_id,
            customer_name: None,
            subtotal_cents: 500 + 1234 + 700,
            tax_cents: 0,
            discount_cents: 0,
            total_cents: 500 + 1234 + 700,
            payment_method: PaymentMethod::Cash,
            items: vec![
                SaleLine {
                    product_id: real_a.id,
                    quantity: 1,
                    unit_price_cents: 500,
                    total_price_cents: 500,
                },
                SaleLine {
                    product_id: 9999,
                    quantity: 1,
                    unit_price_cents: 1234,
                    total_price_cents: 1234,
                },
                SaleLine {
                    product_id: real_b.id,
                    quantity: 1,
                    unit_price_cents: 700,
                    total_price_cents: 700,
                },
            ],
        };

        let result = db.sales().create_sale(&draft).await;
        assert!(matches!(result, Err(DbError::NotFound { .. })));

        // The first line's decrement was rolled back with everything else.
        assert_eq!(db.products().get_by_id(real_a.id).await.unwrap().quantity, 10);
        assert_eq!(db.products().get_by_id(real_b.id).await.unwrap().quantity, 10);
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sales")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn test_sales_survive_cashier_deactivation() {
        let db = test_db().await;
        let user_id = seed_cashier(&db).await;
        let product = seed_product(&db, "Widget", 1000, 10).await;

        let created = db
            .sales()
            .create_sale(&draft_for(user_id, &product, 2))
            .await
            .unwrap();

        db.users().deactivate(user_id).await.unwrap();

        // The sale row is untouched and still joins its cashier.
        let sale = db.sales().get_by_id(created.id).await.unwrap();
        assert_eq!(sale.user_id, user_id);
        assert_eq!(sale.total_cents, 2000);

        let today = chrono::Utc::now().date_naive();
        let report = db.reports().sales_report(today, today).await.unwrap();
        assert_eq!(report.len(), 1);
        assert_eq!(report[0].cashier_name, "Test Cashier");

        // But the account no longer appears in the user listing.
        assert!(db.users().list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_inactive_product_cannot_be_sold() {
        let db = test_db().await;
        let user_id = seed_cashier(&db).await;
        let product = seed_product(&db, "Discontinued", 500, 10).await;

        db.products().soft_delete(product.id).await.unwrap();

        let result = db.sales().create_sale(&draft_for(user_id, &product, 1)).await;
        assert!(matches!(result, Err(DbError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_empty_draft_rejected_before_write() {
        let db = test_db().await;
        let user_id = seed_cashier(&db).await;

        let draft = SaleDraft {
            user_id,
            customer_name: None,
            subtotal_cents: 0,
            tax_cents: 0,
            discount_cents: 0,
            total_cents: 0,
            payment_method: PaymentMethod::Cash,
            items: vec![],
        };

        assert!(matches!(
            db.sales().create_sale(&draft).await,
            Err(DbError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_inconsistent_totals_rejected() {
        let db = test_db().await;
        let user_id = seed_cashier(&db).await;
        let product = seed_product(&db, "Widget", 1000, 10).await;

        let draft = SaleDraft {
            user_id,
            customer_name: None,
            subtotal_cents: 1000,
            tax_cents: 0,
            discount_cents: 0,
            total_cents: 900, // broken invariant
            payment_method: PaymentMethod::Cash,
            items: vec![SaleLine {
                product_id: product.id,
                quantity: 1,
                unit_price_cents: 1000,
                total_price_cents: 1000,
            }],
        };

        assert!(matches!(
            db.sales().create_sale(&draft).await,
            Err(DbError::Validation(_))
        ));
        assert_eq!(db.products().get_by_id(product.id).await.unwrap().quantity, 10);
    }

    #[tokio::test]
    async fn test_sale_with_tax_and_discount() {
        let db = test_db().await;
        let user_id = seed_cashier(&db).await;
        let product = seed_product(&db, "Widget", 1000, 10).await;

        let mut cart = Cart::new();
        cart.add_item(&product, 2).unwrap(); // 20.00
        let draft = SaleDraft::from_cart(
            &cart,
            user_id,
            TaxRate::from_bps(825),
            Money::from_cents(100),
            PaymentMethod::Card,
            Some("Walk-in".to_string()),
        );

        let created = db.sales().create_sale(&draft).await.unwrap();
        let sale = db.sales().get_by_id(created.id).await.unwrap();

        assert_eq!(sale.subtotal_cents, 2000);
        assert_eq!(sale.tax_cents, 165);
        assert_eq!(sale.discount_cents, 100);
        assert_eq!(sale.total_cents, 2065);
        assert_eq!(sale.payment_method, PaymentMethod::Card);
        assert_eq!(sale.customer_name.as_deref(), Some("Walk-in"));
    }

    #[test]
    fn test_sale_number_format() {
        let number = generate_sale_number();
        let parts: Vec<&str> = number.split('-').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "SALE");
        assert_eq!(parts[1].len(), 8);
        assert!(parts[1].chars().all(|c| c.is_ascii_digit()));
        assert_eq!(parts[2].len(), 8);
        assert!(parts[2].chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_sale_numbers_unique() {
        let a = generate_sale_number();
        let b = generate_sale_number();
        assert_ne!(a, b);
    }
}
