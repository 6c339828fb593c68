//! # Product Repository
//!
//! Catalog reads and writes. Every read joins the category name so the
//! presentation layer never does a second lookup per row.
//!
//! ## Lookup Paths
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │  Scanner ──► find_by_barcode("5449000000996")   exact, active   │
//! │  Search  ──► list(Some("cola"), None)           LIKE name/code  │
//! │  Browse  ──► list(None, Some(category_id))      category filter │
//! │  CSV row ──► insert(NewProduct)                 same path as    │
//! │  Manual  ──► insert(NewProduct)                 manual entry    │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `adjust_quantity` applies an unchecked signed delta (restock, manual
//! correction). The non-negative stock invariant for *sales* is enforced
//! by the transaction engine's conditional decrement, not here.

use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::{debug, info};

use atlas_core::validation::{
    validate_barcode, validate_min_quantity, validate_price_cents, validate_product_name,
    validate_search_term,
};
use atlas_core::{NewProduct, Product};

use crate::error::{DbError, DbResult};

/// Shared SELECT head: product columns plus the joined category name.
const PRODUCT_SELECT: &str = r#"
    SELECT p.id, p.name, p.barcode, p.category_id, c.name AS category_name,
           p.price_cents, p.cost_price_cents, p.quantity, p.min_quantity,
           p.description, p.image_path, p.status, p.created_at, p.updated_at
    FROM products p
    LEFT JOIN categories c ON c.id = p.category_id
"#;

/// Repository for catalog operations.
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Finds an active product by exact barcode. The scanner hot path.
    ///
    /// Returns `Ok(None)` for unknown barcodes; the cashier screen shows
    /// a "not found" hint rather than an error.
    pub async fn find_by_barcode(&self, barcode: &str) -> DbResult<Option<Product>> {
        let barcode = barcode.trim();
        debug!(barcode = %barcode, "Barcode lookup");

        let sql = format!("{PRODUCT_SELECT} WHERE p.barcode = ?1 AND p.status = 'active'");

        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(barcode)
            .fetch_optional(&self.pool)
            .await?;

        Ok(product)
    }

    /// Gets an active product by ID.
    pub async fn get_by_id(&self, id: i64) -> DbResult<Product> {
        let sql = format!("{PRODUCT_SELECT} WHERE p.id = ?1 AND p.status = 'active'");

        sqlx::query_as::<_, Product>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("Product", id.to_string()))
    }

    /// Lists active products, optionally filtered by a search term
    /// (substring match on name or barcode) and/or a category.
    ///
    /// Both filters compose with AND; `list(None, None)` returns the
    /// whole active catalog ordered by name.
    pub async fn list(
        &self,
        search_term: Option<&str>,
        category_id: Option<i64>,
    ) -> DbResult<Vec<Product>> {
        let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(PRODUCT_SELECT);
        builder.push(" WHERE p.status = 'active'");

        if let Some(term) = search_term {
            let term = validate_search_term(term)?;
            if !term.is_empty() {
                let pattern = format!("%{}%", term);
                builder.push(" AND (p.name LIKE ");
                builder.push_bind(pattern.clone());
                builder.push(" OR p.barcode LIKE ");
                builder.push_bind(pattern);
                builder.push(")");
            }
        }

        if let Some(cat_id) = category_id {
            builder.push(" AND p.category_id = ");
            builder.push_bind(cat_id);
        }

        builder.push(" ORDER BY p.name");

        let products = builder
            .build_query_as::<Product>()
            .fetch_all(&self.pool)
            .await?;

        debug!(count = products.len(), "Product list");
        Ok(products)
    }

    /// Inserts a product. Manual entry and CSV import both land here, so
    /// every row gets the same validation and the same uniqueness checks.
    pub async fn insert(&self, new_product: &NewProduct) -> DbResult<Product> {
        validate_product_name(&new_product.name)?;
        validate_price_cents(new_product.price_cents)?;
        validate_min_quantity(new_product.min_quantity)?;
        if let Some(barcode) = &new_product.barcode {
            validate_barcode(barcode)?;
        }
        if new_product.quantity < 0 {
            return Err(DbError::Validation(
                atlas_core::ValidationError::MustBePositive {
                    field: "quantity".to_string(),
                },
            ));
        }

        let now = Utc::now();

        let result = sqlx::query(
            r#"
            INSERT INTO products
                (name, barcode, category_id, price_cents, cost_price_cents,
                 quantity, min_quantity, description, image_path, status,
                 created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, 'active', ?10, ?10)
            "#,
        )
        .bind(new_product.name.trim())
        .bind(new_product.barcode.as_deref().map(str::trim))
        .bind(new_product.category_id)
        .bind(new_product.price_cents)
        .bind(new_product.cost_price_cents)
        .bind(new_product.quantity)
        .bind(new_product.min_quantity)
        .bind(&new_product.description)
        .bind(&new_product.image_path)
        .bind(now)
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_rowid();
        info!(product_id = id, name = %new_product.name, "Product created");

        self.get_by_id(id).await
    }

    /// Updates a product's editable fields (everything except identity
    /// and timestamps). `quantity` changes should go through
    /// [`adjust_quantity`](Self::adjust_quantity) instead.
    pub async fn update(&self, product: &Product) -> DbResult<Product> {
        validate_product_name(&product.name)?;
        validate_price_cents(product.price_cents)?;
        validate_min_quantity(product.min_quantity)?;
        if let Some(barcode) = &product.barcode {
            validate_barcode(barcode)?;
        }

        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE products
            SET name = ?1, barcode = ?2, category_id = ?3, price_cents = ?4,
                cost_price_cents = ?5, min_quantity = ?6, description = ?7,
                image_path = ?8, status = ?9, updated_at = ?10
            WHERE id = ?11
            "#,
        )
        .bind(product.name.trim())
        .bind(product.barcode.as_deref().map(str::trim))
        .bind(product.category_id)
        .bind(product.price_cents)
        .bind(product.cost_price_cents)
        .bind(product.min_quantity)
        .bind(&product.description)
        .bind(&product.image_path)
        .bind(product.status)
        .bind(now)
        .bind(product.id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", product.id.to_string()));
        }

        self.get_by_id(product.id).await
    }

    /// Applies a signed stock delta: positive restocks, negative corrects.
    ///
    /// Deliberately unchecked against zero; callers adjusting stock
    /// manually own the non-negative invariant. Sales never use this
    /// path (see the transaction engine's conditional decrement).
    pub async fn adjust_quantity(&self, id: i64, delta: i64) -> DbResult<()> {
        let now = Utc::now();

        let result = sqlx::query(
            "UPDATE products SET quantity = quantity + ?1, updated_at = ?2 WHERE id = ?3",
        )
        .bind(delta)
        .bind(now)
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id.to_string()));
        }

        info!(product_id = id, delta = delta, "Stock adjusted");
        Ok(())
    }

    /// Soft-deletes a product. Past sale items keep their reference; the
    /// product simply stops appearing in lookups and lists.
    pub async fn soft_delete(&self, id: i64) -> DbResult<()> {
        let now = Utc::now();

        let result =
            sqlx::query("UPDATE products SET status = 'inactive', updated_at = ?1 WHERE id = ?2")
                .bind(now)
                .bind(id)
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id.to_string()));
        }

        info!(product_id = id, "Product soft-deleted");
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
