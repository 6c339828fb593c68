//! # Category Repository
//!
//! Product grouping. Categories are the one entity that IS hard-deleted:
//! member products survive with their `category_id` nulled, so no sale
//! history is lost.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info};

use atlas_core::{Category, CategoryWithCount, NewCategory};

use crate::error::{DbError, DbResult};

/// Repository for category operations.
#[derive(Debug, Clone)]
pub struct CategoryRepository {
    pool: SqlitePool,
}

impl CategoryRepository {
    /// Creates a new CategoryRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CategoryRepository { pool }
    }

    /// Lists all categories with their active-product counts, by name.
    pub async fn list(&self) -> DbResult<Vec<CategoryWithCount>> {
        let rows = sqlx::query_as::<_, CategoryWithCount>(
            r#"
            SELECT c.id, c.name, c.description, c.created_at,
                   COUNT(p.id) AS product_count
            FROM categories c
            LEFT JOIN products p ON p.category_id = c.id AND p.status = 'active'
            GROUP BY c.id
            ORDER BY c.name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        debug!(count = rows.len(), "Category list");
        Ok(rows)
    }

    /// Gets a category by ID.
    pub async fn get_by_id(&self, id: i64) -> DbResult<Category> {
        sqlx::query_as::<_, Category>(
            "SELECT id, name, description, created_at FROM categories WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DbError::not_found("Category", id.to_string()))
    }

    /// Creates a category. Duplicate names surface as [`DbError::Conflict`].
    pub async fn create(&self, new_category: &NewCategory) -> DbResult<Category> {
        let name = new_category.name.trim();
        if name.is_empty() {
            return Err(DbError::Validation(
                atlas_core::ValidationError::Required {
                    field: "name".to_string(),
                },
            ));
        }

        let now = Utc::now();

        let result = sqlx::query(
            "INSERT INTO categories (name, description, created_at) VALUES (?1, ?2, ?3)",
        )
        .bind(name)
        .bind(&new_category.description)
        .bind(now)
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_rowid();
        info!(category_id = id, name = %name, "Category created");

        self.get_by_id(id).await
    }

    /// Renames a category / edits its description.
    pub async fn update(&self, id: i64, name: &str, description: Option<&str>) -> DbResult<Category> {
        let name = name.trim();
        if name.is_empty() {
            return Err(DbError::Validation(
                atlas_core::ValidationError::Required {
                    field: "name".to_string(),
                },
            ));
        }

        let result =
            sqlx::query("UPDATE categories SET name = ?1, description = ?2 WHERE id = ?3")
                .bind(name)
                .bind(description)
                .bind(id)
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Category", id.to_string()));
        }

        self.get_by_id(id).await
    }

    /// Deletes a category, detaching member products first.
    ///
    /// Both steps run in one transaction: either the products are
    /// detached AND the category is gone, or nothing changed.
    pub async fn delete(&self, id: i64) -> DbResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("UPDATE products SET category_id = NULL WHERE category_id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM categories WHERE id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            // Implicit rollback on drop.
            return Err(DbError::not_found("Category", id.to_string()));
        }

        tx.commit().await?;

        info!(category_id = id, "Category deleted, products detached");
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use atlas_core::NewProduct;

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    fn category(name: &str) -> NewCategory {
        NewCategory {
            name: name.to_string(),
            description: None,
        }
    }

    #[tokio::test]
    async fn test_create_list_with_counts() {
        let db = test_db().await;
        let repo = db.categories();

        let beverages = repo.create(&category("Beverages")).await.unwrap();
        repo.create(&category("Bakery")).await.unwrap();

        db.products()
            .insert(&NewProduct {
                name: "Coca-Cola 330ml".to_string(),
                barcode: None,
                category_id: Some(beverages.id),
                price_cents: 999,
                cost_price_cents: None,
                quantity: 10,
                min_quantity: 5,
                description: None,
                image_path: None,
            })
            .await
            .unwrap();

        let list = repo.list().await.unwrap();
        assert_eq!(list.len(), 2);
        // Ordered by name: Bakery, Beverages
        assert_eq!(list[0].category.name, "Bakery");
        assert_eq!(list[0].product_count, 0);
        assert_eq!(list[1].category.name, "Beverages");
        assert_eq!(list[1].product_count, 1);
    }

    #[tokio::test]
    async fn test_duplicate_name_conflict() {
        let db = test_db().await;
        let repo = db.categories();
        repo.create(&category("Beverages")).await.unwrap();

        assert!(matches!(
            repo.create(&category("Beverages")).await,
            Err(DbError::Conflict { .. })
        ));
    }

    #[tokio::test]
    async fn test_delete_detaches_products() {
        let db = test_db().await;
        let repo = db.categories();
        let cat = repo.create(&category("Beverages")).await.unwrap();

        let product = db
            .products()
            .insert(&NewProduct {
                name: "Coca-Cola 330ml".to_string(),
                barcode: None,
                category_id: Some(cat.id),
                price_cents: 999,
                cost_price_cents: None,
                quantity: 10,
                min_quantity: 5,
                description: None,
                image_path: None,
            })
            .await
            .unwrap();

        repo.delete(cat.id).await.unwrap();

        // Product survives, detached.
        let survivor = db.products().get_by_id(product.id).await.unwrap();
        assert_eq!(survivor.category_id, None);
        assert_eq!(survivor.category_name, None);

        assert!(matches!(
            repo.get_by_id(cat.id).await,
            Err(DbError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_delete_missing_category() {
        let db = test_db().await;
        assert!(matches!(
            db.categories().delete(9999).await,
            Err(DbError::NotFound { .. })
        ));
    }
}
