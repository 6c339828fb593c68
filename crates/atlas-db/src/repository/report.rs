//! # Reporting
//!
//! Read-only aggregation over committed sales and current stock. Nothing
//! here ever writes; reports are recomputed from the source tables on
//! demand rather than maintained as running totals.
//!
//! Date ranges are inclusive calendar days in UTC: `sales_report(d, d)`
//! is "everything sold on day d".

use chrono::{Duration, NaiveDate, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use atlas_core::{Product, SaleWithCashier};

use crate::error::DbResult;

/// Aggregate figures over a set of sales.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SalesSummary {
    pub revenue_cents: i64,
    pub transaction_count: usize,
    /// Integer division; zero when there are no transactions.
    pub average_sale_cents: i64,
}

/// Read-only reporting queries.
#[derive(Debug, Clone)]
pub struct ReportRepository {
    pool: SqlitePool,
}

impl ReportRepository {
    /// Creates a new ReportRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ReportRepository { pool }
    }

    /// Sales within an inclusive calendar-day range, newest first, each
    /// joined with the cashier's display name.
    pub async fn sales_report(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> DbResult<Vec<SaleWithCashier>> {
        debug!(%start, %end, "Sales report");

        let rows = sqlx::query_as::<_, SaleWithCashier>(
            r#"
            SELECT s.*, u.full_name AS cashier_name
            FROM sales s
            JOIN users u ON u.id = s.user_id
            WHERE DATE(s.created_at) BETWEEN DATE(?1) AND DATE(?2)
            ORDER BY s.created_at DESC
            "#,
        )
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Today's sales (UTC).
    pub async fn today(&self) -> DbResult<Vec<SaleWithCashier>> {
        let today = Utc::now().date_naive();
        self.sales_report(today, today).await
    }

    /// The last 7 calendar days including today.
    pub async fn last_7_days(&self) -> DbResult<Vec<SaleWithCashier>> {
        let today = Utc::now().date_naive();
        self.sales_report(today - Duration::days(6), today).await
    }

    /// The last 30 calendar days including today.
    pub async fn last_30_days(&self) -> DbResult<Vec<SaleWithCashier>> {
        let today = Utc::now().date_naive();
        self.sales_report(today - Duration::days(29), today).await
    }

    /// Active products at or below their reorder threshold but not empty.
    pub async fn low_stock_products(&self) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(
            r#"
            SELECT p.id, p.name, p.barcode, p.category_id, c.name AS category_name,
                   p.price_cents, p.cost_price_cents, p.quantity, p.min_quantity,
                   p.description, p.image_path, p.status, p.created_at, p.updated_at
            FROM products p
            LEFT JOIN categories c ON c.id = p.category_id
            WHERE p.status = 'active' AND p.quantity > 0 AND p.quantity <= p.min_quantity
            ORDER BY p.quantity ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    /// Active products with zero stock.
    pub async fn out_of_stock_products(&self) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(
            r#"
            SELECT p.id, p.name, p.barcode, p.category_id, c.name AS category_name,
                   p.price_cents, p.cost_price_cents, p.quantity, p.min_quantity,
                   p.description, p.image_path, p.status, p.created_at, p.updated_at
            FROM products p
            LEFT JOIN categories c ON c.id = p.category_id
            WHERE p.status = 'active' AND p.quantity = 0
            ORDER BY p.name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }
}

/// Summarizes a report result. Pure function so the same figures can be
/// computed over any slice (a day, a filtered subset, a whole month).
pub fn summarize(sales: &[SaleWithCashier]) -> SalesSummary {
    let revenue_cents: i64 = sales.iter().map(|s| s.sale.total_cents).sum();
    let transaction_count = sales.len();
    let average_sale_cents = if transaction_count == 0 {
        0
    } else {
        revenue_cents / transaction_count as i64
    };

    SalesSummary {
        revenue_cents,
        transaction_count,
        average_sale_cents,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
