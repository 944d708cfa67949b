//! # Analytics Repository
//!
//! Read-only aggregates over the order and catalog stores.
//!
//! ## Ground Rules
//! - Cancelled orders are excluded from every aggregate: a cancelled
//!   sale is not revenue and its quantities are not demand
//! - Money figures come from the persisted order snapshots, never from
//!   live catalog prices, so history is stable under repricing
//! - Days are UTC calendar days, grouped with SQLite's `date()`
//!
//! ## Query Shape
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Analytics Queries                                   │
//! │                                                                         │
//! │  sales_over_range   orders ──────────► GROUP BY date(created_at)       │
//! │  top_products       order_items ─────► GROUP BY code snapshot          │
//! │  sales_by_category  order_items ──┬──► JOIN products (current          │
//! │                                   │    category) GROUP BY category     │
//! │                     (all three skip status = 'cancelled')              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::NaiveDate;
use serde::Serialize;
use sqlx::SqlitePool;

use crate::error::DbResult;

// =============================================================================
// Result Rows
// =============================================================================

/// Revenue and order count for one UTC calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct DailySales {
    pub day: NaiveDate,
    pub total_cents: i64,
    pub order_count: i64,
}

/// A product ranked by units sold.
///
/// Keyed by the code snapshot on the line items, so products later
/// renamed or retired still rank on their historical sales.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct TopProduct {
    pub product_code: String,
    pub name: String,
    pub total_quantity: i64,
    pub total_cents: i64,
}

/// Revenue grouped by the product's *current* catalog category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct CategorySales {
    pub category: String,
    pub total_quantity: i64,
    pub total_cents: i64,
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for analytics queries. Read-only.
#[derive(Debug, Clone)]
pub struct AnalyticsRepository {
    pool: SqlitePool,
}

impl AnalyticsRepository {
    /// Creates a new AnalyticsRepository.
    pub fn new(pool: SqlitePool) -> Self {
        AnalyticsRepository { pool }
    }

    /// Daily sales totals over an inclusive date range.
    ///
    /// Days with no orders produce no row; callers render gaps as zero.
    pub async fn sales_over_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> DbResult<Vec<DailySales>> {
        let rows = sqlx::query_as::<_, DailySales>(
            "SELECT date(created_at) AS day,
                    SUM(total_cents)  AS total_cents,
                    COUNT(*)          AS order_count
             FROM orders
             WHERE status != 'cancelled'
               AND date(created_at) >= ?1
               AND date(created_at) <= ?2
             GROUP BY date(created_at)
             ORDER BY day ASC",
        )
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Best-selling products by units sold, descending.
    ///
    /// Ties on quantity break on product code ascending, so the ranking
    /// is deterministic across runs.
    pub async fn top_products(&self, limit: u32) -> DbResult<Vec<TopProduct>> {
        let rows = sqlx::query_as::<_, TopProduct>(
            "SELECT oi.product_code_snapshot AS product_code,
                    MAX(oi.name_snapshot)    AS name,
                    SUM(oi.quantity)         AS total_quantity,
                    SUM(oi.line_total_cents) AS total_cents
             FROM order_items oi
             JOIN orders o ON o.id = oi.order_id
             WHERE o.status != 'cancelled'
             GROUP BY oi.product_code_snapshot
             ORDER BY total_quantity DESC, product_code ASC
             LIMIT ?1",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Revenue grouped by the products' current categories.
    ///
    /// Items whose product was deleted from the catalog drop out of this
    /// report (the join fails); they still count in the other aggregates.
    pub async fn sales_by_category(&self) -> DbResult<Vec<CategorySales>> {
        let rows = sqlx::query_as::<_, CategorySales>(
            "SELECT p.category               AS category,
                    SUM(oi.quantity)         AS total_quantity,
                    SUM(oi.line_total_cents) AS total_cents
             FROM order_items oi
             JOIN orders o   ON o.id = oi.order_id
             JOIN products p ON p.id = oi.product_id
             WHERE o.status != 'cancelled'
             GROUP BY p.category
             ORDER BY total_cents DESC, category ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
