//! # Order Repository (Order Store)
//!
//! Database operations for orders and their line items.
//!
//! ## Order Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Order Lifecycle                                   │
//! │                                                                         │
//! │  1. CREATE (billing engine, single transaction)                        │
//! │     └── insert_order() + add_item()× → Order { status: Completed }     │
//! │                                                                         │
//! │  2. STATUS TRANSITIONS (operator action)                               │
//! │     └── update_status() → checked against the transition table         │
//! │         Pending ──► Completed | Cancelled                              │
//! │         Completed ──► Cancelled                                        │
//! │         Cancelled ──► (terminal)                                       │
//! │                                                                         │
//! │  3. NEVER DELETED                                                      │
//! │     └── orders are append-only history for analytics                   │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Listing
//! `list()` supports the dashboard's order table: inclusive date range
//! (upper bound normalized to end of day by [`OrderFilter`]), exact
//! status match, case-insensitive substring search over order number and
//! customer, and a whitelisted sort key.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::debug;

use crate::error::DbResult;
use voltmart_core::{CoreError, Order, OrderItem, OrderStatus};

/// Columns selected for every Order row.
const ORDER_COLUMNS: &str = "id, order_number, status, customer_name, payment_method, \
     payment_status, subtotal_cents, discount_cents, total_cents, created_at, updated_at";

// =============================================================================
// List Filter
// =============================================================================

/// Whitelisted sort keys for order listing.
///
/// A closed enum (not a raw string) so user input can never reach the
/// ORDER BY clause directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    #[default]
    CreatedAt,
    Total,
    OrderNumber,
    Status,
}

impl SortKey {
    fn column(&self) -> &'static str {
        match self {
            SortKey::CreatedAt => "created_at",
            SortKey::Total => "total_cents",
            SortKey::OrderNumber => "order_number",
            SortKey::Status => "status",
        }
    }

    /// Parses a user-supplied sort key, falling back to `created_at`.
    pub fn parse(s: &str) -> SortKey {
        match s.trim().to_ascii_lowercase().as_str() {
            "total" | "total_cents" | "totalamount" => SortKey::Total,
            "order_number" | "ordernumber" => SortKey::OrderNumber,
            "status" => SortKey::Status,
            _ => SortKey::CreatedAt,
        }
    }
}

/// Sort direction, defaulting to newest-first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    fn keyword(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }

    /// Parses a user-supplied direction, falling back to descending.
    pub fn parse(s: &str) -> SortDirection {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" | "ascending" => SortDirection::Asc,
            _ => SortDirection::Desc,
        }
    }
}

/// Filter for `OrderRepository::list`.
///
/// All fields optional; the default filter returns every order, newest
/// first.
#[derive(Debug, Clone, Default)]
pub struct OrderFilter {
    /// Inclusive lower bound on `created_at`.
    pub start: Option<DateTime<Utc>>,
    /// Inclusive upper bound on `created_at`.
    pub end: Option<DateTime<Utc>>,
    /// Exact status match.
    pub status: Option<OrderStatus>,
    /// Case-insensitive substring over order number and customer name.
    pub search: Option<String>,
    pub sort_key: SortKey,
    pub direction: SortDirection,
}

impl OrderFilter {
    /// Sets the lower bound to the start of `date` (00:00:00 UTC).
    pub fn start_date(mut self, date: NaiveDate) -> Self {
        self.start = Some(date.and_hms_opt(0, 0, 0).expect("valid midnight").and_utc());
        self
    }

    /// Sets the upper bound to the end of `date` (23:59:59.999 UTC).
    ///
    /// End-of-day normalization makes a `[d1, d2]` query mean "all
    /// orders created on those calendar days, inclusive".
    pub fn end_date(mut self, date: NaiveDate) -> Self {
        self.end = Some(
            date.and_hms_milli_opt(23, 59, 59, 999)
                .expect("valid end of day")
                .and_utc(),
        );
        self
    }

    pub fn status(mut self, status: OrderStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn search(mut self, needle: impl Into<String>) -> Self {
        self.search = Some(needle.into());
        self
    }

    pub fn sort(mut self, key: SortKey, direction: SortDirection) -> Self {
        self.sort_key = key;
        self.direction = direction;
        self
    }
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for order database operations.
#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

impl OrderRepository {
    /// Creates a new OrderRepository.
    pub fn new(pool: SqlitePool) -> Self {
        OrderRepository { pool }
    }

    /// Gets an order by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Order>> {
        let order = sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(order)
    }

    /// Gets an order by its business number (e.g. "ORD-20260830-0001").
    pub async fn get_by_number(&self, order_number: &str) -> DbResult<Option<Order>> {
        let order = sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE order_number = ?1"
        ))
        .bind(order_number)
        .fetch_optional(&self.pool)
        .await?;

        Ok(order)
    }

    /// Gets all items for an order, in insertion order.
    pub async fn get_items(&self, order_id: &str) -> DbResult<Vec<OrderItem>> {
        let items = sqlx::query_as::<_, OrderItem>(
            "SELECT id, order_id, product_id, product_code_snapshot, name_snapshot,
                    unit_price_cents, discount_bps, quantity, line_total_cents, created_at
             FROM order_items
             WHERE order_id = ?1
             ORDER BY rowid",
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Lists orders matching the filter.
    ///
    /// ## Filter Semantics
    /// - Date bounds are inclusive on both ends (the filter constructor
    ///   applies end-of-day normalization to the upper bound)
    /// - `search` matches a lowercased substring of either the order
    ///   number or the customer name
    /// - Sort defaults to `created_at` descending
    pub async fn list(&self, filter: &OrderFilter) -> DbResult<Vec<Order>> {
        let mut qb: QueryBuilder<Sqlite> =
            QueryBuilder::new(format!("SELECT {ORDER_COLUMNS} FROM orders WHERE 1 = 1"));

        if let Some(start) = filter.start {
            qb.push(" AND created_at >= ").push_bind(start);
        }
        if let Some(end) = filter.end {
            qb.push(" AND created_at <= ").push_bind(end);
        }
        if let Some(status) = filter.status {
            qb.push(" AND status = ").push_bind(status.as_str());
        }
        if let Some(ref needle) = filter.search {
            let pattern = format!("%{}%", needle.trim().to_lowercase());
            qb.push(" AND (LOWER(order_number) LIKE ")
                .push_bind(pattern.clone())
                .push(" OR LOWER(customer_name) LIKE ")
                .push_bind(pattern)
                .push(")");
        }

        // Sort key and direction come from closed enums, never from
        // user strings, so pushing them raw is safe.
        qb.push(" ORDER BY ")
            .push(filter.sort_key.column())
            .push(" ")
            .push(filter.direction.keyword());

        let orders = qb.build_query_as::<Order>().fetch_all(&self.pool).await?;

        debug!(count = orders.len(), "Order list query returned");
        Ok(orders)
    }

    /// Transitions an order to a new status.
    ///
    /// ## State Machine
    /// Enforced via [`OrderStatus::can_transition_to`]; the read and the
    /// write happen in one transaction so a concurrent transition cannot
    /// slip between them.
    ///
    /// ## Returns
    /// * `Ok(Order)` - The updated order
    /// * `Err(DbError::Core(OrderNotFound))` - Unknown order id
    /// * `Err(DbError::Core(InvalidStatusTransition))` - Illegal move
    pub async fn update_status(&self, order_id: &str, new_status: OrderStatus) -> DbResult<Order> {
        let mut tx = self.pool.begin().await?;

        let current: Option<OrderStatus> =
            sqlx::query_scalar("SELECT status FROM orders WHERE id = ?1")
                .bind(order_id)
                .fetch_optional(&mut *tx)
                .await?;

        let current = current.ok_or_else(|| CoreError::OrderNotFound(order_id.to_string()))?;

        if !current.can_transition_to(new_status) {
            return Err(CoreError::InvalidStatusTransition {
                from: current,
                to: new_status,
            }
            .into());
        }

        let now = Utc::now();
        sqlx::query("UPDATE orders SET status = ?2, updated_at = ?3 WHERE id = ?1")
            .bind(order_id)
            .bind(new_status.as_str())
            .bind(now)
            .execute(&mut *tx)
            .await?;

        let order = sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE id = ?1"
        ))
        .bind(order_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        debug!(order_id = %order_id, from = %current, to = %new_status, "Order status updated");
        Ok(order)
    }

    /// Counts all orders (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::billing::{BillRequest, BillingEngine, RequestedItem};
    use crate::error::DbError;
    use crate::pool::{Database, DbConfig};
    use crate::repository::product::generate_product_id;
    use voltmart_core::Product;

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    async fn seed_product(db: &Database, code: &str, stock: i64) {
        let now = Utc::now();
        db.products()
            .insert(&Product {
                id: generate_product_id(),
                product_code: code.to_string(),
                name: format!("Product {code}"),
                category: "Accessory".to_string(),
                price_cents: 5000,
                discount_bps: 0,
                stock,
                min_stock: 0,
                is_active: true,
                created_at: now,
                updated_at: now,
            })
            .await
            .unwrap();
    }

    async fn bill_one(db: &Database, code: &str, qty: i64, customer: Option<&str>) -> Order {
        let engine = BillingEngine::new(db.pool().clone());
        engine
            .create_bill(BillRequest {
                items: vec![RequestedItem {
                    product_code: code.to_string(),
                    quantity: qty,
                }],
                customer: customer.map(str::to_string),
                payment_method: None,
            })
            .await
            .unwrap()
            .order
    }

    #[tokio::test]
    async fn test_list_default_sorts_newest_first() {
        let db = test_db().await;
        seed_product(&db, "PRD-0001", 100).await;

        let first = bill_one(&db, "PRD-0001", 1, None).await;
        let second = bill_one(&db, "PRD-0001", 1, None).await;

        let orders = db.orders().list(&OrderFilter::default()).await.unwrap();
        assert_eq!(orders.len(), 2);
        // created_at ties are possible at millisecond resolution; both
        // orders must be present and the list must not error
        let ids: Vec<_> = orders.iter().map(|o| o.id.as_str()).collect();
        assert!(ids.contains(&first.id.as_str()));
        assert!(ids.contains(&second.id.as_str()));
    }

    #[tokio::test]
    async fn test_list_date_range_is_inclusive_of_end_of_day() {
        let db = test_db().await;
        seed_product(&db, "PRD-0001", 100).await;
        let order = bill_one(&db, "PRD-0001", 1, None).await;

        let today = order.created_at.date_naive();

        // Range covering today catches the order even though it was
        // created after midnight
        let filter = OrderFilter::default().start_date(today).end_date(today);
        let orders = db.orders().list(&filter).await.unwrap();
        assert_eq!(orders.len(), 1);

        // Range ending yesterday misses it
        let yesterday = today.pred_opt().unwrap();
        let filter = OrderFilter::default().end_date(yesterday);
        assert!(db.orders().list(&filter).await.unwrap().is_empty());

        // Range starting tomorrow misses it
        let tomorrow = today.succ_opt().unwrap();
        let filter = OrderFilter::default().start_date(tomorrow);
        assert!(db.orders().list(&filter).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_filters_by_status_and_search() {
        let db = test_db().await;
        seed_product(&db, "PRD-0001", 100).await;

        let kept = bill_one(&db, "PRD-0001", 1, Some("Aisha Khan")).await;
        let cancelled = bill_one(&db, "PRD-0001", 1, Some("Bilal Ahmed")).await;
        db.orders()
            .update_status(&cancelled.id, OrderStatus::Cancelled)
            .await
            .unwrap();

        // Status filter
        let filter = OrderFilter::default().status(OrderStatus::Completed);
        let orders = db.orders().list(&filter).await.unwrap();
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].id, kept.id);

        // Case-insensitive customer search
        let filter = OrderFilter::default().search("aisha");
        let orders = db.orders().list(&filter).await.unwrap();
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].customer_name, "Aisha Khan");

        // Search by order number fragment
        let fragment = kept.order_number[4..12].to_lowercase();
        let filter = OrderFilter::default().search(fragment);
        let orders = db.orders().list(&filter).await.unwrap();
        assert!(orders.iter().any(|o| o.id == kept.id));
    }

    #[tokio::test]
    async fn test_list_sort_by_total_ascending() {
        let db = test_db().await;
        seed_product(&db, "PRD-0001", 100).await;

        bill_one(&db, "PRD-0001", 3, None).await; // 15000
        bill_one(&db, "PRD-0001", 1, None).await; // 5000
        bill_one(&db, "PRD-0001", 2, None).await; // 10000

        let filter = OrderFilter::default().sort(SortKey::Total, SortDirection::Asc);
        let orders = db.orders().list(&filter).await.unwrap();
        let totals: Vec<_> = orders.iter().map(|o| o.total_cents).collect();
        assert_eq!(totals, vec![5000, 10000, 15000]);
    }

    #[tokio::test]
    async fn test_update_status_enforces_transition_table() {
        let db = test_db().await;
        seed_product(&db, "PRD-0001", 100).await;
        let order = bill_one(&db, "PRD-0001", 1, None).await;
        assert_eq!(order.status, OrderStatus::Completed);

        // Completed → Cancelled is legal
        let cancelled = db
            .orders()
            .update_status(&order.id, OrderStatus::Cancelled)
            .await
            .unwrap();
        assert_eq!(cancelled.status, OrderStatus::Cancelled);

        // Cancelled → Completed is terminal, rejected
        let err = db
            .orders()
            .update_status(&order.id, OrderStatus::Completed)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DbError::Core(CoreError::InvalidStatusTransition { .. })
        ));

        // Status unchanged after the failed transition
        let reloaded = db.orders().get_by_id(&order.id).await.unwrap().unwrap();
        assert_eq!(reloaded.status, OrderStatus::Cancelled);
    }

    #[tokio::test]
    async fn test_update_status_unknown_order() {
        let db = test_db().await;
        let err = db
            .orders()
            .update_status("no-such-order", OrderStatus::Cancelled)
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Core(CoreError::OrderNotFound(_))));
    }
}
