//! # Product Repository (Catalog Store)
//!
//! Database operations for the live product catalog.
//!
//! ## Key Operations
//! - Lookups by UUID and by business code
//! - CRUD for catalog management tooling (the seed binary)
//! - Low-stock reporting against the `min_stock` reorder threshold
//! - Monotonic product-code allocation
//!
//! ## Stock Is Not Mutated Here
//! Stock decrements happen only inside the billing transaction
//! (see [`crate::billing`]), where the conditional update keeps the
//! validate-then-apply sequence atomic. This repository only reads
//! stock and sets it wholesale on catalog edits.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use voltmart_core::validation::{
    validate_discount_bps, validate_price_cents, validate_product_code, validate_product_name,
    validate_stock,
};
use voltmart_core::{CoreError, Product, PRODUCT_CODE_PREFIX};

/// Columns selected for every Product row.
const PRODUCT_COLUMNS: &str = "id, product_code, name, category, price_cents, \
     discount_bps, stock, min_stock, is_active, created_at, updated_at";

/// Repository for product database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = ProductRepository::new(pool);
///
/// // Resolve a billing request line
/// let product = repo.get_by_code("PRD-0042").await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Gets a product by its UUID.
    ///
    /// ## Returns
    /// * `Ok(Some(Product))` - Product found
    /// * `Ok(None)` - Product not found
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Gets a product by its business code (e.g. "PRD-0042").
    ///
    /// This is the lookup the billing engine uses to resolve request
    /// lines; bills reference products by code, never by UUID.
    pub async fn get_by_code(&self, code: &str) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE product_code = ?1"
        ))
        .bind(code)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Lists active products sorted by name.
    pub async fn list_active(&self, limit: u32) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products \
             WHERE is_active = 1 ORDER BY name LIMIT ?1"
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    /// Lists active products at or below their reorder threshold.
    ///
    /// ## Reporting Only
    /// `min_stock` is never enforced as a floor during billing; this
    /// query exists solely for the dashboard's reorder report.
    pub async fn low_stock(&self) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products \
             WHERE is_active = 1 AND stock <= min_stock \
             ORDER BY stock ASC, product_code ASC"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    /// Inserts a new product.
    ///
    /// ## Returns
    /// * `Ok(Product)` - Inserted product
    /// * `Err(DbError::Core(Validation))` - A catalog field failed validation
    /// * `Err(DbError::UniqueViolation)` - Product code already exists
    pub async fn insert(&self, product: &Product) -> DbResult<Product> {
        validate_catalog_fields(product)?;
        debug!(product_code = %product.product_code, "Inserting product");

        sqlx::query(
            "INSERT INTO products (
                id, product_code, name, category,
                price_cents, discount_bps, stock, min_stock,
                is_active, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        )
        .bind(&product.id)
        .bind(&product.product_code)
        .bind(&product.name)
        .bind(&product.category)
        .bind(product.price_cents)
        .bind(product.discount_bps)
        .bind(product.stock)
        .bind(product.min_stock)
        .bind(product.is_active)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(product.clone())
    }

    /// Updates an existing product's catalog fields.
    ///
    /// ## Returns
    /// * `Ok(())` - Update successful
    /// * `Err(DbError::NotFound)` - Product doesn't exist
    pub async fn update(&self, product: &Product) -> DbResult<()> {
        validate_catalog_fields(product)?;
        debug!(id = %product.id, "Updating product");

        let now = Utc::now();

        let result = sqlx::query(
            "UPDATE products SET
                product_code = ?2,
                name = ?3,
                category = ?4,
                price_cents = ?5,
                discount_bps = ?6,
                stock = ?7,
                min_stock = ?8,
                is_active = ?9,
                updated_at = ?10
            WHERE id = ?1",
        )
        .bind(&product.id)
        .bind(&product.product_code)
        .bind(&product.name)
        .bind(&product.category)
        .bind(product.price_cents)
        .bind(product.discount_bps)
        .bind(product.stock)
        .bind(product.min_stock)
        .bind(product.is_active)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", &product.id));
        }

        Ok(())
    }

    /// Counts active products (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE is_active = 1")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    /// Allocates the next product code in sequence: `PRD-0001`, `PRD-0002`, ...
    ///
    /// ## Why Not Random Codes With Retry?
    /// A collision-prone random code with retry-on-duplicate has no
    /// upper bound on attempts. A monotonic counter over the existing
    /// codes cannot collide, and SQLite serializes the insert that
    /// follows, so two concurrent allocations surface as a unique
    /// violation rather than silent corruption.
    pub async fn next_product_code(&self) -> DbResult<String> {
        let prefix = format!("{PRODUCT_CODE_PREFIX}-");
        let max_seq: i64 = sqlx::query_scalar(
            "SELECT COALESCE(MAX(CAST(SUBSTR(product_code, ?1) AS INTEGER)), 0) \
             FROM products WHERE product_code LIKE ?2",
        )
        .bind(prefix.len() as i64 + 1)
        .bind(format!("{prefix}%"))
        .fetch_one(&self.pool)
        .await?;

        Ok(format!("{prefix}{:04}", max_seq + 1))
    }
}

/// Helper to generate a new product ID.
pub fn generate_product_id() -> String {
    Uuid::new_v4().to_string()
}

/// Validates the catalog fields of a product before any write.
///
/// Same rules on insert and update; the schema's CHECK constraints
/// back these up at the storage layer.
fn validate_catalog_fields(product: &Product) -> DbResult<()> {
    validate_product_code(&product.product_code).map_err(CoreError::from)?;
    validate_product_name(&product.name).map_err(CoreError::from)?;
    validate_price_cents(product.price_cents).map_err(CoreError::from)?;
    validate_discount_bps(product.discount_bps).map_err(CoreError::from)?;
    validate_stock(product.stock).map_err(CoreError::from)?;
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    fn sample_product(code: &str, stock: i64, min_stock: i64) -> Product {
        let now = Utc::now();
        Product {
            id: generate_product_id(),
            product_code: code.to_string(),
            name: format!("Product {code}"),
            category: "Accessory".to_string(),
            price_cents: 1999,
            discount_bps: 0,
            stock,
            min_stock,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    #[tokio::test]
    async fn test_insert_and_lookup() {
        let db = test_db().await;
        let repo = db.products();

        let product = sample_product("PRD-0001", 10, 2);
        repo.insert(&product).await.unwrap();

        let by_id = repo.get_by_id(&product.id).await.unwrap().unwrap();
        assert_eq!(by_id.product_code, "PRD-0001");

        let by_code = repo.get_by_code("PRD-0001").await.unwrap().unwrap();
        assert_eq!(by_code.id, product.id);

        assert!(repo.get_by_code("PRD-9999").await.unwrap().is_none());
        assert_eq!(repo.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_code_rejected() {
        let db = test_db().await;
        let repo = db.products();

        repo.insert(&sample_product("PRD-0001", 5, 0)).await.unwrap();
        let err = repo.insert(&sample_product("PRD-0001", 3, 0)).await.unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));
    }

    #[tokio::test]
    async fn test_low_stock_report() {
        let db = test_db().await;
        let repo = db.products();

        repo.insert(&sample_product("PRD-0001", 10, 2)).await.unwrap(); // healthy
        repo.insert(&sample_product("PRD-0002", 2, 2)).await.unwrap(); // at threshold
        repo.insert(&sample_product("PRD-0003", 0, 2)).await.unwrap(); // empty

        let low = repo.low_stock().await.unwrap();
        let codes: Vec<_> = low.iter().map(|p| p.product_code.as_str()).collect();
        assert_eq!(codes, vec!["PRD-0003", "PRD-0002"]);
    }

    #[tokio::test]
    async fn test_next_product_code_is_monotonic() {
        let db = test_db().await;
        let repo = db.products();

        assert_eq!(repo.next_product_code().await.unwrap(), "PRD-0001");

        repo.insert(&sample_product("PRD-0007", 1, 0)).await.unwrap();
        assert_eq!(repo.next_product_code().await.unwrap(), "PRD-0008");

        // Codes outside the prefix scheme don't confuse the allocator
        repo.insert(&sample_product("LEGACY-99", 1, 0)).await.unwrap();
        assert_eq!(repo.next_product_code().await.unwrap(), "PRD-0008");
    }

    #[tokio::test]
    async fn test_insert_rejects_invalid_fields() {
        let db = test_db().await;
        let repo = db.products();

        let bad_code = sample_product("PRD 0001", 5, 0);
        assert!(matches!(
            repo.insert(&bad_code).await.unwrap_err(),
            DbError::Core(CoreError::Validation(_))
        ));

        let mut bad_price = sample_product("PRD-0001", 5, 0);
        bad_price.price_cents = -100;
        assert!(matches!(
            repo.insert(&bad_price).await.unwrap_err(),
            DbError::Core(CoreError::Validation(_))
        ));

        // Nothing reached the table
        assert_eq!(repo.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_update_missing_product() {
        let db = test_db().await;
        let repo = db.products();

        let ghost = sample_product("PRD-0404", 1, 0);
        assert!(matches!(
            repo.update(&ghost).await.unwrap_err(),
            DbError::NotFound { .. }
        ));
    }
}
