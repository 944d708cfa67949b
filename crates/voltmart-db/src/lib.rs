//! # voltmart-db: Database Layer for VoltMart
//!
//! This crate provides database access for the VoltMart order backend.
//! It uses SQLite for storage with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        VoltMart Data Flow                               │
//! │                                                                         │
//! │  API handler (create_bill, list_orders, ...)                           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   voltmart-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │ Repositories  │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │ product/order │    │  (embedded)  │  │   │
//! │  │   │               │    │ /analytics    │    │              │  │   │
//! │  │   │ SqlitePool    │◄───│ BillingEngine │    │ 001_init.sql │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │                        SQLite Database                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`billing`] - The billing engine (atomic validate-then-apply)
//! - [`repository`] - Repository implementations (product, order, analytics)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use voltmart_db::{BillingEngine, BillRequest, Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("voltmart.db")).await?;
//!
//! let engine = BillingEngine::new(db.pool().clone());
//! let bill = engine
//!     .create_bill(BillRequest {
//!         items: vec![RequestedItem { product_code: "PRD-0001".into(), quantity: 2 }],
//!         customer: None,
//!         payment_method: None,
//!     })
//!     .await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod billing;
pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use billing::{BillRequest, BilledOrder, BillingEngine, RequestedItem};
pub use error::DbError;
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::analytics::{AnalyticsRepository, CategorySales, DailySales, TopProduct};
pub use repository::order::{OrderFilter, OrderRepository, SortDirection, SortKey};
pub use repository::product::ProductRepository;
