//! # Repository Implementations
//!
//! Each repository owns the SQL for one store:
//!
//! - [`product`] - Catalog Store (live price/discount/stock)
//! - [`order`] - Order Store (append-only history, status transitions)
//! - [`analytics`] - Read-only aggregates over both stores

pub mod analytics;
pub mod order;
pub mod product;
