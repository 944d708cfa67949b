//! # voltmart-core: Pure Business Logic for VoltMart
//!
//! This crate is the **heart** of the VoltMart order backend. It contains
//! all business logic as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        VoltMart Architecture                            │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Clients (storefront / dashboard)             │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ REST (axum)                            │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    apps/api handlers                            │   │
//! │  │    create_bill, list_orders, update_status, analytics           │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              ★ voltmart-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │  billing  │  │ validation│  │   │
//! │  │   │  Product  │  │   Money   │  │ PricedBill│  │   rules   │  │   │
//! │  │   │   Order   │  │ Discounts │  │  pricing  │  │  checks   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    voltmart-db (Database Layer)                 │   │
//! │  │         SQLite stores, billing transaction, analytics           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Order, OrderItem, etc.)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`billing`] - Pure bill pricing (snapshots + totals)
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic - same input = same output
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **Integer Money**: All monetary values are in cents (i64) to avoid float errors
//! 4. **Explicit Errors**: All errors are typed, never strings or panics
//!
//! ## Example Usage
//!
//! ```rust
//! use voltmart_core::money::Money;
//!
//! // Create money from cents (never from floats!)
//! let price = Money::from_cents(10000); // $100.00
//!
//! // Apply a 10% catalog discount (1000 basis points)
//! let discounted = price.apply_percentage_discount(1000);
//! assert_eq!(discounted.cents(), 9000);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod billing;
pub mod error;
pub mod money;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use voltmart_core::Money` instead of
// `use voltmart_core::money::Money`

pub use billing::{price_bill, PricedBill, PricedLine};
pub use error::{CoreError, ValidationError};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Customer name recorded on a bill when the caller supplies none.
///
/// ## Why a constant?
/// Walk-in retail sales rarely capture an identity; billing defaults to
/// this label so every order row has a searchable customer field.
pub const DEFAULT_CUSTOMER: &str = "Walk-in Customer";

/// Maximum line items allowed in a single bill
///
/// ## Business Reason
/// Prevents runaway bills and ensures reasonable transaction sizes.
/// Can be made configurable per-tenant in future versions.
pub const MAX_BILL_LINES: usize = 100;

/// Maximum quantity of a single item on a bill
///
/// ## Business Reason
/// Prevents accidental over-ordering (e.g., typing 1000 instead of 10)
/// Configurable per-tenant in future versions.
pub const MAX_LINE_QUANTITY: i64 = 999;

/// Prefix for human-assigned product codes (e.g. `PRD-0042`).
pub const PRODUCT_CODE_PREFIX: &str = "PRD";
