//! # Domain Types
//!
//! Core domain types used throughout VoltMart.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │      Order      │   │   OrderItem     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  id (UUID)      │       │
//! │  │  product_code   │   │  order_number   │   │  order_id (FK)  │       │
//! │  │  price_cents    │   │  status         │   │  price snapshot │       │
//! │  │  stock          │   │  total_cents    │   │  quantity       │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │   OrderStatus   │   │ PaymentMethod   │   │ PaymentStatus   │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  Pending        │   │  Cash           │   │  Pending        │       │
//! │  │  Completed      │   │  Card           │   │  Paid           │       │
//! │  │  Cancelled      │   │  MobileWallet   │   │  Refunded       │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! Every entity has:
//! - `id`: UUID v4 - immutable, used for database relations
//! - Business ID: (product_code, order_number) - human-readable, searchable
//!
//! ## Snapshot vs Live State
//! `Product` is the live, mutable source of truth for current price and
//! stock. `OrderItem` freezes the price and discount at time of sale.
//! Reporting over history must use the snapshots, never current prices.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::money::Money;

// =============================================================================
// Product
// =============================================================================

/// A product in the live catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Human-assigned business code (e.g. "PRD-0042"). Unique.
    pub product_code: String,

    /// Display name shown in the storefront and on bills.
    pub name: String,

    /// Catalog category (e.g. "Laptop", "Mobile", "Accessory").
    /// Used by the sales-by-category aggregate.
    pub category: String,

    /// Current list price in cents (smallest currency unit).
    pub price_cents: i64,

    /// Current catalog discount in basis points (1000 = 10%).
    /// Range 0..=10000.
    pub discount_bps: u32,

    /// Sellable units on hand. Never negative.
    pub stock: i64,

    /// Reorder threshold. Used only for low-stock reporting,
    /// never enforced as a hard floor.
    pub min_stock: i64,

    /// Whether product is active (soft delete).
    pub is_active: bool,

    /// When the product was created.
    pub created_at: DateTime<Utc>,

    /// When the product was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Returns the list price as a Money type.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    /// Checks whether the requested quantity can be billed from stock.
    pub fn can_fulfill(&self, quantity: i64) -> bool {
        self.stock >= quantity
    }

    /// Checks whether the product has fallen to its reorder threshold.
    pub fn needs_reorder(&self) -> bool {
        self.stock <= self.min_stock
    }
}

// =============================================================================
// Order Status
// =============================================================================

/// The status of an order.
///
/// ## Transition Table
/// ```text
/// Pending   ──► Completed | Cancelled
/// Completed ──► Cancelled          (refund/void)
/// Cancelled ──► (terminal)
/// ```
/// `Cancelled → Completed` is deliberately forbidden: a cancelled order
/// is dead history, resurrecting it would corrupt analytics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Order recorded but not yet settled.
    Pending,
    /// Order billed and settled.
    Completed,
    /// Order cancelled/refunded. Terminal.
    Cancelled,
}

impl OrderStatus {
    /// Whether a transition from `self` to `next` is legal.
    ///
    /// Self-transitions are not transitions and are rejected; callers
    /// treat them as illegal rather than silently succeeding.
    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        use OrderStatus::*;
        matches!(
            (self, next),
            (Pending, Completed) | (Pending, Cancelled) | (Completed, Cancelled)
        )
    }

    /// Stable lowercase name, matching the database representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(OrderStatus::Pending),
            "completed" => Ok(OrderStatus::Completed),
            "cancelled" => Ok(OrderStatus::Cancelled),
            other => Err(format!("unknown order status: {other}")),
        }
    }
}

// =============================================================================
// Payment Method
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Physical cash payment.
    Cash,
    /// Card payment on an external terminal.
    Card,
    /// Mobile wallet / QR payment.
    MobileWallet,
}

impl Default for PaymentMethod {
    fn default() -> Self {
        PaymentMethod::Cash
    }
}

impl FromStr for PaymentMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cash" => Ok(PaymentMethod::Cash),
            "card" | "credit" | "debit" => Ok(PaymentMethod::Card),
            "mobile_wallet" | "wallet" => Ok(PaymentMethod::MobileWallet),
            other => Err(format!("unknown payment method: {other}")),
        }
    }
}

// =============================================================================
// Payment Status
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    /// Awaiting settlement.
    Pending,
    /// Settled in full. Batch billing implies immediate settlement,
    /// so bills are created directly in this state.
    Paid,
    /// Money returned after cancellation.
    Refunded,
}

// =============================================================================
// Order
// =============================================================================

/// A persisted order. Immutable once created, except for `status`.
///
/// Invariant: `total_cents == subtotal_cents - discount_cents`, where
/// the right-hand side is the sum of the snapshotted line totals. It is
/// computed once by the billing engine and never recomputed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Order {
    pub id: String,
    /// Business identifier in the form `ORD-YYYYMMDD-NNNN`.
    pub order_number: String,
    pub status: OrderStatus,
    pub customer_name: String,
    pub payment_method: PaymentMethod,
    pub payment_status: PaymentStatus,
    /// Sum of undiscounted line amounts.
    pub subtotal_cents: i64,
    /// Sum of per-line discount amounts.
    pub discount_cents: i64,
    /// Amount actually charged: subtotal minus discounts.
    pub total_cents: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Returns the charged total as Money.
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }
}

// =============================================================================
// Order Item
// =============================================================================

/// A line item on an order.
/// Uses the snapshot pattern to freeze product data at time of sale.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct OrderItem {
    pub id: String,
    pub order_id: String,
    pub product_id: String,
    /// Product code at time of sale (frozen).
    pub product_code_snapshot: String,
    /// Product name at time of sale (frozen).
    pub name_snapshot: String,
    /// Unit price in cents at time of sale (frozen).
    pub unit_price_cents: i64,
    /// Discount in basis points at time of sale (frozen).
    pub discount_bps: u32,
    /// Quantity sold. Always positive.
    pub quantity: i64,
    /// Discounted line total: unit_price × quantity − discount.
    pub line_total_cents: i64,
    pub created_at: DateTime<Utc>,
}

impl OrderItem {
    /// Returns the snapshotted unit price as Money.
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }

    /// Returns the discounted line total as Money.
    #[inline]
    pub fn line_total(&self) -> Money {
        Money::from_cents(self.line_total_cents)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_transitions() {
        use OrderStatus::*;

        assert!(Pending.can_transition_to(Completed));
        assert!(Pending.can_transition_to(Cancelled));
        assert!(Completed.can_transition_to(Cancelled));

        // Cancelled is terminal
        assert!(!Cancelled.can_transition_to(Completed));
        assert!(!Cancelled.can_transition_to(Pending));

        // No self-transitions, no reopening
        assert!(!Completed.can_transition_to(Completed));
        assert!(!Completed.can_transition_to(Pending));
        assert!(!Pending.can_transition_to(Pending));
    }

    #[test]
    fn test_status_parse_roundtrip() {
        for status in [
            OrderStatus::Pending,
            OrderStatus::Completed,
            OrderStatus::Cancelled,
        ] {
            assert_eq!(status.as_str().parse::<OrderStatus>().unwrap(), status);
        }
        assert!("shipped".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn test_payment_method_aliases() {
        assert_eq!("cash".parse::<PaymentMethod>().unwrap(), PaymentMethod::Cash);
        assert_eq!("card".parse::<PaymentMethod>().unwrap(), PaymentMethod::Card);
        assert_eq!("credit".parse::<PaymentMethod>().unwrap(), PaymentMethod::Card);
        assert_eq!(
            "wallet".parse::<PaymentMethod>().unwrap(),
            PaymentMethod::MobileWallet
        );
    }

    #[test]
    fn test_payment_method_default_is_cash() {
        assert_eq!(PaymentMethod::default(), PaymentMethod::Cash);
    }

    #[test]
    fn test_product_fulfillment_checks() {
        let product = Product {
            id: "p1".to_string(),
            product_code: "PRD-0001".to_string(),
            name: "USB-C Cable".to_string(),
            category: "Accessory".to_string(),
            price_cents: 1299,
            discount_bps: 0,
            stock: 5,
            min_stock: 2,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        assert!(product.can_fulfill(5));
        assert!(!product.can_fulfill(6));
        assert!(!product.needs_reorder());

        let low = Product { stock: 2, ..product };
        assert!(low.needs_reorder());
    }
}
