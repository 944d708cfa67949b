//! # Bill Pricing
//!
//! Pure pricing math for the billing engine: given resolved products and
//! requested quantities, produce snapshotted line items and totals.
//!
//! ## Where This Sits
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Billing Flow                                       │
//! │                                                                         │
//! │  POST /orders/bill                                                     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  voltmart-db::BillingEngine (transaction)                              │
//! │       │  resolve product codes ──► ProductNotFound aborts whole batch  │
//! │       ▼                                                                 │
//! │  price_bill() ← THIS MODULE (pure, no I/O)                             │
//! │       │  validate quantities, check stock, snapshot prices             │
//! │       ▼                                                                 │
//! │  conditional stock decrements + order insert (same transaction)        │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Pricing Rule
//! Each line is priced from the product's *current* list price and
//! discount, both of which are snapshotted into the line:
//!
//! ```text
//! gross     = unit_price × quantity
//! discount  = round(gross × discount_bps / 10000)
//! line total = gross − discount
//! ```
//!
//! The order total is the sum of line totals. It is computed here once
//! and never recomputed; later catalog price changes must not affect
//! persisted orders.

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::Product;
use crate::validation::validate_quantity;
use crate::MAX_BILL_LINES;

use std::collections::HashMap;

// =============================================================================
// Priced Bill
// =============================================================================

/// One priced line: the product snapshot plus computed totals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PricedLine {
    pub product_id: String,
    pub product_code_snapshot: String,
    pub name_snapshot: String,
    pub unit_price_cents: i64,
    pub discount_bps: u32,
    pub quantity: i64,
    pub line_total_cents: i64,
}

/// The priced result of a whole bill, before persistence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PricedBill {
    /// Lines in request order.
    pub lines: Vec<PricedLine>,
    /// Sum of undiscounted line amounts.
    pub subtotal_cents: i64,
    /// Sum of per-line discount amounts.
    pub discount_cents: i64,
    /// Amount to charge: subtotal minus discounts.
    pub total_cents: i64,
}

// =============================================================================
// Pricing
// =============================================================================

/// Prices a bill from resolved products and requested quantities.
///
/// ## Validation (the "validate" half of validate-then-apply)
/// - Rejects empty bills and oversized bills
/// - Rejects non-positive or oversized quantities
/// - Checks stock sufficiency for *all* lines before any caller-side
///   mutation; quantities for the same product are summed first, so a
///   bill listing one product twice cannot sneak past the check
///
/// ## Purity
/// No I/O. Stock is checked against the `Product` values passed in;
/// the storage layer re-enforces sufficiency with conditional updates
/// when the decrements are applied.
///
/// ## Example
/// ```rust
/// # use chrono::Utc;
/// use voltmart_core::billing::price_bill;
/// use voltmart_core::types::Product;
///
/// let product = Product {
///     id: "p1".into(),
///     product_code: "PRD-0001".into(),
///     name: "Wireless Mouse".into(),
///     category: "Accessory".into(),
///     price_cents: 10000,   // $100.00
///     discount_bps: 1000,   // 10%
///     stock: 5,
///     min_stock: 1,
///     is_active: true,
///     created_at: Utc::now(),
///     updated_at: Utc::now(),
/// };
///
/// let bill = price_bill(&[(product, 5)]).unwrap();
/// assert_eq!(bill.total_cents, 45000); // $450.00
/// ```
pub fn price_bill(lines: &[(Product, i64)]) -> CoreResult<PricedBill> {
    if lines.is_empty() {
        return Err(CoreError::EmptyBill);
    }

    if lines.len() > MAX_BILL_LINES {
        return Err(CoreError::BillTooLarge {
            max: MAX_BILL_LINES,
        });
    }

    for (_, quantity) in lines {
        validate_quantity(*quantity)?;
    }

    // Sufficiency over aggregate quantities per product, so duplicate
    // lines for one product are checked against its stock as a whole.
    let mut requested_per_product: HashMap<&str, i64> = HashMap::new();
    for (product, quantity) in lines {
        *requested_per_product.entry(product.id.as_str()).or_insert(0) += quantity;
    }
    for (product, _) in lines {
        let requested = requested_per_product[product.id.as_str()];
        if !product.can_fulfill(requested) {
            return Err(CoreError::InsufficientStock {
                product_code: product.product_code.clone(),
                requested,
                available: product.stock,
            });
        }
    }

    let mut priced = Vec::with_capacity(lines.len());
    let mut subtotal = Money::zero();
    let mut discount_total = Money::zero();

    for (product, quantity) in lines {
        let gross = product.price().multiply_quantity(*quantity);
        let discount = gross.discount_amount(product.discount_bps);
        let line_total = gross - discount;

        subtotal += gross;
        discount_total += discount;

        priced.push(PricedLine {
            product_id: product.id.clone(),
            product_code_snapshot: product.product_code.clone(),
            name_snapshot: product.name.clone(),
            unit_price_cents: product.price_cents,
            discount_bps: product.discount_bps,
            quantity: *quantity,
            line_total_cents: line_total.cents(),
        });
    }

    Ok(PricedBill {
        lines: priced,
        subtotal_cents: subtotal.cents(),
        discount_cents: discount_total.cents(),
        total_cents: (subtotal - discount_total).cents(),
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn product(code: &str, price_cents: i64, discount_bps: u32, stock: i64) -> Product {
        Product {
            id: format!("id-{code}"),
            product_code: code.to_string(),
            name: format!("Product {code}"),
            category: "Accessory".to_string(),
            price_cents,
            discount_bps,
            stock,
            min_stock: 0,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_worked_example() {
        // stock=5, price=$100.00, discount=10%, qty=5 → $450.00
        let p1 = product("PRD-0001", 10000, 1000, 5);
        let bill = price_bill(&[(p1, 5)]).unwrap();

        assert_eq!(bill.subtotal_cents, 50000);
        assert_eq!(bill.discount_cents, 5000);
        assert_eq!(bill.total_cents, 45000);
        assert_eq!(bill.lines.len(), 1);
        assert_eq!(bill.lines[0].line_total_cents, 45000);
    }

    #[test]
    fn test_total_is_sum_of_discounted_lines() {
        let lines = vec![
            (product("PRD-0001", 19999, 500, 10), 2),
            (product("PRD-0002", 4550, 0, 10), 3),
            (product("PRD-0003", 129900, 2500, 10), 1),
        ];
        let bill = price_bill(&lines).unwrap();

        let manual: i64 = bill.lines.iter().map(|l| l.line_total_cents).sum();
        assert_eq!(bill.total_cents, manual);
        assert_eq!(bill.total_cents, bill.subtotal_cents - bill.discount_cents);
    }

    #[test]
    fn test_snapshot_carries_current_price_and_discount() {
        let p = product("PRD-0007", 8999, 1500, 4);
        let bill = price_bill(&[(p, 2)]).unwrap();

        let line = &bill.lines[0];
        assert_eq!(line.unit_price_cents, 8999);
        assert_eq!(line.discount_bps, 1500);
        assert_eq!(line.product_code_snapshot, "PRD-0007");
        // 17998 gross, 15% = 2699.7 → 2700 discount
        assert_eq!(line.line_total_cents, 17998 - 2700);
    }

    #[test]
    fn test_empty_bill_rejected() {
        assert!(matches!(price_bill(&[]), Err(CoreError::EmptyBill)));
    }

    #[test]
    fn test_non_positive_quantity_rejected() {
        let p = product("PRD-0001", 1000, 0, 10);
        assert!(price_bill(&[(p.clone(), 0)]).is_err());
        assert!(price_bill(&[(p, -2)]).is_err());
    }

    #[test]
    fn test_insufficient_stock_reports_quantities() {
        let p = product("PRD-0001", 1000, 0, 3);
        let err = price_bill(&[(p, 5)]).unwrap_err();
        match err {
            CoreError::InsufficientStock {
                product_code,
                requested,
                available,
            } => {
                assert_eq!(product_code, "PRD-0001");
                assert_eq!(requested, 5);
                assert_eq!(available, 3);
            }
            other => panic!("expected InsufficientStock, got {other:?}"),
        }
    }

    #[test]
    fn test_exact_stock_is_sufficient() {
        let p = product("PRD-0001", 1000, 0, 5);
        assert!(price_bill(&[(p, 5)]).is_ok());
    }

    #[test]
    fn test_duplicate_lines_checked_against_aggregate() {
        // 3 + 3 = 6 requested against stock of 5 must fail even though
        // each line alone would pass.
        let p = product("PRD-0001", 1000, 0, 5);
        let err = price_bill(&[(p.clone(), 3), (p, 3)]).unwrap_err();
        assert!(matches!(err, CoreError::InsufficientStock { requested: 6, .. }));
    }
}
