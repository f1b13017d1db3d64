//! # Transaction Pricing
//!
//! The pure money math behind the point-of-sale ledger.
//!
//! ## The Voucher Rule
//! ```text
//! Revenue line  (is_voucher = false):  price × qty -> subtotal -> taxed
//! Voucher line  (is_voucher = true):   contributes NOTHING to subtotal,
//!                                      cost × qty -> promotional cost
//! ```
//! A voucher is a redemption at no charge - comped merchandise for a donor,
//! an artist's promo copy. The buyer pays nothing, the organization still
//! paid for the goods, so the cost is tracked on the transaction for
//! reporting while the total stays untouched.
//!
//! Pricing here is pure; resolving item ids and moving stock is the
//! store's job.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CoreResult;
use crate::money::Money;
use crate::tax::{compute_tax, SalesSettings};
use crate::types::InventoryItem;
use crate::validation::validate_quantity;

// =============================================================================
// Line Input
// =============================================================================

/// One requested line on a point-of-sale transaction, as supplied by the
/// caller. Prices are deliberately absent - the engine is the single source
/// of truth for money math.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineInput {
    /// Catalog item being sold or redeemed.
    pub item_id: String,

    /// Units on this line.
    pub quantity: i64,

    /// True for a no-charge voucher redemption.
    pub is_voucher: bool,
}

impl LineInput {
    /// A regular revenue line.
    pub fn sale(item_id: impl Into<String>, quantity: i64) -> Self {
        LineInput {
            item_id: item_id.into(),
            quantity,
            is_voucher: false,
        }
    }

    /// A voucher redemption line.
    pub fn voucher(item_id: impl Into<String>, quantity: i64) -> Self {
        LineInput {
            item_id: item_id.into(),
            quantity,
            is_voucher: true,
        }
    }
}

// =============================================================================
// Transaction Line
// =============================================================================

/// A priced line on a recorded transaction.
///
/// Uses the snapshot pattern: the item's name, sale price, and cost price are
/// frozen at recording time, so repricing or soft-deleting the catalog item
/// later never changes what a historical report says.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionLine {
    /// Catalog item reference (weak - lookup only, not ownership).
    pub item_id: String,

    /// Item name at time of sale (frozen).
    pub name_snapshot: String,

    /// Units on this line.
    pub quantity: i64,

    /// Whether this line was a voucher redemption.
    pub is_voucher: bool,

    /// Sale price per unit in cents at time of sale (frozen).
    pub unit_price_cents: i64,

    /// Cost price per unit in cents at time of sale (frozen).
    pub unit_cost_cents: i64,

    /// Line total before tax. Always zero for voucher lines.
    pub line_total_cents: i64,
}

impl TransactionLine {
    /// Cost of the goods on this line (cost × quantity).
    #[inline]
    pub fn line_cost(&self) -> Money {
        Money::from_cents(self.unit_cost_cents).multiply_quantity(self.quantity)
    }

    /// Line total as Money.
    #[inline]
    pub fn line_total(&self) -> Money {
        Money::from_cents(self.line_total_cents)
    }
}

// =============================================================================
// Sales Transaction
// =============================================================================

/// A completed, immutable ledger entry.
///
/// Once recorded a transaction is never mutated; corrections are recorded as
/// new entries linked through `adjusts_transaction_id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SalesTransaction {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// The session this entry belongs to.
    pub session_id: String,

    /// Set when this entry corrects an earlier one.
    pub adjusts_transaction_id: Option<String>,

    /// Priced lines in the order they were submitted.
    pub lines: Vec<TransactionLine>,

    /// Revenue lines only, before tax (frozen).
    pub subtotal_cents: i64,

    /// Tax on the subtotal at the rates in force when recorded (frozen).
    pub tax_cents: i64,

    /// `subtotal + taxes` (frozen). Vouchers never appear here.
    pub total_cents: i64,

    /// Cost of voucher lines (frozen). Tracked for reporting, not charged.
    pub promo_cost_cents: i64,

    /// When the transaction was recorded.
    pub created_at: DateTime<Utc>,
}

impl SalesTransaction {
    /// Subtotal as Money.
    #[inline]
    pub fn subtotal(&self) -> Money {
        Money::from_cents(self.subtotal_cents)
    }

    /// Total as Money.
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }

    /// Promotional cost as Money.
    #[inline]
    pub fn promo_cost(&self) -> Money {
        Money::from_cents(self.promo_cost_cents)
    }

    /// Cost of goods across ALL lines, voucher and revenue alike.
    pub fn cogs(&self) -> Money {
        self.lines.iter().map(TransactionLine::line_cost).sum()
    }
}

// =============================================================================
// Pricing
// =============================================================================

/// The priced shape of a transaction before it is persisted.
#[derive(Debug, Clone)]
pub struct PricedTransaction {
    pub lines: Vec<TransactionLine>,
    pub subtotal: Money,
    pub taxes: Money,
    pub total: Money,
    pub promo_cost: Money,
}

/// Prices a batch of resolved line inputs.
///
/// ## Steps
/// 1. Validate every quantity (positive, bounded).
/// 2. Snapshot each item's name/price/cost onto its line.
/// 3. `subtotal` = Σ price × qty over revenue lines; vouchers contribute zero.
/// 4. `taxes` = subtotal × (pst + gst), rounded once.
/// 5. `total` = subtotal + taxes.
/// 6. `promo_cost` = Σ cost × qty over voucher lines; not added to total.
///
/// Stock is untouched here - the store applies the all-or-nothing stock
/// batch around this computation.
pub fn price_transaction(
    resolved: &[(&InventoryItem, &LineInput)],
    settings: &SalesSettings,
) -> CoreResult<PricedTransaction> {
    let mut lines = Vec::with_capacity(resolved.len());
    let mut subtotal = Money::zero();
    let mut promo_cost = Money::zero();

    for (item, input) in resolved {
        validate_quantity(input.quantity)?;

        let line_total = if input.is_voucher {
            promo_cost += item.cost().multiply_quantity(input.quantity);
            Money::zero()
        } else {
            let t = item.price().multiply_quantity(input.quantity);
            subtotal += t;
            t
        };

        lines.push(TransactionLine {
            item_id: item.id.clone(),
            name_snapshot: item.name.clone(),
            quantity: input.quantity,
            is_voucher: input.is_voucher,
            unit_price_cents: item.price_cents,
            unit_cost_cents: item.cost_cents,
            line_total_cents: line_total.cents(),
        });
    }

    let taxes = compute_tax(subtotal, settings);

    Ok(PricedTransaction {
        lines,
        subtotal,
        taxes,
        total: subtotal + taxes,
        promo_cost,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{CoreError, ValidationError};

    fn print_item() -> InventoryItem {
        InventoryItem {
            id: "item-a".to_string(),
            category_id: None,
            name: "Screen Print".to_string(),
            cost_cents: 200,
            price_cents: 500,
            track_stock: true,
            current_stock: 10,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn settings() -> SalesSettings {
        SalesSettings::from_bps(700, 500)
    }

    #[test]
    fn test_revenue_sale_pricing() {
        // 3 × $5.00 at 7% + 5% tax
        let item = print_item();
        let input = LineInput::sale("item-a", 3);

        let priced = price_transaction(&[(&item, &input)], &settings()).unwrap();

        assert_eq!(priced.subtotal.cents(), 1500);
        assert_eq!(priced.taxes.cents(), 180);
        assert_eq!(priced.total.cents(), 1680);
        assert_eq!(priced.promo_cost.cents(), 0);
        assert_eq!(priced.lines[0].line_total_cents, 1500);
    }

    #[test]
    fn test_voucher_pricing_is_cost_only() {
        // 2 × voucher: nothing charged, $2.00 cost each tracked
        let item = print_item();
        let input = LineInput::voucher("item-a", 2);

        let priced = price_transaction(&[(&item, &input)], &settings()).unwrap();

        assert_eq!(priced.subtotal.cents(), 0);
        assert_eq!(priced.taxes.cents(), 0);
        assert_eq!(priced.total.cents(), 0);
        assert_eq!(priced.promo_cost.cents(), 400);
        assert_eq!(priced.lines[0].line_total_cents, 0);
    }

    #[test]
    fn test_mixed_lines_partition_correctly() {
        let item = print_item();
        let sale = LineInput::sale("item-a", 3);
        let voucher = LineInput::voucher("item-a", 2);

        let priced =
            price_transaction(&[(&item, &sale), (&item, &voucher)], &settings()).unwrap();

        // Voucher units never leak into the taxed side
        assert_eq!(priced.subtotal.cents(), 1500);
        assert_eq!(priced.taxes.cents(), 180);
        assert_eq!(priced.total.cents(), 1680);
        assert_eq!(priced.promo_cost.cents(), 400);
    }

    #[test]
    fn test_snapshots_frozen_on_lines() {
        let item = print_item();
        let input = LineInput::sale("item-a", 1);

        let priced = price_transaction(&[(&item, &input)], &settings()).unwrap();
        let line = &priced.lines[0];

        assert_eq!(line.name_snapshot, "Screen Print");
        assert_eq!(line.unit_price_cents, 500);
        assert_eq!(line.unit_cost_cents, 200);
    }

    #[test]
    fn test_rejects_non_positive_quantity() {
        let item = print_item();
        let input = LineInput::sale("item-a", 0);

        let err = price_transaction(&[(&item, &input)], &settings()).unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::MustBePositive { .. })
        ));
    }

    #[test]
    fn test_cogs_counts_all_lines() {
        let tx = SalesTransaction {
            id: "tx-1".to_string(),
            session_id: "s-1".to_string(),
            adjusts_transaction_id: None,
            lines: vec![
                TransactionLine {
                    item_id: "item-a".to_string(),
                    name_snapshot: "Screen Print".to_string(),
                    quantity: 3,
                    is_voucher: false,
                    unit_price_cents: 500,
                    unit_cost_cents: 200,
                    line_total_cents: 1500,
                },
                TransactionLine {
                    item_id: "item-a".to_string(),
                    name_snapshot: "Screen Print".to_string(),
                    quantity: 2,
                    is_voucher: true,
                    unit_price_cents: 500,
                    unit_cost_cents: 200,
                    line_total_cents: 0,
                },
            ],
            subtotal_cents: 1500,
            tax_cents: 180,
            total_cents: 1680,
            promo_cost_cents: 400,
            created_at: Utc::now(),
        };

        // (3 + 2) × $2.00 - voucher cost is inside COGS, not beside it
        assert_eq!(tx.cogs().cents(), 1000);
    }
}
