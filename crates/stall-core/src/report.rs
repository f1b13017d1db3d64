//! # Session Reports
//!
//! Read-side aggregation over a session's ledger.
//!
//! ## Where Each Figure Comes From
//! ```text
//! actual_revenue     Σ transaction.subtotal      tax excluded: pass-through
//! cogs               Σ cost × qty, ALL lines     vouchers included
//! promotional_cost   Σ transaction.promo_cost    a named subset of cogs
//! net_profit         actual_revenue − cogs
//! best_sellers       units ranked desc           voucher units count
//! ```
//! Note that promotional cost is *inside* COGS, not beside it: subtracting
//! both from revenue would double-count the voucher goods.
//!
//! Building a report is a pure fold - it never mutates the ledger or the
//! catalog, and recomputing it with no intervening transactions yields an
//! identical result.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::money::Money;
use crate::session::SaleSession;
use crate::transaction::SalesTransaction;

// =============================================================================
// Report Types
// =============================================================================

/// One entry in the best-sellers ranking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BestSeller {
    pub item_id: String,

    /// Name as snapshotted on the ledger (survives catalog edits).
    pub name: String,

    /// Total units across revenue and voucher lines.
    pub units_sold: i64,
}

/// Financial summary of one session's ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionReport {
    pub session_id: String,

    /// Ledger entries folded into this report.
    pub transaction_count: usize,

    /// Σ subtotal - what buyers actually paid, before tax.
    pub actual_revenue_cents: i64,

    /// Cost of goods sold or given away, voucher lines included.
    pub cogs_cents: i64,

    /// Cost of voucher redemptions (subset of `cogs_cents`).
    pub promotional_cost_cents: i64,

    /// `actual_revenue − cogs`.
    pub net_profit_cents: i64,

    /// The session's planning figure, when one was entered.
    pub expected_revenue_cents: Option<i64>,

    /// `actual − expected`, when a planning figure exists.
    pub revenue_variance_cents: Option<i64>,

    /// Items ranked by units sold, descending; ties broken lexically by
    /// item id so the ordering is deterministic.
    pub best_sellers: Vec<BestSeller>,
}

impl SessionReport {
    /// Actual revenue as Money.
    #[inline]
    pub fn actual_revenue(&self) -> Money {
        Money::from_cents(self.actual_revenue_cents)
    }

    /// Net profit as Money.
    #[inline]
    pub fn net_profit(&self) -> Money {
        Money::from_cents(self.net_profit_cents)
    }
}

// =============================================================================
// Fold
// =============================================================================

/// Folds a session's ledger entries into a report.
///
/// Transactions must all belong to `session`; the store guarantees that by
/// construction when it loads them.
pub fn build_report(session: &SaleSession, transactions: &[SalesTransaction]) -> SessionReport {
    let mut revenue = Money::zero();
    let mut cogs = Money::zero();
    let mut promo = Money::zero();

    // BTreeMap keys give the lexical tie-break for free.
    let mut units: BTreeMap<String, (String, i64)> = BTreeMap::new();

    for tx in transactions {
        revenue += tx.subtotal();
        cogs += tx.cogs();
        promo += tx.promo_cost();

        for line in &tx.lines {
            let entry = units
                .entry(line.item_id.clone())
                .or_insert_with(|| (line.name_snapshot.clone(), 0));
            entry.1 += line.quantity;
        }
    }

    let mut best_sellers: Vec<BestSeller> = units
        .into_iter()
        .map(|(item_id, (name, units_sold))| BestSeller {
            item_id,
            name,
            units_sold,
        })
        .collect();
    // Stable sort over the lexically-ordered input: equal unit counts stay
    // in item-id order.
    best_sellers.sort_by(|a, b| b.units_sold.cmp(&a.units_sold));

    let net_profit = revenue - cogs;
    let variance = session
        .expected_revenue_cents
        .map(|expected| revenue.cents() - expected);

    SessionReport {
        session_id: session.id.clone(),
        transaction_count: transactions.len(),
        actual_revenue_cents: revenue.cents(),
        cogs_cents: cogs.cents(),
        promotional_cost_cents: promo.cents(),
        net_profit_cents: net_profit.cents(),
        expected_revenue_cents: session.expected_revenue_cents,
        revenue_variance_cents: variance,
        best_sellers,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
