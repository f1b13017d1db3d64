//! # Tax Calculator
//!
//! Pure tax computation over the process-wide sales settings.
//!
//! Tax rates are configuration state with an explicit load/update lifecycle
//! (see `stall-db`'s settings repository) and are *injected* into every
//! computation - nothing here reads ambient globals. Given identical inputs
//! the result is always identical.

use serde::{Deserialize, Serialize};

use crate::money::Money;
use crate::types::TaxRate;

// =============================================================================
// Sales Settings
// =============================================================================

/// Process-wide tax configuration: provincial + federal sales tax rates.
///
/// Read by every tax computation; mutated only through the explicit
/// settings-update operation, never implicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalesSettings {
    /// Provincial sales tax rate (e.g., 700 bps = 7%).
    pub pst: TaxRate,

    /// Goods and services tax rate (e.g., 500 bps = 5%).
    pub gst: TaxRate,
}

impl SalesSettings {
    /// Creates settings from basis-point rates.
    pub const fn from_bps(pst_bps: u32, gst_bps: u32) -> Self {
        SalesSettings {
            pst: TaxRate::from_bps(pst_bps),
            gst: TaxRate::from_bps(gst_bps),
        }
    }

    /// The combined rate applied to a subtotal.
    ///
    /// Summed in basis points *before* any rounding so the two jurisdictions
    /// round once, together, at the point of computation.
    #[inline]
    pub const fn combined(&self) -> TaxRate {
        TaxRate::from_bps(self.pst.bps() + self.gst.bps())
    }
}

impl Default for SalesSettings {
    /// Tax-free default; real rates come from the settings store.
    fn default() -> Self {
        SalesSettings::from_bps(0, 0)
    }
}

// =============================================================================
// Computation
// =============================================================================

/// Computes the tax owed on a subtotal.
///
/// `subtotal × (pst + gst)`, rounded half-up to whole cents exactly once.
/// Pure function: no side effects, no state, deterministic.
///
/// ## Example
/// ```rust
/// use stall_core::money::Money;
/// use stall_core::tax::{compute_tax, SalesSettings};
///
/// let settings = SalesSettings::from_bps(700, 500); // 7% PST + 5% GST
/// let tax = compute_tax(Money::from_cents(1500), &settings);
/// assert_eq!(tax.cents(), 180);
/// ```
pub fn compute_tax(subtotal: Money, settings: &SalesSettings) -> Money {
    subtotal.calculate_tax(settings.combined())
}

// =============================================================================
// Unit Tests
// =============================================================================
