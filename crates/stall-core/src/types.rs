//! # Catalog Types
//!
//! The master inventory catalog's domain types.
//!
//! ## Type Hierarchy
//! ```text
//! InventoryCategory 1 ──* InventoryItem        (organizational only)
//! InventoryItem     * ──* SaleSession          (curation, no ownership)
//! InventoryItem     * ──* SalesTransaction     (weak reference + snapshot)
//! ```
//!
//! Items are the only types here with a mutable counter (`current_stock`).
//! Everything that sells or redeems an item goes through the catalog's
//! guarded stock adjustment in stall-db; nothing else may touch the counter.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::money::Money;

// =============================================================================
// Tax Rate
// =============================================================================

/// Tax rate represented in basis points (bps).
///
/// ## Why Basis Points?
/// 1 basis point = 0.01% = 1/10000.
/// 700 bps = 7% (PST), 500 bps = 5% (GST). Integer rates keep tax math exact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxRate(u32);

impl TaxRate {
    /// Creates a tax rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        TaxRate(bps)
    }

    /// Creates a tax rate from a percentage (for convenience).
    pub fn from_percentage(pct: f64) -> Self {
        TaxRate((pct * 100.0).round() as u32)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Zero tax rate.
    #[inline]
    pub const fn zero() -> Self {
        TaxRate(0)
    }

    /// Checks if tax rate is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl Default for TaxRate {
    fn default() -> Self {
        TaxRate::zero()
    }
}

// =============================================================================
// Inventory Category
// =============================================================================

/// An organizational grouping for catalog items (prints, ceramics, zines...).
///
/// Categories have no lifecycle coupling to stock logic; deleting one never
/// cascades to items.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct InventoryCategory {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display name.
    pub name: String,

    /// When the category was created.
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Inventory Item
// =============================================================================

/// A sellable item in the master catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct InventoryItem {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Optional category reference.
    pub category_id: Option<String>,

    /// Display name shown at the point of sale and on reports.
    pub name: String,

    /// Cost price in cents (what the organization paid per unit).
    pub cost_cents: i64,

    /// Sale price in cents (what a buyer pays per unit).
    pub price_cents: i64,

    /// Whether stock is tracked for this item.
    /// When false, `current_stock` is never consulted or mutated by sales.
    pub track_stock: bool,

    /// Current stock level. Invariant: never negative while `track_stock`.
    pub current_stock: i64,

    /// Whether the item is active (soft delete preserves historical reports).
    pub is_active: bool,

    /// When the item was created.
    pub created_at: DateTime<Utc>,

    /// When the item was last updated.
    pub updated_at: DateTime<Utc>,
}

impl InventoryItem {
    /// Returns the sale price as a Money type.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    /// Returns the cost price as a Money type.
    #[inline]
    pub fn cost(&self) -> Money {
        Money::from_cents(self.cost_cents)
    }

    /// Checks whether `quantity` units can be deducted right now.
    ///
    /// Untracked items always pass; tracked items need the stock on hand.
    /// This is a pre-check for error reporting - the store's guarded update
    /// is what actually enforces the invariant.
    pub fn can_deduct(&self, quantity: i64) -> bool {
        !self.track_stock || self.current_stock >= quantity
    }
}

// =============================================================================
// Input Shapes
// =============================================================================

/// Input for creating a catalog item.
///
/// The repository validates the fields (non-empty name, non-negative prices)
/// and assigns identity and timestamps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewItem {
    pub category_id: Option<String>,
    pub name: String,
    pub cost_cents: i64,
    pub price_cents: i64,
    pub track_stock: bool,
    /// Opening stock count.
    pub current_stock: i64,
}

// =============================================================================
// Unit Tests
// =============================================================================
