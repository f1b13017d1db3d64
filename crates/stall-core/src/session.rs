//! # Sale Sessions
//!
//! A sale session is a bounded sales context - a gallery opening, a market
//! day, the year-round online shop - that curates a subset of the master
//! catalog. Curation is purely referential: adding an item to a session
//! reserves nothing and never touches stock. The ledger is the only
//! component that moves stock.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// =============================================================================
// Organizer
// =============================================================================

/// Who runs the session. Affects reporting roll-ups, not money math.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "snake_case")]
pub enum Organizer {
    /// Run by the organization itself.
    House,
    /// Run by a member artist on the organization's behalf.
    Artist,
    /// Run jointly with an external partner.
    Partner,
}

impl Default for Organizer {
    fn default() -> Self {
        Organizer::House
    }
}

// =============================================================================
// Sale Session
// =============================================================================

/// A named curation of catalog items for one sales context.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct SaleSession {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display name ("Winter Market 2026").
    pub name: String,

    /// Optional link to an event in the surrounding application.
    pub event_id: Option<String>,

    /// Optional link to a funded project.
    pub project_id: Option<String>,

    /// Organizer classification.
    pub organizer: Organizer,

    /// Planning figure entered up front; never derived from the ledger.
    pub expected_revenue_cents: Option<i64>,

    /// When the session was created.
    pub created_at: DateTime<Utc>,

    /// When the session was last updated.
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewSession {
    pub name: String,
    pub event_id: Option<String>,
    pub project_id: Option<String>,
    pub organizer: Organizer,
    pub expected_revenue_cents: Option<i64>,
}

// =============================================================================
// Curation
// =============================================================================

/// A session's curated set of catalog item references.
///
/// ## Invariants
/// - Ordered: items appear in the order they were first added
/// - Duplicate-free: adding an already-present id is a no-op (idempotent add)
/// - Removal of an absent id is a silent no-op
///
/// The set is independent of stock counts until a sale occurs, and removing
/// a reference never deletes the catalog item it points at.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Curation {
    item_ids: Vec<String>,
}

impl Curation {
    /// Creates an empty curation.
    pub fn new() -> Self {
        Curation {
            item_ids: Vec::new(),
        }
    }

    /// Rebuilds a curation from stored, ordered ids.
    pub fn from_ids(item_ids: Vec<String>) -> Self {
        let mut curation = Curation::new();
        curation.extend(item_ids);
        curation
    }

    /// Adds an item reference; no-op if already present.
    ///
    /// Returns true when the set changed.
    pub fn add(&mut self, item_id: impl Into<String>) -> bool {
        let item_id = item_id.into();
        if self.contains(&item_id) {
            return false;
        }
        self.item_ids.push(item_id);
        true
    }

    /// Extends the curated set, preserving first-seen order.
    ///
    /// Returns how many references were actually added.
    pub fn extend<I>(&mut self, item_ids: I) -> usize
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        let mut added = 0;
        for item_id in item_ids {
            if self.add(item_id) {
                added += 1;
            }
        }
        added
    }

    /// Removes an item reference; silent no-op when absent.
    pub fn remove(&mut self, item_id: &str) {
        self.item_ids.retain(|id| id != item_id);
    }

    /// Checks membership.
    pub fn contains(&self, item_id: &str) -> bool {
        self.item_ids.iter().any(|id| id == item_id)
    }

    /// The curated ids in order.
    pub fn ids(&self) -> &[String] {
        &self.item_ids
    }

    /// Number of curated references.
    pub fn len(&self) -> usize {
        self.item_ids.len()
    }

    /// Whether the curation is empty.
    pub fn is_empty(&self) -> bool {
        self.item_ids.is_empty()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
