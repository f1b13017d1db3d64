//! # stall-core: Pure Business Logic for the Stall Marketplace Engine
//!
//! This crate is the heart of the marketplace transaction and reporting
//! engine: all money math, tax rules, transaction pricing, curation rules,
//! and report folding, as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌───────────────────────────────────────────────────────────┐
//! │  Surrounding application (grants, UI, auth - out of scope)│
//! └──────────────────────────────┬────────────────────────────┘
//!                                │
//! ┌──────────────────────────────▼────────────────────────────┐
//! │                 stall-db (persistence layer)              │
//! │   catalog / session / ledger / report repositories        │
//! └──────────────────────────────┬────────────────────────────┘
//!                                │
//! ┌──────────────────────────────▼────────────────────────────┐
//! │              ★ stall-core (THIS CRATE) ★                  │
//! │   money · tax · pricing · curation · report · validation  │
//! │   NO I/O · NO DATABASE · NO NETWORK · PURE FUNCTIONS      │
//! └───────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`money`] - Integer-cents Money type (no floating point!)
//! - [`types`] - Catalog types (items, categories, tax rates)
//! - [`session`] - Sale sessions and their curated item sets
//! - [`tax`] - Sales settings and the pure tax computation
//! - [`transaction`] - Line inputs, snapshots, and transaction pricing
//! - [`report`] - Read-side session report fold
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation
//!
//! ## Design Principles
//!
//! 1. **Pure functions**: same input, same output, every time
//! 2. **No I/O**: database and network access are forbidden here
//! 3. **Integer money**: all monetary values are cents (i64)
//! 4. **Explicit errors**: typed errors, never strings or panics

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod money;
pub mod report;
pub mod session;
pub mod tax;
pub mod transaction;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use stall_core::Money` instead of
// `use stall_core::money::Money`

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use report::{build_report, BestSeller, SessionReport};
pub use session::{Curation, NewSession, Organizer, SaleSession};
pub use tax::{compute_tax, SalesSettings};
pub use transaction::{
    price_transaction, LineInput, PricedTransaction, SalesTransaction, TransactionLine,
};
pub use types::{InventoryCategory, InventoryItem, NewItem, TaxRate};
