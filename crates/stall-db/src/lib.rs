//! # stall-db: Database Layer for the Stall Marketplace Engine
//!
//! SQLite persistence for the catalog, sessions, settings, and the
//! point-of-sale ledger, with sqlx for async access.
//!
//! ## Architecture Position
//! ```text
//! Application layer (grants UI, chat, auth - out of scope)
//!      │
//!      ▼
//! ┌─────────────────────────────────────────────────────────┐
//! │                 stall-db (THIS CRATE)                   │
//! │                                                         │
//! │   Database (pool.rs)      Repositories                  │
//! │   SqlitePool, WAL mode    item / category / session /   │
//! │   embedded migrations     settings / ledger / report    │
//! └──────────────────────────────┬──────────────────────────┘
//!                                │ pure calls
//!                                ▼
//!                     stall-core (money math)
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Store error types
//! - [`repository`] - Repository implementations
//!
//! ## Usage
//!
//! ```rust,ignore
//! use stall_db::{Database, DbConfig};
//! use stall_core::LineInput;
//!
//! let db = Database::new(DbConfig::new("./stall.db")).await?;
//!
//! let tx = db
//!     .ledger()
//!     .record_transaction(&session_id, &[LineInput::sale(&item_id, 3)])
//!     .await?;
//! let report = db.reports().build_report(&session_id).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{StoreError, StoreResult};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::category::CategoryRepository;
pub use repository::item::ItemRepository;
pub use repository::ledger::{LedgerConfig, LedgerRepository};
pub use repository::report::ReportRepository;
pub use repository::session::SessionRepository;
pub use repository::settings::SettingsRepository;
