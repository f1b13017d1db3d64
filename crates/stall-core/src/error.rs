//! # Error Types
//!
//! Domain-specific error types for stall-core.
//!
//! ## Error Hierarchy
//! ```text
//! stall-core errors (this file)
//! ├── CoreError        - Business rule violations
//! └── ValidationError  - Input validation failures
//!
//! stall-db errors (separate crate)
//! └── StoreError       - Database operation failures (carries CoreError through)
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (item name, available vs requested)
//! 3. Errors are enum variants, never String
//! 4. Every variant is recoverable at the caller boundary - the engine
//!    guarantees no partial writes on any failure path

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Catalog item cannot be found (unknown id or soft-deleted).
    #[error("Item not found: {0}")]
    ItemNotFound(String),

    /// Sale session cannot be found.
    #[error("Session not found: {0}")]
    SessionNotFound(String),

    /// Ledger transaction cannot be found.
    #[error("Transaction not found: {0}")]
    TransactionNotFound(String),

    /// Insufficient stock to complete a transaction.
    ///
    /// Raised when a tracked item's stock would go negative. The whole
    /// transaction is rejected; no stock changes from it are applied.
    #[error("Insufficient stock for {name}: available {available}, requested {requested}")]
    InsufficientStock {
        name: String,
        available: i64,
        requested: i64,
    },

    /// A transaction referenced an item outside the session's curated set.
    ///
    /// Only raised when curation enforcement is switched on.
    #[error("Item {item_id} is not in session {session_id}'s curated set")]
    ItemNotInSession { session_id: String, item_id: String },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These occur when caller-supplied input doesn't meet requirements,
/// before any business logic runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., invalid UUID).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Empty collection where at least one element is required.
    #[error("{field} must not be empty")]
    Empty { field: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
