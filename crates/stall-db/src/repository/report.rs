//! # Report Repository
//!
//! The read side of the engine: folds a session's ledger into a financial
//! summary. Pure read - never mutates the ledger or the catalog, and safe to
//! recompute at any time.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::StoreResult;
use crate::repository::ledger::load_session_transactions;
use stall_core::{build_report, CoreError, SaleSession, SessionReport};

/// Repository for session report aggregation.
#[derive(Debug, Clone)]
pub struct ReportRepository {
    pool: SqlitePool,
}

impl ReportRepository {
    /// Creates a new ReportRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ReportRepository { pool }
    }

    /// Builds the financial report for a session.
    ///
    /// Session and ledger rows are read inside one database transaction, so
    /// the fold sees either all of a concurrent sale's rows or none of them,
    /// never a header without its lines.
    pub async fn build_report(&self, session_id: &str) -> StoreResult<SessionReport> {
        debug!(session_id = %session_id, "Building session report");

        let mut tx = self.pool.begin().await?;

        let session = sqlx::query_as::<_, SaleSession>(
            "SELECT id, name, event_id, project_id, organizer, expected_revenue_cents, \
             created_at, updated_at FROM sessions WHERE id = ?1",
        )
        .bind(session_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| CoreError::SessionNotFound(session_id.to_string()))?;

        let transactions = load_session_transactions(&mut tx, session_id).await?;

        // Read-only transaction; nothing to commit, but closing it cleanly
        // releases the snapshot.
        tx.commit().await?;

        Ok(build_report(&session, &transactions))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
