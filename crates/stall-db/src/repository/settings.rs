//! # Settings Repository
//!
//! The process-wide tax configuration, persisted as a single pinned row.
//!
//! Rates are never read from ambient globals: every pricing path loads the
//! row (inside its own database transaction) and injects the values into the
//! pure tax computation. Updates happen only through [`SettingsRepository::update`].

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info};

use crate::error::StoreResult;
use stall_core::validation::validate_tax_rate_bps;
use stall_core::SalesSettings;

/// Repository for the sales settings singleton.
#[derive(Debug, Clone)]
pub struct SettingsRepository {
    pool: SqlitePool,
}

impl SettingsRepository {
    /// Creates a new SettingsRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SettingsRepository { pool }
    }

    /// Loads the current settings.
    pub async fn get(&self) -> StoreResult<SalesSettings> {
        let mut conn = self.pool.acquire().await?;
        load_settings(&mut conn).await
    }

    /// Replaces the tax rates. Both rates are validated to 0..=10000 bps.
    pub async fn update(&self, settings: SalesSettings) -> StoreResult<SalesSettings> {
        validate_tax_rate_bps(settings.pst.bps())?;
        validate_tax_rate_bps(settings.gst.bps())?;

        debug!(
            pst_bps = settings.pst.bps(),
            gst_bps = settings.gst.bps(),
            "Updating sales settings"
        );

        let now = Utc::now();

        sqlx::query(
            "UPDATE sales_settings SET pst_rate_bps = ?1, gst_rate_bps = ?2, updated_at = ?3 \
             WHERE id = 1",
        )
        .bind(settings.pst.bps())
        .bind(settings.gst.bps())
        .bind(now)
        .execute(&self.pool)
        .await?;

        info!(
            pst_bps = settings.pst.bps(),
            gst_bps = settings.gst.bps(),
            "Sales settings updated"
        );

        Ok(settings)
    }
}

/// Loads the settings row on an open connection.
///
/// Used by the ledger so the rates it prices with come from the same
/// database transaction that records the sale.
pub(crate) async fn load_settings(conn: &mut SqliteConnection) -> StoreResult<SalesSettings> {
    let (pst_bps, gst_bps): (u32, u32) =
        sqlx::query_as("SELECT pst_rate_bps, gst_rate_bps FROM sales_settings WHERE id = 1")
            .fetch_one(&mut *conn)
            .await?;

    Ok(SalesSettings::from_bps(pst_bps, gst_bps))
}

// =============================================================================
// Unit Tests
// =============================================================================
