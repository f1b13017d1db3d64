//! # Point-of-Sale Ledger
//!
//! The append-only record of completed transactions, and the only component
//! that moves catalog stock.
//!
//! ## Recording a Transaction
//! ```text
//! record_transaction(session_id, lines)
//!      │
//!      ▼
//! BEGIN ──► resolve session + items ──► price (stall-core, pure)
//!      │
//!      ▼
//! guarded stock delta per tracked line        ◄── any failure here
//!      │                                          rolls back EVERYTHING:
//!      ▼                                          no stock moves, no rows
//! append header + line snapshots ──► COMMIT
//! ```
//! The whole batch shares one database transaction, so a sale that would
//! drive any item's stock negative leaves every item untouched. That
//! all-or-nothing guarantee is the engine's core correctness property.
//!
//! ## Immutability
//! Ledger rows are never updated or deleted. A correction is a new
//! transaction linked to the original via `adjusts_transaction_id`.

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::StoreResult;
use crate::repository::item::apply_stock_delta;
use crate::repository::settings::load_settings;
use stall_core::{
    price_transaction, CoreError, InventoryItem, LineInput, SalesTransaction, TransactionLine,
    ValidationError,
};

// =============================================================================
// Configuration
// =============================================================================

/// Ledger behavior toggles.
#[derive(Debug, Clone, Copy, Default)]
pub struct LedgerConfig {
    /// When true, every transaction line must reference an item in the
    /// session's curated set. Off by default: sessions document intent, the
    /// catalog remains sellable either way.
    pub enforce_curation: bool,
}

// =============================================================================
// Row Types
// =============================================================================

/// Ledger header row.
#[derive(Debug, Clone, sqlx::FromRow)]
pub(crate) struct TransactionRow {
    pub id: String,
    pub session_id: String,
    pub adjusts_transaction_id: Option<String>,
    pub subtotal_cents: i64,
    pub tax_cents: i64,
    pub total_cents: i64,
    pub promo_cost_cents: i64,
    pub created_at: DateTime<Utc>,
}

/// Ledger line row.
#[derive(Debug, Clone, sqlx::FromRow)]
pub(crate) struct LineRow {
    pub item_id: String,
    pub name_snapshot: String,
    pub quantity: i64,
    pub is_voucher: bool,
    pub unit_price_cents: i64,
    pub unit_cost_cents: i64,
    pub line_total_cents: i64,
}

impl From<LineRow> for TransactionLine {
    fn from(row: LineRow) -> Self {
        TransactionLine {
            item_id: row.item_id,
            name_snapshot: row.name_snapshot,
            quantity: row.quantity,
            is_voucher: row.is_voucher,
            unit_price_cents: row.unit_price_cents,
            unit_cost_cents: row.unit_cost_cents,
            line_total_cents: row.line_total_cents,
        }
    }
}

fn assemble(row: TransactionRow, lines: Vec<LineRow>) -> SalesTransaction {
    SalesTransaction {
        id: row.id,
        session_id: row.session_id,
        adjusts_transaction_id: row.adjusts_transaction_id,
        lines: lines.into_iter().map(TransactionLine::from).collect(),
        subtotal_cents: row.subtotal_cents,
        tax_cents: row.tax_cents,
        total_cents: row.total_cents,
        promo_cost_cents: row.promo_cost_cents,
        created_at: row.created_at,
    }
}

const TX_COLUMNS: &str = "id, session_id, adjusts_transaction_id, subtotal_cents, \
     tax_cents, total_cents, promo_cost_cents, created_at";

const LINE_COLUMNS: &str = "item_id, name_snapshot, quantity, is_voucher, \
     unit_price_cents, unit_cost_cents, line_total_cents";

// =============================================================================
// Ledger Repository
// =============================================================================

/// Repository for the point-of-sale ledger.
#[derive(Debug, Clone)]
pub struct LedgerRepository {
    pool: SqlitePool,
    config: LedgerConfig,
}

impl LedgerRepository {
    /// Creates a new LedgerRepository.
    pub fn new(pool: SqlitePool, config: LedgerConfig) -> Self {
        LedgerRepository { pool, config }
    }

    /// Records a completed point-of-sale transaction against a session.
    ///
    /// Validates, prices, applies the all-or-nothing stock batch, and
    /// appends the immutable record. See the module docs for the flow.
    ///
    /// ## Failure Modes
    /// - `SessionNotFound` / `ItemNotFound` - unknown or inactive ids
    /// - `InsufficientStock` - a tracked item would go negative; nothing
    ///   from this transaction is applied
    /// - `Validation` - empty batch or non-positive quantity
    pub async fn record_transaction(
        &self,
        session_id: &str,
        lines: &[LineInput],
    ) -> StoreResult<SalesTransaction> {
        self.record(session_id, lines, None).await
    }

    /// Records a correction to an earlier transaction.
    ///
    /// History is append-only: the original entry stays as recorded and the
    /// adjustment is a new entry in the same session, linked through
    /// `adjusts_transaction_id`. Pricing and stock rules are identical to a
    /// regular transaction (use positive quantities on lines that add,
    /// record returned goods via a later restock on the catalog).
    pub async fn record_adjustment(
        &self,
        original_id: &str,
        lines: &[LineInput],
    ) -> StoreResult<SalesTransaction> {
        let original = self.get_transaction(original_id).await?;
        self.record(&original.session_id, lines, Some(original_id))
            .await
    }

    /// Gets a single ledger entry with its lines.
    pub async fn get_transaction(&self, id: &str) -> StoreResult<SalesTransaction> {
        let row = sqlx::query_as::<_, TransactionRow>(&format!(
            "SELECT {TX_COLUMNS} FROM transactions WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| CoreError::TransactionNotFound(id.to_string()))?;

        let lines = sqlx::query_as::<_, LineRow>(&format!(
            "SELECT {LINE_COLUMNS} FROM transaction_lines \
             WHERE transaction_id = ?1 ORDER BY position"
        ))
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        Ok(assemble(row, lines))
    }

    /// Lists a session's ledger entries in recording order.
    pub async fn list_for_session(&self, session_id: &str) -> StoreResult<Vec<SalesTransaction>> {
        let mut conn = self.pool.acquire().await?;
        load_session_transactions(&mut conn, session_id).await
    }

    // -------------------------------------------------------------------------
    // Internals
    // -------------------------------------------------------------------------

    async fn record(
        &self,
        session_id: &str,
        inputs: &[LineInput],
        adjusts: Option<&str>,
    ) -> StoreResult<SalesTransaction> {
        if inputs.is_empty() {
            return Err(ValidationError::Empty {
                field: "line items".to_string(),
            }
            .into());
        }

        debug!(session_id = %session_id, lines = inputs.len(), "Recording transaction");

        let mut tx = self.pool.begin().await?;

        let session_exists: Option<String> =
            sqlx::query_scalar("SELECT id FROM sessions WHERE id = ?1")
                .bind(session_id)
                .fetch_optional(&mut *tx)
                .await?;
        if session_exists.is_none() {
            return Err(CoreError::SessionNotFound(session_id.to_string()).into());
        }

        if self.config.enforce_curation {
            let curated: Vec<String> = sqlx::query_scalar(
                "SELECT item_id FROM session_items WHERE session_id = ?1",
            )
            .bind(session_id)
            .fetch_all(&mut *tx)
            .await?;

            for input in inputs {
                if !curated.contains(&input.item_id) {
                    return Err(CoreError::ItemNotInSession {
                        session_id: session_id.to_string(),
                        item_id: input.item_id.clone(),
                    }
                    .into());
                }
            }
        }

        // Resolve every item up front so an unknown id rejects the batch
        // before any stock moves.
        let mut items: Vec<InventoryItem> = Vec::with_capacity(inputs.len());
        for input in inputs {
            let item = sqlx::query_as::<_, InventoryItem>(
                "SELECT id, category_id, name, cost_cents, price_cents, track_stock, \
                 current_stock, is_active, created_at, updated_at \
                 FROM items WHERE id = ?1 AND is_active = 1",
            )
            .bind(&input.item_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| CoreError::ItemNotFound(input.item_id.clone()))?;
            items.push(item);
        }

        // Tax rates come from the same database transaction that records
        // the sale, so a settings update never straddles one computation.
        let settings = load_settings(&mut tx).await?;

        let resolved: Vec<(&InventoryItem, &LineInput)> =
            items.iter().zip(inputs.iter()).collect();
        let priced = price_transaction(&resolved, &settings)?;

        // All-or-nothing stock batch: the first guarded update that cannot
        // land aborts the whole database transaction via `?`, rolling back
        // any deltas already applied.
        for (item, input) in &resolved {
            if item.track_stock {
                apply_stock_delta(&mut tx, item, -input.quantity).await?;
            }
        }

        let record = SalesTransaction {
            id: Uuid::new_v4().to_string(),
            session_id: session_id.to_string(),
            adjusts_transaction_id: adjusts.map(str::to_string),
            lines: priced.lines,
            subtotal_cents: priced.subtotal.cents(),
            tax_cents: priced.taxes.cents(),
            total_cents: priced.total.cents(),
            promo_cost_cents: priced.promo_cost.cents(),
            created_at: Utc::now(),
        };

        sqlx::query(
            "INSERT INTO transactions (id, session_id, adjusts_transaction_id, \
             subtotal_cents, tax_cents, total_cents, promo_cost_cents, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        )
        .bind(&record.id)
        .bind(&record.session_id)
        .bind(&record.adjusts_transaction_id)
        .bind(record.subtotal_cents)
        .bind(record.tax_cents)
        .bind(record.total_cents)
        .bind(record.promo_cost_cents)
        .bind(record.created_at)
        .execute(&mut *tx)
        .await?;

        for (position, line) in record.lines.iter().enumerate() {
            sqlx::query(
                "INSERT INTO transaction_lines (id, transaction_id, item_id, position, \
                 name_snapshot, quantity, is_voucher, unit_price_cents, unit_cost_cents, \
                 line_total_cents) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            )
            .bind(Uuid::new_v4().to_string())
            .bind(&record.id)
            .bind(&line.item_id)
            .bind(position as i64)
            .bind(&line.name_snapshot)
            .bind(line.quantity)
            .bind(line.is_voucher)
            .bind(line.unit_price_cents)
            .bind(line.unit_cost_cents)
            .bind(line.line_total_cents)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        info!(
            id = %record.id,
            session_id = %session_id,
            total_cents = record.total_cents,
            promo_cost_cents = record.promo_cost_cents,
            "Transaction recorded"
        );

        Ok(record)
    }
}

/// Loads a session's full ledger on an open connection, in recording order.
///
/// Shared with the report aggregator so reports read from one consistent
/// snapshot.
pub(crate) async fn load_session_transactions(
    conn: &mut SqliteConnection,
    session_id: &str,
) -> StoreResult<Vec<SalesTransaction>> {
    let rows = sqlx::query_as::<_, TransactionRow>(&format!(
        "SELECT {TX_COLUMNS} FROM transactions WHERE session_id = ?1 ORDER BY created_at, id"
    ))
    .bind(session_id)
    .fetch_all(&mut *conn)
    .await?;

    let mut transactions = Vec::with_capacity(rows.len());
    for row in rows {
        let lines = sqlx::query_as::<_, LineRow>(&format!(
            "SELECT {LINE_COLUMNS} FROM transaction_lines \
             WHERE transaction_id = ?1 ORDER BY position"
        ))
        .bind(&row.id)
        .fetch_all(&mut *conn)
        .await?;
        transactions.push(assemble(row, lines));
    }

    Ok(transactions)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use crate::pool::{Database, DbConfig};
    use stall_core::{NewItem, NewSession, Organizer, SalesSettings};

    async fn test_db() -> Database {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.settings()
            .update(SalesSettings::from_bps(700, 500))
            .await
            .unwrap();
        db
    }

    async fn seed_item(db: &Database, name: &str, stock: i64, track: bool) -> String {
        db.items()
            .insert(NewItem {
                category_id: None,
                name: name.to_string(),
                cost_cents: 200,
                price_cents: 500,
                track_stock: track,
                current_stock: stock,
            })
            .await
            .unwrap()
            .id
    }

    async fn seed_session(db: &Database) -> String {
        db.sessions()
            .create(NewSession {
                name: "Winter Market".to_string(),
                event_id: None,
                project_id: None,
                organizer: Organizer::House,
                expected_revenue_cents: None,
            })
            .await
            .unwrap()
            .id
    }

    async fn stock_of(db: &Database, item_id: &str) -> i64 {
        db.items()
            .get_by_id(item_id)
            .await
            .unwrap()
            .unwrap()
            .current_stock
    }

    #[tokio::test]
    async fn test_revenue_sale() {
        // 3 × $5.00 at 7% + 5%: subtotal 15.00, tax 1.80, total 16.80,
        // stock 10 -> 7
        let db = test_db().await;
        let item = seed_item(&db, "Screen Print", 10, true).await;
        let session = seed_session(&db).await;

        let tx = db
            .ledger()
            .record_transaction(&session, &[LineInput::sale(&item, 3)])
            .await
            .unwrap();

        assert_eq!(tx.subtotal_cents, 1500);
        assert_eq!(tx.tax_cents, 180);
        assert_eq!(tx.total_cents, 1680);
        assert_eq!(tx.promo_cost_cents, 0);
        assert_eq!(stock_of(&db, &item).await, 7);
    }

    #[tokio::test]
    async fn test_voucher_redemption() {
        // 2 × voucher: nothing charged, cost tracked, stock still moves
        let db = test_db().await;
        let item = seed_item(&db, "Screen Print", 10, true).await;
        let session = seed_session(&db).await;

        let tx = db
            .ledger()
            .record_transaction(&session, &[LineInput::voucher(&item, 2)])
            .await
            .unwrap();

        assert_eq!(tx.subtotal_cents, 0);
        assert_eq!(tx.tax_cents, 0);
        assert_eq!(tx.total_cents, 0);
        assert_eq!(tx.promo_cost_cents, 400);
        assert_eq!(stock_of(&db, &item).await, 8);
    }

    #[tokio::test]
    async fn test_insufficient_stock_rejects_whole_transaction() {
        let db = test_db().await;
        let item = seed_item(&db, "Riso Print", 1, true).await;
        let session = seed_session(&db).await;

        let err = db
            .ledger()
            .record_transaction(&session, &[LineInput::sale(&item, 5)])
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            StoreError::Domain(CoreError::InsufficientStock {
                available: 1,
                requested: 5,
                ..
            })
        ));

        assert_eq!(stock_of(&db, &item).await, 1);
        assert!(db.ledger().list_for_session(&session).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_atomicity_across_lines() {
        // First line would succeed alone; the second cannot. Neither lands.
        let db = test_db().await;
        let plenty = seed_item(&db, "Tote", 10, true).await;
        let scarce = seed_item(&db, "Mug", 1, true).await;
        let session = seed_session(&db).await;

        let err = db
            .ledger()
            .record_transaction(
                &session,
                &[LineInput::sale(&plenty, 3), LineInput::sale(&scarce, 5)],
            )
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            StoreError::Domain(CoreError::InsufficientStock { .. })
        ));

        // The first line's delta was rolled back with everything else
        assert_eq!(stock_of(&db, &plenty).await, 10);
        assert_eq!(stock_of(&db, &scarce).await, 1);
        assert!(db.ledger().list_for_session(&session).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_untracked_items_skip_stock() {
        let db = test_db().await;
        let item = seed_item(&db, "Pay-What-You-Can Zine", 0, false).await;
        let session = seed_session(&db).await;

        let tx = db
            .ledger()
            .record_transaction(&session, &[LineInput::sale(&item, 50)])
            .await
            .unwrap();

        assert_eq!(tx.subtotal_cents, 25_000);
        // Counter untouched: stock is not consulted or mutated
        assert_eq!(stock_of(&db, &item).await, 0);
    }

    #[tokio::test]
    async fn test_unknown_item_rejects_before_stock_moves() {
        let db = test_db().await;
        let real = seed_item(&db, "Tote", 10, true).await;
        let session = seed_session(&db).await;

        let err = db
            .ledger()
            .record_transaction(
                &session,
                &[
                    LineInput::sale(&real, 2),
                    LineInput::sale("ghost-item", 1),
                ],
            )
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            StoreError::Domain(CoreError::ItemNotFound(_))
        ));

        assert_eq!(stock_of(&db, &real).await, 10);
    }

    #[tokio::test]
    async fn test_unknown_session() {
        let db = test_db().await;
        let item = seed_item(&db, "Tote", 10, true).await;

        let err = db
            .ledger()
            .record_transaction("ghost-session", &[LineInput::sale(&item, 1)])
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            StoreError::Domain(CoreError::SessionNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_empty_batch_rejected() {
        let db = test_db().await;
        let session = seed_session(&db).await;

        let err = db.ledger().record_transaction(&session, &[]).await.unwrap_err();
        assert!(matches!(
            err,
            StoreError::Domain(CoreError::Validation(ValidationError::Empty { .. }))
        ));
    }

    #[tokio::test]
    async fn test_snapshots_survive_repricing() {
        let db = test_db().await;
        let item_id = seed_item(&db, "Tote", 10, true).await;
        let session = seed_session(&db).await;

        let tx = db
            .ledger()
            .record_transaction(&session, &[LineInput::sale(&item_id, 1)])
            .await
            .unwrap();

        // Reprice the catalog item afterwards
        let mut item = db.items().get_by_id(&item_id).await.unwrap().unwrap();
        item.price_cents = 9_900;
        db.items().update(&item).await.unwrap();

        // The ledger still shows the price in force at sale time
        let reloaded = db.ledger().get_transaction(&tx.id).await.unwrap();
        assert_eq!(reloaded.lines[0].unit_price_cents, 500);
        assert_eq!(reloaded.subtotal_cents, 500);
    }

    #[tokio::test]
    async fn test_adjustment_links_to_original() {
        let db = test_db().await;
        let item = seed_item(&db, "Tote", 10, true).await;
        let session = seed_session(&db).await;

        let original = db
            .ledger()
            .record_transaction(&session, &[LineInput::sale(&item, 2)])
            .await
            .unwrap();

        let adjustment = db
            .ledger()
            .record_adjustment(&original.id, &[LineInput::sale(&item, 1)])
            .await
            .unwrap();

        assert_eq!(
            adjustment.adjusts_transaction_id.as_deref(),
            Some(original.id.as_str())
        );
        assert_eq!(adjustment.session_id, session);

        // The original is still exactly as recorded
        let reloaded = db.ledger().get_transaction(&original.id).await.unwrap();
        assert_eq!(reloaded.subtotal_cents, original.subtotal_cents);
        assert!(reloaded.adjusts_transaction_id.is_none());
    }

    #[tokio::test]
    async fn test_adjustment_of_unknown_transaction() {
        let db = test_db().await;
        let item = seed_item(&db, "Tote", 10, true).await;

        let err = db
            .ledger()
            .record_adjustment("ghost-tx", &[LineInput::sale(&item, 1)])
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            StoreError::Domain(CoreError::TransactionNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_curation_enforcement_when_enabled() {
        let db = Database::new(DbConfig::in_memory().enforce_curation(true))
            .await
            .unwrap();
        let curated = seed_item(&db, "Tote", 10, true).await;
        let stray = seed_item(&db, "Mug", 10, true).await;
        let session = seed_session(&db).await;
        db.sessions().curate(&session, &[curated.clone()]).await.unwrap();

        // Curated item sells fine
        db.ledger()
            .record_transaction(&session, &[LineInput::sale(&curated, 1)])
            .await
            .unwrap();

        // Stray item is rejected before any stock moves
        let err = db
            .ledger()
            .record_transaction(&session, &[LineInput::sale(&stray, 1)])
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            StoreError::Domain(CoreError::ItemNotInSession { .. })
        ));
        assert_eq!(stock_of(&db, &stray).await, 10);
    }

    #[tokio::test]
    async fn test_curation_not_enforced_by_default() {
        let db = test_db().await;
        let stray = seed_item(&db, "Mug", 10, true).await;
        let session = seed_session(&db).await;

        // No curation at all; the sale still records
        db.ledger()
            .record_transaction(&session, &[LineInput::sale(&stray, 1)])
            .await
            .unwrap();
        assert_eq!(stock_of(&db, &stray).await, 9);
    }

    #[tokio::test]
    async fn test_settings_update_applies_to_later_transactions() {
        let db = test_db().await;
        let item = seed_item(&db, "Tote", 10, true).await;
        let session = seed_session(&db).await;

        let before = db
            .ledger()
            .record_transaction(&session, &[LineInput::sale(&item, 1)])
            .await
            .unwrap();
        assert_eq!(before.tax_cents, 60); // 12% of $5.00

        db.settings()
            .update(SalesSettings::from_bps(0, 0))
            .await
            .unwrap();

        let after = db
            .ledger()
            .record_transaction(&session, &[LineInput::sale(&item, 1)])
            .await
            .unwrap();
        assert_eq!(after.tax_cents, 0);

        // The earlier record's frozen tax is untouched
        let reloaded = db.ledger().get_transaction(&before.id).await.unwrap();
        assert_eq!(reloaded.tax_cents, 60);
    }
}
