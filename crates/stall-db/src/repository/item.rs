//! # Item Repository
//!
//! The inventory catalog: the master list of sellable items and the owner of
//! their stock counts.
//!
//! ## Stock Discipline
//! ```text
//! WRONG: read stock, check in application code, write the new absolute value
//!        (two racing sales can both pass the check)
//!
//! RIGHT: one guarded delta update
//!        UPDATE items SET current_stock = current_stock + :delta
//!        WHERE id = :id AND (track_stock = 0 OR current_stock + :delta >= 0)
//!
//! The check and the apply are a single statement, so concurrent
//! transactions touching the same item cannot drive stock negative.
//! ```
//! [`apply_stock_delta`] is the sole stock-mutation entry point; the ledger
//! routes through it inside its own database transaction, and every other
//! caller goes through [`ItemRepository::adjust_stock`].

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::StoreResult;
use stall_core::validation::{validate_name, validate_price_cents};
use stall_core::{CoreError, InventoryItem, NewItem, ValidationError};

const ITEM_COLUMNS: &str = "id, category_id, name, cost_cents, price_cents, \
     track_stock, current_stock, is_active, created_at, updated_at";

/// Repository for inventory catalog operations.
#[derive(Debug, Clone)]
pub struct ItemRepository {
    pool: SqlitePool,
}

impl ItemRepository {
    /// Creates a new ItemRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ItemRepository { pool }
    }

    /// Creates a catalog item.
    ///
    /// ## Validation
    /// - name non-empty, bounded
    /// - cost and sale price non-negative
    /// - opening stock non-negative
    pub async fn insert(&self, data: NewItem) -> StoreResult<InventoryItem> {
        validate_name(&data.name)?;
        validate_price_cents(data.cost_cents)?;
        validate_price_cents(data.price_cents)?;
        if data.current_stock < 0 {
            return Err(ValidationError::OutOfRange {
                field: "current_stock".to_string(),
                min: 0,
                max: i64::MAX,
            }
            .into());
        }

        let now = Utc::now();
        let item = InventoryItem {
            id: Uuid::new_v4().to_string(),
            category_id: data.category_id,
            name: data.name.trim().to_string(),
            cost_cents: data.cost_cents,
            price_cents: data.price_cents,
            track_stock: data.track_stock,
            current_stock: data.current_stock,
            is_active: true,
            created_at: now,
            updated_at: now,
        };

        debug!(id = %item.id, name = %item.name, "Inserting catalog item");

        sqlx::query(
            "INSERT INTO items (id, category_id, name, cost_cents, price_cents, \
             track_stock, current_stock, is_active, created_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        )
        .bind(&item.id)
        .bind(&item.category_id)
        .bind(&item.name)
        .bind(item.cost_cents)
        .bind(item.price_cents)
        .bind(item.track_stock)
        .bind(item.current_stock)
        .bind(item.is_active)
        .bind(item.created_at)
        .bind(item.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(item)
    }

    /// Gets an item snapshot by ID (active items only).
    pub async fn get_by_id(&self, id: &str) -> StoreResult<Option<InventoryItem>> {
        let item = sqlx::query_as::<_, InventoryItem>(&format!(
            "SELECT {ITEM_COLUMNS} FROM items WHERE id = ?1 AND is_active = 1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(item)
    }

    /// Lists active items sorted by name.
    pub async fn list_active(&self, limit: u32) -> StoreResult<Vec<InventoryItem>> {
        let items = sqlx::query_as::<_, InventoryItem>(&format!(
            "SELECT {ITEM_COLUMNS} FROM items WHERE is_active = 1 ORDER BY name LIMIT ?1"
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Updates an item's descriptive fields and prices.
    ///
    /// Stock is deliberately NOT updatable here - use [`adjust_stock`].
    ///
    /// [`adjust_stock`]: ItemRepository::adjust_stock
    pub async fn update(&self, item: &InventoryItem) -> StoreResult<()> {
        validate_name(&item.name)?;
        validate_price_cents(item.cost_cents)?;
        validate_price_cents(item.price_cents)?;

        debug!(id = %item.id, "Updating catalog item");

        let now = Utc::now();

        let result = sqlx::query(
            "UPDATE items SET category_id = ?2, name = ?3, cost_cents = ?4, \
             price_cents = ?5, track_stock = ?6, updated_at = ?7 \
             WHERE id = ?1 AND is_active = 1",
        )
        .bind(&item.id)
        .bind(&item.category_id)
        .bind(&item.name)
        .bind(item.cost_cents)
        .bind(item.price_cents)
        .bind(item.track_stock)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(CoreError::ItemNotFound(item.id.clone()).into());
        }

        Ok(())
    }

    /// Adjusts an item's stock by a delta (negative for sales, positive for
    /// restocking). Returns the new stock level.
    ///
    /// ## Failure Modes
    /// - `ItemNotFound` for unknown or soft-deleted ids
    /// - `InsufficientStock` when the item tracks stock and the delta would
    ///   take it negative - in which case nothing changes
    pub async fn adjust_stock(&self, id: &str, delta: i64) -> StoreResult<i64> {
        let item = self
            .get_by_id(id)
            .await?
            .ok_or_else(|| CoreError::ItemNotFound(id.to_string()))?;

        let mut conn = self.pool.acquire().await?;
        apply_stock_delta(&mut conn, &item, delta).await
    }

    /// Soft-deletes an item.
    ///
    /// Historical ledger lines keep their snapshots, so past reports are
    /// unaffected; the item just stops being sellable.
    pub async fn soft_delete(&self, id: &str) -> StoreResult<()> {
        debug!(id = %id, "Soft-deleting catalog item");

        let now = Utc::now();

        let result = sqlx::query(
            "UPDATE items SET is_active = 0, updated_at = ?2 WHERE id = ?1 AND is_active = 1",
        )
        .bind(id)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(CoreError::ItemNotFound(id.to_string()).into());
        }

        Ok(())
    }

    /// Counts active items (for diagnostics and seed checks).
    pub async fn count(&self) -> StoreResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM items WHERE is_active = 1")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

/// Applies a guarded stock delta on an open connection.
///
/// The caller supplies the item snapshot it already resolved (for the error
/// message's availability figure); the guard itself lives in the WHERE
/// clause, so a stale snapshot can reject spuriously but can never corrupt:
/// the update only lands when the resulting stock is legal *at execution
/// time*.
///
/// Untracked items skip the guard - their counter is maintenance-only and
/// the ledger never routes them here.
pub(crate) async fn apply_stock_delta(
    conn: &mut SqliteConnection,
    item: &InventoryItem,
    delta: i64,
) -> StoreResult<i64> {
    debug!(id = %item.id, delta = %delta, "Applying stock delta");

    let now = Utc::now();

    let new_stock: Option<i64> = sqlx::query_scalar(
        "UPDATE items SET current_stock = current_stock + ?2, updated_at = ?3 \
         WHERE id = ?1 AND (track_stock = 0 OR current_stock + ?2 >= 0) \
         RETURNING current_stock",
    )
    .bind(&item.id)
    .bind(delta)
    .bind(now)
    .fetch_optional(&mut *conn)
    .await?;

    match new_stock {
        Some(stock) => Ok(stock),
        None => Err(CoreError::InsufficientStock {
            name: item.name.clone(),
            available: item.current_stock,
            requested: -delta,
        }
        .into()),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    fn new_item(name: &str, stock: i64, track: bool) -> NewItem {
        NewItem {
            category_id: None,
            name: name.to_string(),
            cost_cents: 200,
            price_cents: 500,
            track_stock: track,
            current_stock: stock,
        }
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let db = test_db().await;
        let item = db.items().insert(new_item("Tote Bag", 10, true)).await.unwrap();

        let fetched = db.items().get_by_id(&item.id).await.unwrap().unwrap();
        assert_eq!(fetched.name, "Tote Bag");
        assert_eq!(fetched.current_stock, 10);
        assert!(fetched.track_stock);
    }

    #[tokio::test]
    async fn test_insert_rejects_negative_prices() {
        let db = test_db().await;

        let mut bad = new_item("Tote Bag", 0, false);
        bad.cost_cents = -1;
        assert!(db.items().insert(bad).await.is_err());

        let mut bad = new_item("Tote Bag", 0, false);
        bad.price_cents = -1;
        assert!(db.items().insert(bad).await.is_err());
    }

    #[tokio::test]
    async fn test_adjust_stock_decrements_and_returns_new_level() {
        let db = test_db().await;
        let item = db.items().insert(new_item("Tote Bag", 10, true)).await.unwrap();

        let new_stock = db.items().adjust_stock(&item.id, -3).await.unwrap();
        assert_eq!(new_stock, 7);

        let new_stock = db.items().adjust_stock(&item.id, 5).await.unwrap();
        assert_eq!(new_stock, 12);
    }

    #[tokio::test]
    async fn test_adjust_stock_guards_tracked_items() {
        let db = test_db().await;
        let item = db.items().insert(new_item("Riso Print", 1, true)).await.unwrap();

        let err = db.items().adjust_stock(&item.id, -5).await.unwrap_err();
        assert!(matches!(
            err,
            crate::error::StoreError::Domain(CoreError::InsufficientStock {
                available: 1,
                requested: 5,
                ..
            })
        ));

        // Nothing changed
        let unchanged = db.items().get_by_id(&item.id).await.unwrap().unwrap();
        assert_eq!(unchanged.current_stock, 1);
    }

    #[tokio::test]
    async fn test_adjust_stock_untracked_applies_unguarded() {
        let db = test_db().await;
        let item = db.items().insert(new_item("Donation Sticker", 0, false)).await.unwrap();

        // Maintenance path: untracked counters move freely
        let new_stock = db.items().adjust_stock(&item.id, -5).await.unwrap();
        assert_eq!(new_stock, -5);
    }

    #[tokio::test]
    async fn test_adjust_stock_unknown_item() {
        let db = test_db().await;
        let err = db.items().adjust_stock("no-such-id", -1).await.unwrap_err();
        assert!(matches!(
            err,
            crate::error::StoreError::Domain(CoreError::ItemNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_soft_delete_hides_item() {
        let db = test_db().await;
        let item = db.items().insert(new_item("Zine", 3, true)).await.unwrap();

        db.items().soft_delete(&item.id).await.unwrap();
        assert!(db.items().get_by_id(&item.id).await.unwrap().is_none());
        assert_eq!(db.items().count().await.unwrap(), 0);
    }
}
