//! # Session Repository
//!
//! Sale sessions and their curated item sets.
//!
//! ## Curation Is Referential
//! Curating an item into a session records a reference in `session_items` -
//! nothing more. Stock is untouched, the catalog row is untouched, and
//! removing the reference later deletes only the reference. The ledger is
//! the sole component that moves stock.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::StoreResult;
use stall_core::validation::validate_name;
use stall_core::{CoreError, Curation, NewSession, SaleSession};

const SESSION_COLUMNS: &str = "id, name, event_id, project_id, organizer, \
     expected_revenue_cents, created_at, updated_at";

/// Repository for sale session operations.
#[derive(Debug, Clone)]
pub struct SessionRepository {
    pool: SqlitePool,
}

impl SessionRepository {
    /// Creates a new SessionRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SessionRepository { pool }
    }

    /// Creates a session with an empty curated set.
    pub async fn create(&self, data: NewSession) -> StoreResult<SaleSession> {
        validate_name(&data.name)?;

        let now = Utc::now();
        let session = SaleSession {
            id: Uuid::new_v4().to_string(),
            name: data.name.trim().to_string(),
            event_id: data.event_id,
            project_id: data.project_id,
            organizer: data.organizer,
            expected_revenue_cents: data.expected_revenue_cents,
            created_at: now,
            updated_at: now,
        };

        debug!(id = %session.id, name = %session.name, "Creating sale session");

        sqlx::query(
            "INSERT INTO sessions (id, name, event_id, project_id, organizer, \
             expected_revenue_cents, created_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        )
        .bind(&session.id)
        .bind(&session.name)
        .bind(&session.event_id)
        .bind(&session.project_id)
        .bind(session.organizer)
        .bind(session.expected_revenue_cents)
        .bind(session.created_at)
        .bind(session.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(session)
    }

    /// Gets a session by ID.
    pub async fn get_by_id(&self, id: &str) -> StoreResult<Option<SaleSession>> {
        let session = sqlx::query_as::<_, SaleSession>(&format!(
            "SELECT {SESSION_COLUMNS} FROM sessions WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(session)
    }

    /// Lists sessions, newest first.
    pub async fn list(&self, limit: u32) -> StoreResult<Vec<SaleSession>> {
        let sessions = sqlx::query_as::<_, SaleSession>(&format!(
            "SELECT {SESSION_COLUMNS} FROM sessions ORDER BY created_at DESC LIMIT ?1"
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(sessions)
    }

    /// Extends a session's curated set with catalog item references.
    ///
    /// Idempotent: ids already curated are skipped, order of first addition
    /// is preserved. Every referenced item must exist in the catalog.
    /// Returns how many references were actually added.
    pub async fn curate(&self, session_id: &str, item_ids: &[String]) -> StoreResult<usize> {
        debug!(session_id = %session_id, count = item_ids.len(), "Curating items into session");

        let mut tx = self.pool.begin().await?;

        let exists: Option<String> = sqlx::query_scalar("SELECT id FROM sessions WHERE id = ?1")
            .bind(session_id)
            .fetch_optional(&mut *tx)
            .await?;
        if exists.is_none() {
            return Err(CoreError::SessionNotFound(session_id.to_string()).into());
        }

        for item_id in item_ids {
            let item_exists: Option<String> =
                sqlx::query_scalar("SELECT id FROM items WHERE id = ?1 AND is_active = 1")
                    .bind(item_id)
                    .fetch_optional(&mut *tx)
                    .await?;
            if item_exists.is_none() {
                return Err(CoreError::ItemNotFound(item_id.clone()).into());
            }
        }

        let existing: Vec<String> = sqlx::query_scalar(
            "SELECT item_id FROM session_items WHERE session_id = ?1 ORDER BY position",
        )
        .bind(session_id)
        .fetch_all(&mut *tx)
        .await?;

        // The ordered-set rules (dedup, first-seen order) live in stall-core;
        // this just persists the positions it decides on.
        let mut curation = Curation::from_ids(existing);
        let before = curation.len();
        let added = curation.extend(item_ids.iter().cloned());

        for (position, item_id) in curation.ids().iter().enumerate().skip(before) {
            sqlx::query(
                "INSERT INTO session_items (session_id, item_id, position) VALUES (?1, ?2, ?3)",
            )
            .bind(session_id)
            .bind(item_id)
            .bind(position as i64)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(added)
    }

    /// Removes an item reference from a session's curated set.
    ///
    /// Silent no-op when the reference is absent; never touches stock or the
    /// catalog row itself.
    pub async fn decurate(&self, session_id: &str, item_id: &str) -> StoreResult<()> {
        debug!(session_id = %session_id, item_id = %item_id, "Decurating item from session");

        sqlx::query("DELETE FROM session_items WHERE session_id = ?1 AND item_id = ?2")
            .bind(session_id)
            .bind(item_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// The session's curated item ids, in curation order.
    pub async fn curated_items(&self, session_id: &str) -> StoreResult<Vec<String>> {
        let ids: Vec<String> = sqlx::query_scalar(
            "SELECT item_id FROM session_items WHERE session_id = ?1 ORDER BY position",
        )
        .bind(session_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(ids)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use stall_core::{NewItem, Organizer};

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    fn new_session(name: &str) -> NewSession {
        NewSession {
            name: name.to_string(),
            event_id: None,
            project_id: None,
            organizer: Organizer::House,
            expected_revenue_cents: Some(50_000),
        }
    }

    async fn seed_item(db: &Database, name: &str) -> String {
        db.items()
            .insert(NewItem {
                category_id: None,
                name: name.to_string(),
                cost_cents: 200,
                price_cents: 500,
                track_stock: true,
                current_stock: 10,
            })
            .await
            .unwrap()
            .id
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let db = test_db().await;
        let session = db.sessions().create(new_session("Winter Market")).await.unwrap();

        let fetched = db.sessions().get_by_id(&session.id).await.unwrap().unwrap();
        assert_eq!(fetched.name, "Winter Market");
        assert_eq!(fetched.organizer, Organizer::House);
        assert_eq!(fetched.expected_revenue_cents, Some(50_000));
    }

    #[tokio::test]
    async fn test_curate_is_idempotent_and_ordered() {
        let db = test_db().await;
        let session = db.sessions().create(new_session("Winter Market")).await.unwrap();
        let a = seed_item(&db, "Tote").await;
        let b = seed_item(&db, "Mug").await;

        let added = db
            .sessions()
            .curate(&session.id, &[a.clone(), b.clone()])
            .await
            .unwrap();
        assert_eq!(added, 2);

        // Re-curating an existing id adds nothing and keeps order
        let added = db
            .sessions()
            .curate(&session.id, &[b.clone(), a.clone()])
            .await
            .unwrap();
        assert_eq!(added, 0);

        let curated = db.sessions().curated_items(&session.id).await.unwrap();
        assert_eq!(curated, vec![a, b]);
    }

    #[tokio::test]
    async fn test_curate_unknown_item_fails_whole_batch() {
        let db = test_db().await;
        let session = db.sessions().create(new_session("Winter Market")).await.unwrap();
        let a = seed_item(&db, "Tote").await;

        let err = db
            .sessions()
            .curate(&session.id, &[a, "ghost".to_string()])
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            crate::error::StoreError::Domain(CoreError::ItemNotFound(_))
        ));

        // Rolled back: nothing curated
        assert!(db.sessions().curated_items(&session.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_decurate_absent_is_noop() {
        let db = test_db().await;
        let session = db.sessions().create(new_session("Winter Market")).await.unwrap();
        let a = seed_item(&db, "Tote").await;

        db.sessions().curate(&session.id, &[a.clone()]).await.unwrap();

        // Absent id: no error
        db.sessions().decurate(&session.id, "ghost").await.unwrap();

        db.sessions().decurate(&session.id, &a).await.unwrap();
        assert!(db.sessions().curated_items(&session.id).await.unwrap().is_empty());

        // Catalog item survives decuration
        assert!(db.items().get_by_id(&a).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_curate_unknown_session() {
        let db = test_db().await;
        let err = db
            .sessions()
            .curate("no-such-session", &["x".to_string()])
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            crate::error::StoreError::Domain(CoreError::SessionNotFound(_))
        ));
    }
}
