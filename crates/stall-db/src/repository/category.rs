//! # Category Repository
//!
//! Organizational groupings for catalog items. Categories never participate
//! in stock or money math.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::StoreResult;
use stall_core::validation::validate_name;
use stall_core::InventoryCategory;

/// Repository for inventory category operations.
#[derive(Debug, Clone)]
pub struct CategoryRepository {
    pool: SqlitePool,
}

impl CategoryRepository {
    /// Creates a new CategoryRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CategoryRepository { pool }
    }

    /// Creates a category.
    pub async fn insert(&self, name: &str) -> StoreResult<InventoryCategory> {
        validate_name(name)?;

        let category = InventoryCategory {
            id: Uuid::new_v4().to_string(),
            name: name.trim().to_string(),
            created_at: Utc::now(),
        };

        debug!(id = %category.id, name = %category.name, "Inserting category");

        sqlx::query("INSERT INTO categories (id, name, created_at) VALUES (?1, ?2, ?3)")
            .bind(&category.id)
            .bind(&category.name)
            .bind(category.created_at)
            .execute(&self.pool)
            .await?;

        Ok(category)
    }

    /// Gets a category by ID.
    pub async fn get_by_id(&self, id: &str) -> StoreResult<Option<InventoryCategory>> {
        let category = sqlx::query_as::<_, InventoryCategory>(
            "SELECT id, name, created_at FROM categories WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(category)
    }

    /// Lists all categories sorted by name.
    pub async fn list(&self) -> StoreResult<Vec<InventoryCategory>> {
        let categories = sqlx::query_as::<_, InventoryCategory>(
            "SELECT id, name, created_at FROM categories ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(categories)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use crate::pool::{Database, DbConfig};

    #[tokio::test]
    async fn test_insert_list_get() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let prints = db.categories().insert("Prints").await.unwrap();
        db.categories().insert("Ceramics").await.unwrap();

        let all = db.categories().list().await.unwrap();
        assert_eq!(all.len(), 2);
        // Sorted by name
        assert_eq!(all[0].name, "Ceramics");

        let fetched = db.categories().get_by_id(&prints.id).await.unwrap().unwrap();
        assert_eq!(fetched.name, "Prints");
    }

    #[tokio::test]
    async fn test_insert_rejects_empty_name() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        assert!(db.categories().insert("   ").await.is_err());
    }
}
