//! PostgreSQL collection repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use catalog_core::error::{AppError, ErrorKind};
use catalog_core::result::AppResult;
use catalog_entity::collection::Collection;

use super::map_unique;
use crate::repositories::CollectionRepository;

const NAME_CONSTRAINT: &str = "collections_name_key";
const NAME_TAKEN: &str = "Collection with this name already exists";

/// Repository for collections stored in PostgreSQL.
#[derive(Debug, Clone)]
pub struct PgCollectionRepository {
    pool: PgPool,
}

impl PgCollectionRepository {
    /// Create a new collection repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CollectionRepository for PgCollectionRepository {
    async fn find_all(&self) -> AppResult<Vec<Collection>> {
        sqlx::query_as::<_, Collection>("SELECT * FROM collections ORDER BY created_at DESC, id ASC")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to list collections", e)
            })
    }

    async fn find_running(&self, now: DateTime<Utc>) -> AppResult<Vec<Collection>> {
        sqlx::query_as::<_, Collection>(
            "SELECT * FROM collections WHERE is_active AND start_date <= $1 \
             AND (end_date IS NULL OR end_date > $1) ORDER BY created_at DESC, id ASC",
        )
        .bind(now)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to list active collections", e)
        })
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Collection>> {
        sqlx::query_as::<_, Collection>("SELECT * FROM collections WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find collection by id", e)
            })
    }

    async fn find_by_name(&self, name: &str) -> AppResult<Option<Collection>> {
        sqlx::query_as::<_, Collection>("SELECT * FROM collections WHERE name = $1")
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find collection by name", e)
            })
    }

    async fn insert(&self, collection: &Collection) -> AppResult<Collection> {
        sqlx::query_as::<_, Collection>(
            "INSERT INTO collections (id, name, description, product_ids, is_active, start_date, \
             end_date, discount_percentage, image_url, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) RETURNING *",
        )
        .bind(collection.id)
        .bind(&collection.name)
        .bind(&collection.description)
        .bind(&collection.product_ids)
        .bind(collection.is_active)
        .bind(collection.start_date)
        .bind(collection.end_date)
        .bind(collection.discount_percentage)
        .bind(&collection.image_url)
        .bind(collection.created_at)
        .bind(collection.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_unique(e, NAME_CONSTRAINT, NAME_TAKEN, "Failed to insert collection"))
    }

    async fn update(&self, collection: &Collection) -> AppResult<Collection> {
        sqlx::query_as::<_, Collection>(
            "UPDATE collections SET name = $2, description = $3, product_ids = $4, is_active = $5, \
             start_date = $6, end_date = $7, discount_percentage = $8, image_url = $9, \
             updated_at = $10 WHERE id = $1 RETURNING *",
        )
        .bind(collection.id)
        .bind(&collection.name)
        .bind(&collection.description)
        .bind(&collection.product_ids)
        .bind(collection.is_active)
        .bind(collection.start_date)
        .bind(collection.end_date)
        .bind(collection.discount_percentage)
        .bind(&collection.image_url)
        .bind(collection.updated_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_unique(e, NAME_CONSTRAINT, NAME_TAKEN, "Failed to update collection"))?
        .ok_or_else(|| AppError::not_found(format!("Collection {} not found", collection.id)))
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        sqlx::query("DELETE FROM collections WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map(|r| r.rows_affected() > 0)
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to delete collection", e)
            })
    }

    async fn remove_product_everywhere(&self, product_id: Uuid) -> AppResult<u64> {
        sqlx::query(
            "UPDATE collections SET product_ids = array_remove(product_ids, $1), updated_at = NOW() \
             WHERE $1 = ANY(product_ids)",
        )
        .bind(product_id)
        .execute(&self.pool)
        .await
        .map(|r| r.rows_affected())
        .map_err(|e| {
            AppError::with_source(
                ErrorKind::Database,
                "Failed to remove product from collections",
                e,
            )
        })
    }
}
