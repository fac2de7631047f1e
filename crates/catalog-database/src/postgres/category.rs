//! PostgreSQL category repository.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use catalog_core::error::{AppError, ErrorKind};
use catalog_core::result::AppResult;
use catalog_entity::category::Category;

use super::map_unique;
use crate::repositories::CategoryRepository;

const NAME_CONSTRAINT: &str = "categories_name_key";

/// Repository for categories stored in PostgreSQL.
#[derive(Debug, Clone)]
pub struct PgCategoryRepository {
    pool: PgPool,
}

impl PgCategoryRepository {
    /// Create a new category repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CategoryRepository for PgCategoryRepository {
    async fn find_all(&self) -> AppResult<Vec<Category>> {
        sqlx::query_as::<_, Category>("SELECT * FROM categories ORDER BY created_at ASC, id ASC")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list categories", e))
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Category>> {
        sqlx::query_as::<_, Category>("SELECT * FROM categories WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find category by id", e)
            })
    }

    async fn find_by_name(&self, name: &str) -> AppResult<Option<Category>> {
        sqlx::query_as::<_, Category>("SELECT * FROM categories WHERE name = $1")
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find category by name", e)
            })
    }

    async fn insert(&self, category: &Category) -> AppResult<Category> {
        sqlx::query_as::<_, Category>(
            "INSERT INTO categories (id, name, description, parent_id, is_active, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING *",
        )
        .bind(category.id)
        .bind(&category.name)
        .bind(&category.description)
        .bind(category.parent_id)
        .bind(category.is_active)
        .bind(category.created_at)
        .bind(category.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            map_unique(
                e,
                NAME_CONSTRAINT,
                &format!("Category with name '{}' already exists", category.name),
                "Failed to insert category",
            )
        })
    }

    async fn update(&self, category: &Category) -> AppResult<Category> {
        sqlx::query_as::<_, Category>(
            "UPDATE categories SET name = $2, description = $3, parent_id = $4, is_active = $5, \
             updated_at = $6 WHERE id = $1 RETURNING *",
        )
        .bind(category.id)
        .bind(&category.name)
        .bind(&category.description)
        .bind(category.parent_id)
        .bind(category.is_active)
        .bind(category.updated_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            map_unique(
                e,
                NAME_CONSTRAINT,
                &format!("Category with name '{}' already exists", category.name),
                "Failed to update category",
            )
        })?
        .ok_or_else(|| AppError::not_found(format!("Category {} not found", category.id)))
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map(|r| r.rows_affected() > 0)
            .map_err(|e| match e {
                sqlx::Error::Database(ref db_err) if db_err.is_foreign_key_violation() => {
                    AppError::conflict("Category is still referenced")
                }
                other => AppError::with_source(ErrorKind::Database, "Failed to delete category", other),
            })
    }

    async fn count_children(&self, id: Uuid) -> AppResult<u64> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM categories WHERE parent_id = $1")
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .map(|n| n as u64)
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to count subcategories", e)
            })
    }
}
