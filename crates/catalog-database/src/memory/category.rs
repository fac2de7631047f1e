//! In-memory category repository.

use async_trait::async_trait;
use uuid::Uuid;

use catalog_core::AppError;
use catalog_core::result::AppResult;
use catalog_entity::category::Category;

use super::table::{Table, UniqueIndex};
use crate::repositories::CategoryRepository;

/// Categories held in process memory.
#[derive(Debug)]
pub struct MemoryCategoryRepository {
    categories: Table<Category>,
    names: UniqueIndex,
}

impl MemoryCategoryRepository {
    /// Create an empty repository.
    pub fn new() -> Self {
        Self {
            categories: Table::new(),
            names: UniqueIndex::new(),
        }
    }
}

impl Default for MemoryCategoryRepository {
    fn default() -> Self {
        Self::new()
    }
}

fn name_taken(name: &str) -> AppError {
    AppError::conflict(format!("Category with name '{name}' already exists"))
}

#[async_trait]
impl CategoryRepository for MemoryCategoryRepository {
    async fn find_all(&self) -> AppResult<Vec<Category>> {
        Ok(self.categories.values())
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Category>> {
        Ok(self.categories.get(id))
    }

    async fn find_by_name(&self, name: &str) -> AppResult<Option<Category>> {
        Ok(self.names.lookup(name).and_then(|id| self.categories.get(id)))
    }

    async fn insert(&self, category: &Category) -> AppResult<Category> {
        self.names
            .claim(&category.name, category.id, || name_taken(&category.name))?;
        self.categories
            .insert(category.id, category.clone())
            .inspect_err(|_| self.names.release(&category.name, category.id))
    }

    async fn update(&self, category: &Category) -> AppResult<Category> {
        let existing = self
            .categories
            .get(category.id)
            .ok_or_else(|| AppError::not_found(format!("Category {} not found", category.id)))?;

        self.names
            .claim(&category.name, category.id, || name_taken(&category.name))?;
        if existing.name != category.name {
            self.names.release(&existing.name, category.id);
        }

        self.categories
            .replace(category.id, category.clone())
            .ok_or_else(|| AppError::not_found(format!("Category {} not found", category.id)))
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        match self.categories.remove(id) {
            Some(removed) => {
                self.names.release(&removed.name, id);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn count_children(&self, id: Uuid) -> AppResult<u64> {
        Ok(self.categories.filter(|c| c.parent_id == Some(id)).len() as u64)
    }
}
