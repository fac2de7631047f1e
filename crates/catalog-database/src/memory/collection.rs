//! In-memory collection repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use catalog_core::AppError;
use catalog_core::result::AppResult;
use catalog_entity::collection::Collection;

use super::table::{Table, UniqueIndex};
use crate::repositories::CollectionRepository;

/// Collections held in process memory.
#[derive(Debug)]
pub struct MemoryCollectionRepository {
    collections: Table<Collection>,
    names: UniqueIndex,
}

impl MemoryCollectionRepository {
    /// Create an empty repository.
    pub fn new() -> Self {
        Self {
            collections: Table::new(),
            names: UniqueIndex::new(),
        }
    }

    fn newest_first(mut items: Vec<Collection>) -> Vec<Collection> {
        items.reverse();
        items
    }
}

impl Default for MemoryCollectionRepository {
    fn default() -> Self {
        Self::new()
    }
}

fn name_taken() -> AppError {
    AppError::conflict("Collection with this name already exists")
}

#[async_trait]
impl CollectionRepository for MemoryCollectionRepository {
    async fn find_all(&self) -> AppResult<Vec<Collection>> {
        Ok(Self::newest_first(self.collections.values()))
    }

    async fn find_running(&self, now: DateTime<Utc>) -> AppResult<Vec<Collection>> {
        Ok(Self::newest_first(
            self.collections.filter(|c| c.is_running(now)),
        ))
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Collection>> {
        Ok(self.collections.get(id))
    }

    async fn find_by_name(&self, name: &str) -> AppResult<Option<Collection>> {
        Ok(self.names.lookup(name).and_then(|id| self.collections.get(id)))
    }

    async fn insert(&self, collection: &Collection) -> AppResult<Collection> {
        self.names
            .claim(&collection.name, collection.id, name_taken)?;
        self.collections
            .insert(collection.id, collection.clone())
            .inspect_err(|_| self.names.release(&collection.name, collection.id))
    }

    async fn update(&self, collection: &Collection) -> AppResult<Collection> {
        let existing = self.collections.get(collection.id).ok_or_else(|| {
            AppError::not_found(format!("Collection {} not found", collection.id))
        })?;

        self.names
            .claim(&collection.name, collection.id, name_taken)?;
        if existing.name != collection.name {
            self.names.release(&existing.name, collection.id);
        }

        self.collections
            .replace(collection.id, collection.clone())
            .ok_or_else(|| AppError::not_found(format!("Collection {} not found", collection.id)))
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        match self.collections.remove(id) {
            Some(removed) => {
                self.names.release(&removed.name, id);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn remove_product_everywhere(&self, product_id: Uuid) -> AppResult<u64> {
        Ok(self.collections.update_all(|collection| {
            let before = collection.product_ids.len();
            collection.product_ids.retain(|id| *id != product_id);
            let changed = collection.product_ids.len() != before;
            if changed {
                collection.updated_at = Utc::now();
            }
            changed
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog_entity::collection::CreateCollection;
    use chrono::Duration;

    fn collection(name: &str, products: Vec<Uuid>) -> Collection {
        Collection::new(CreateCollection {
            name: name.into(),
            description: "Picks".into(),
            product_ids: products,
            is_active: true,
            start_date: Some(Utc::now() - Duration::days(1)),
            ..Default::default()
        })
    }

    #[tokio::test]
    async fn test_running_excludes_expired() {
        let repo = MemoryCollectionRepository::new();
        let live = repo.insert(&collection("Live", vec![])).await.unwrap();
        let mut expired = collection("Expired", vec![]);
        expired.end_date = Some(Utc::now() - Duration::hours(1));
        repo.insert(&expired).await.unwrap();

        let running = repo.find_running(Utc::now()).await.unwrap();
        assert_eq!(running.len(), 1);
        assert_eq!(running[0].id, live.id);
    }

    #[tokio::test]
    async fn test_remove_product_everywhere() {
        let repo = MemoryCollectionRepository::new();
        let product = Uuid::new_v4();
        let other = Uuid::new_v4();
        let a = repo.insert(&collection("A", vec![product, other])).await.unwrap();
        repo.insert(&collection("B", vec![product])).await.unwrap();
        repo.insert(&collection("C", vec![other])).await.unwrap();

        assert_eq!(repo.remove_product_everywhere(product).await.unwrap(), 2);
        let a = repo.find_by_id(a.id).await.unwrap().unwrap();
        assert_eq!(a.product_ids, vec![other]);
    }
}
