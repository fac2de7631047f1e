//! Store manager that dispatches to the configured provider.

use std::sync::Arc;

use tracing::info;

use catalog_core::config::{DatabaseConfig, DatabaseProvider};
use catalog_core::result::AppResult;

use crate::connection::DatabasePool;
use crate::memory::{
    MemoryCategoryRepository, MemoryCollectionRepository, MemoryProductRepository,
    MemoryUserRepository,
};
use crate::migration::run_migrations;
use crate::postgres::{
    PgCategoryRepository, PgCollectionRepository, PgProductRepository, PgUserRepository,
};
use crate::repositories::{
    CategoryRepository, CollectionRepository, ProductRepository, UserRepository,
};

/// The full set of repositories backed by one provider.
///
/// The provider is selected at construction time based on configuration.
#[derive(Debug, Clone)]
pub struct Store {
    /// Product repository.
    pub products: Arc<dyn ProductRepository>,
    /// Category repository.
    pub categories: Arc<dyn CategoryRepository>,
    /// Collection repository.
    pub collections: Arc<dyn CollectionRepository>,
    /// User repository.
    pub users: Arc<dyn UserRepository>,
    pool: Option<DatabasePool>,
}

impl Store {
    /// Open the store described by `config`.
    pub async fn connect(config: &DatabaseConfig) -> AppResult<Self> {
        match config.provider {
            DatabaseProvider::Postgres => {
                info!("Initializing PostgreSQL store provider");
                let pool = DatabasePool::connect(config).await?;
                if config.auto_migrate {
                    run_migrations(pool.pool()).await?;
                }
                Ok(Self::postgres(pool))
            }
            DatabaseProvider::Memory => {
                info!("Initializing in-memory store provider");
                Ok(Self::memory())
            }
        }
    }

    /// Repositories over an existing PostgreSQL pool.
    pub fn postgres(pool: DatabasePool) -> Self {
        let pg = pool.pool().clone();
        Self {
            products: Arc::new(PgProductRepository::new(pg.clone())),
            categories: Arc::new(PgCategoryRepository::new(pg.clone())),
            collections: Arc::new(PgCollectionRepository::new(pg.clone())),
            users: Arc::new(PgUserRepository::new(pg)),
            pool: Some(pool),
        }
    }

    /// Fresh, empty in-memory repositories.
    pub fn memory() -> Self {
        Self {
            products: Arc::new(MemoryProductRepository::new()),
            categories: Arc::new(MemoryCategoryRepository::new()),
            collections: Arc::new(MemoryCollectionRepository::new()),
            users: Arc::new(MemoryUserRepository::new()),
            pool: None,
        }
    }

    /// Name of the active provider.
    pub fn provider_name(&self) -> &'static str {
        if self.pool.is_some() { "postgres" } else { "memory" }
    }

    /// Whether the backing store is reachable.
    pub async fn health_check(&self) -> AppResult<bool> {
        match &self.pool {
            Some(pool) => pool.health_check().await,
            None => Ok(true),
        }
    }

    /// Release provider resources.
    pub async fn close(&self) {
        if let Some(pool) = &self.pool {
            pool.close().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_provider_from_config() {
        let config = DatabaseConfig {
            provider: DatabaseProvider::Memory,
            ..Default::default()
        };
        let store = Store::connect(&config).await.unwrap();
        assert_eq!(store.provider_name(), "memory");
        assert!(store.health_check().await.unwrap());
    }
}
