//! Application state shared across all handlers and middleware.

use std::sync::Arc;
use std::time::Instant;

use catalog_auth::{JwtDecoder, JwtEncoder, PasswordHasher, PasswordValidator};
use catalog_core::config::AppConfig;
use catalog_database::Store;
use catalog_service::{
    AuthService, CategoryService, CollectionService, ProductService, UserService,
};

/// Shared application state, cloned into every handler.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Loaded configuration.
    pub config: Arc<AppConfig>,
    /// Repositories for the configured provider.
    pub store: Store,
    /// Bearer token verifier.
    pub jwt_decoder: Arc<JwtDecoder>,
    /// Registration and login.
    pub auth_service: Arc<AuthService>,
    /// Profile management.
    pub user_service: Arc<UserService>,
    /// Products, inventory and statistics.
    pub product_service: Arc<ProductService>,
    /// Category hierarchy.
    pub category_service: Arc<CategoryService>,
    /// Collections and discounts.
    pub collection_service: Arc<CollectionService>,
    /// When the process started serving.
    pub started_at: Instant,
}

impl AppState {
    /// Wire every service over `store`.
    pub fn new(config: AppConfig, store: Store) -> Self {
        let auth_service = AuthService::new(
            store.users.clone(),
            PasswordHasher::new(),
            PasswordValidator::new(&config.auth),
            JwtEncoder::new(&config.auth),
        );
        let user_service = UserService::new(store.users.clone());
        let product_service = ProductService::new(
            store.products.clone(),
            store.categories.clone(),
            store.collections.clone(),
        );
        let category_service =
            CategoryService::new(store.categories.clone(), store.products.clone());
        let collection_service =
            CollectionService::new(store.collections.clone(), store.products.clone());

        Self {
            jwt_decoder: Arc::new(JwtDecoder::new(&config.auth)),
            auth_service: Arc::new(auth_service),
            user_service: Arc::new(user_service),
            product_service: Arc::new(product_service),
            category_service: Arc::new(category_service),
            collection_service: Arc::new(collection_service),
            config: Arc::new(config),
            store,
            started_at: Instant::now(),
        }
    }
}
