//! Repository interfaces implemented by every store provider.
//!
//! Each repository persists whole documents: updates replace the stored
//! document with the one passed in. Uniqueness violations surface as
//! `ErrorKind::Conflict`, missing rows on update as `ErrorKind::NotFound`.

use std::fmt::Debug;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use catalog_core::result::AppResult;
use catalog_core::types::PageResponse;
use catalog_entity::category::Category;
use catalog_entity::collection::Collection;
use catalog_entity::product::query::LowStockQuery;
use catalog_entity::product::{Product, ProductQuery, ProductStats};
use catalog_entity::user::User;

/// A product whose discount was taken over from another collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiscountOverwrite {
    /// The product that changed hands.
    pub product_id: Uuid,
    /// The collection that owned the discount before.
    pub previous_collection_id: Uuid,
}

/// Product persistence.
#[async_trait]
pub trait ProductRepository: Send + Sync + Debug {
    /// Find a product by id.
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Product>>;

    /// Find every product whose id is in `ids`. Missing ids are skipped.
    async fn find_by_ids(&self, ids: &[Uuid]) -> AppResult<Vec<Product>>;

    /// Filter, sort and paginate.
    async fn list(&self, query: &ProductQuery) -> AppResult<PageResponse<Product>>;

    /// Products with any variant at or below the threshold, by name.
    async fn list_low_stock(&self, query: &LowStockQuery) -> AppResult<PageResponse<Product>>;

    /// Insert a new product.
    async fn insert(&self, product: &Product) -> AppResult<Product>;

    /// Replace a stored product.
    async fn update(&self, product: &Product) -> AppResult<Product>;

    /// Delete a product. Returns whether it existed.
    async fn delete(&self, id: Uuid) -> AppResult<bool>;

    /// Whether any product other than `exclude` has a variant with this SKU.
    async fn sku_exists(&self, sku: &str, exclude: Option<Uuid>) -> AppResult<bool>;

    /// Number of products in a category.
    async fn count_by_category(&self, category_id: Uuid) -> AppResult<u64>;

    /// Catalog-wide aggregates.
    async fn stats(&self) -> AppResult<ProductStats>;

    /// Set `percentage` as the collection-owned discount on every listed
    /// product. Reports products previously owned by another collection.
    async fn stamp_discount(
        &self,
        product_ids: &[Uuid],
        collection_id: Uuid,
        percentage: f64,
    ) -> AppResult<Vec<DiscountOverwrite>>;

    /// Zero the discount on listed products currently owned by
    /// `collection_id`. Returns the number of products changed.
    async fn clear_discount(&self, product_ids: &[Uuid], collection_id: Uuid) -> AppResult<u64>;
}

/// Category persistence.
#[async_trait]
pub trait CategoryRepository: Send + Sync + Debug {
    /// Every category, oldest first.
    async fn find_all(&self) -> AppResult<Vec<Category>>;

    /// Find a category by id.
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Category>>;

    /// Find a category by exact name.
    async fn find_by_name(&self, name: &str) -> AppResult<Option<Category>>;

    /// Insert a new category.
    async fn insert(&self, category: &Category) -> AppResult<Category>;

    /// Replace a stored category.
    async fn update(&self, category: &Category) -> AppResult<Category>;

    /// Delete a category. Returns whether it existed.
    async fn delete(&self, id: Uuid) -> AppResult<bool>;

    /// Number of direct children.
    async fn count_children(&self, id: Uuid) -> AppResult<u64>;
}

/// Collection persistence.
#[async_trait]
pub trait CollectionRepository: Send + Sync + Debug {
    /// Every collection, newest first.
    async fn find_all(&self) -> AppResult<Vec<Collection>>;

    /// Collections enabled and inside their date window at `now`, newest first.
    async fn find_running(&self, now: DateTime<Utc>) -> AppResult<Vec<Collection>>;

    /// Find a collection by id.
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Collection>>;

    /// Find a collection by exact name.
    async fn find_by_name(&self, name: &str) -> AppResult<Option<Collection>>;

    /// Insert a new collection.
    async fn insert(&self, collection: &Collection) -> AppResult<Collection>;

    /// Replace a stored collection.
    async fn update(&self, collection: &Collection) -> AppResult<Collection>;

    /// Delete a collection. Returns whether it existed.
    async fn delete(&self, id: Uuid) -> AppResult<bool>;

    /// Drop a product from every collection that lists it.
    async fn remove_product_everywhere(&self, product_id: Uuid) -> AppResult<u64>;
}

/// User persistence.
#[async_trait]
pub trait UserRepository: Send + Sync + Debug {
    /// Find a user by id.
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>>;

    /// Find a user by email (case-insensitive).
    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>>;

    /// Insert a new user.
    async fn insert(&self, user: &User) -> AppResult<User>;

    /// Replace a stored user.
    async fn update(&self, user: &User) -> AppResult<User>;
}
