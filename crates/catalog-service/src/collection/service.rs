//! Collection CRUD and membership.
//!
//! Each write touches two documents: the collection, then its member
//! products' discounts. The collection is written first; if the product
//! step fails the collection write is undone and the product error is
//! returned.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{error, info};
use uuid::Uuid;

use catalog_core::error::AppError;
use catalog_database::repositories::{CollectionRepository, ProductRepository};
use catalog_entity::collection::{Collection, CreateCollection, UpdateCollection};
use catalog_entity::product::Product;

use super::propagator::DiscountPropagator;
use crate::context::RequestContext;
use crate::product::ProductSummary;

/// A collection with its member products resolved.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionView {
    /// Collection identifier.
    pub id: Uuid,
    /// Name.
    pub name: String,
    /// Description.
    pub description: String,
    /// Members in collection order. Deleted products are omitted.
    pub products: Vec<ProductSummary>,
    /// Enabled flag.
    pub is_active: bool,
    /// Start of the window.
    pub start_date: DateTime<Utc>,
    /// End of the window.
    pub end_date: Option<DateTime<Utc>>,
    /// Shared discount.
    pub discount_percentage: f64,
    /// Banner image.
    pub image_url: Option<String>,
    /// Whether the collection is running right now.
    pub is_running: bool,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last update time.
    pub updated_at: DateTime<Utc>,
}

impl CollectionView {
    fn build(collection: Collection, products: &HashMap<Uuid, Product>, now: DateTime<Utc>) -> Self {
        Self {
            is_running: collection.is_running(now),
            products: collection
                .product_ids
                .iter()
                .filter_map(|id| products.get(id))
                .map(ProductSummary::from)
                .collect(),
            id: collection.id,
            name: collection.name,
            description: collection.description,
            is_active: collection.is_active,
            start_date: collection.start_date,
            end_date: collection.end_date,
            discount_percentage: collection.discount_percentage,
            image_url: collection.image_url,
            created_at: collection.created_at,
            updated_at: collection.updated_at,
        }
    }
}

/// Manages collections and keeps member discounts in sync.
#[derive(Debug, Clone)]
pub struct CollectionService {
    collections: Arc<dyn CollectionRepository>,
    products: Arc<dyn ProductRepository>,
    propagator: DiscountPropagator,
}

impl CollectionService {
    /// Creates a new collection service.
    pub fn new(
        collections: Arc<dyn CollectionRepository>,
        products: Arc<dyn ProductRepository>,
    ) -> Self {
        Self {
            propagator: DiscountPropagator::new(products.clone()),
            collections,
            products,
        }
    }

    /// Every collection, newest first.
    pub async fn list(&self) -> Result<Vec<CollectionView>, AppError> {
        let collections = self.collections.find_all().await?;
        self.views(collections).await
    }

    /// Collections that are enabled and inside their date window.
    pub async fn list_active(&self) -> Result<Vec<CollectionView>, AppError> {
        let collections = self.collections.find_running(Utc::now()).await?;
        self.views(collections).await
    }

    /// One collection with its products.
    pub async fn get(&self, id: Uuid) -> Result<CollectionView, AppError> {
        let collection = self.find(id).await?;
        self.view(collection).await
    }

    /// Create a collection and stamp its discount on the members.
    pub async fn create(
        &self,
        ctx: &RequestContext,
        data: CreateCollection,
    ) -> Result<CollectionView, AppError> {
        ctx.require_admin()?;
        self.ensure_name_free(&data.name, None).await?;

        let collection = Collection::new(data);
        check_window(&collection)?;
        self.require_products(&collection.product_ids).await?;

        let collection = self.collections.insert(&collection).await?;
        if let Err(e) = self.propagator.apply(&collection).await {
            self.compensate(collection.id, self.collections.delete(collection.id).await.map(|_| ()));
            return Err(e);
        }

        info!(
            user_id = %ctx.user_id,
            collection_id = %collection.id,
            products = collection.product_ids.len(),
            discount = collection.discount_percentage,
            "Collection created"
        );

        self.view(collection).await
    }

    /// Apply a partial update and resync member discounts.
    pub async fn update(
        &self,
        ctx: &RequestContext,
        id: Uuid,
        changes: UpdateCollection,
    ) -> Result<CollectionView, AppError> {
        ctx.require_admin()?;
        let before = self.find(id).await?;

        if let Some(name) = changes.name.as_deref() {
            if name != before.name {
                self.ensure_name_free(name, Some(id)).await?;
            }
        }

        let mut after = before.clone();
        after.apply_update(changes);
        check_window(&after)?;
        let added: Vec<Uuid> = after
            .product_ids
            .iter()
            .copied()
            .filter(|p| !before.contains(*p))
            .collect();
        self.require_products(&added).await?;

        let after = self.collections.update(&after).await?;
        if let Err(e) = self.propagator.sync(&before, &after).await {
            let undo = async {
                self.collections.update(&before).await?;
                self.propagator.sync(&after, &before).await
            };
            self.compensate(id, undo.await);
            return Err(e);
        }

        info!(user_id = %ctx.user_id, collection_id = %id, "Collection updated");
        self.view(after).await
    }

    /// Delete a collection and clear the discounts it owns.
    pub async fn delete(&self, ctx: &RequestContext, id: Uuid) -> Result<(), AppError> {
        ctx.require_admin()?;
        let collection = self.find(id).await?;

        if !self.collections.delete(id).await? {
            return Err(AppError::not_found("Collection not found"));
        }
        if let Err(e) = self.propagator.clear(id, &collection.product_ids).await {
            self.compensate(id, self.collections.insert(&collection).await.map(|_| ()));
            return Err(e);
        }

        info!(user_id = %ctx.user_id, collection_id = %id, "Collection deleted");
        Ok(())
    }

    /// Append a product and stamp the collection discount on it.
    pub async fn add_product(
        &self,
        ctx: &RequestContext,
        id: Uuid,
        product_id: Uuid,
    ) -> Result<CollectionView, AppError> {
        ctx.require_admin()?;
        let before = self.find(id).await?;
        if self.products.find_by_id(product_id).await?.is_none() {
            return Err(AppError::not_found("Product not found"));
        }
        if before.contains(product_id) {
            return Err(AppError::conflict("Product already in collection"));
        }

        let mut after = before.clone();
        after.product_ids.push(product_id);
        after.updated_at = Utc::now();

        let after = self.collections.update(&after).await?;
        if let Err(e) = self.propagator.apply_to(&after, &[product_id]).await {
            self.compensate(id, self.collections.update(&before).await.map(|_| ()));
            return Err(e);
        }

        info!(
            user_id = %ctx.user_id,
            collection_id = %id,
            product_id = %product_id,
            "Product added to collection"
        );
        self.view(after).await
    }

    /// Drop a product and clear the discount this collection gave it.
    ///
    /// Removing a product that is not a member succeeds without changes.
    pub async fn remove_product(
        &self,
        ctx: &RequestContext,
        id: Uuid,
        product_id: Uuid,
    ) -> Result<CollectionView, AppError> {
        ctx.require_admin()?;
        let before = self.find(id).await?;
        if !before.contains(product_id) {
            return self.view(before).await;
        }

        let mut after = before.clone();
        after.product_ids.retain(|p| *p != product_id);
        after.updated_at = Utc::now();

        let after = self.collections.update(&after).await?;
        if let Err(e) = self.propagator.clear(id, &[product_id]).await {
            self.compensate(id, self.collections.update(&before).await.map(|_| ()));
            return Err(e);
        }

        info!(
            user_id = %ctx.user_id,
            collection_id = %id,
            product_id = %product_id,
            "Product removed from collection"
        );
        self.view(after).await
    }

    async fn find(&self, id: Uuid) -> Result<Collection, AppError> {
        self.collections
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("Collection not found"))
    }

    async fn ensure_name_free(&self, name: &str, current: Option<Uuid>) -> Result<(), AppError> {
        match self.collections.find_by_name(name).await? {
            Some(existing) if Some(existing.id) != current => Err(AppError::conflict(
                "Collection with this name already exists",
            )),
            _ => Ok(()),
        }
    }

    async fn require_products(&self, ids: &[Uuid]) -> Result<(), AppError> {
        if ids.is_empty() {
            return Ok(());
        }
        let found = self.products.find_by_ids(ids).await?;
        match ids.iter().find(|id| !found.iter().any(|p| p.id == **id)) {
            Some(missing) => Err(AppError::not_found(format!("Product not found: {missing}"))),
            None => Ok(()),
        }
    }

    /// Log the outcome of an undo step. The caller still returns the
    /// error that triggered it.
    fn compensate(&self, collection_id: Uuid, outcome: Result<(), AppError>) {
        match outcome {
            Ok(()) => info!(collection_id = %collection_id, "Rolled back collection write"),
            Err(e) => error!(
                collection_id = %collection_id,
                error = %e,
                "Failed to roll back collection write"
            ),
        }
    }

    async fn view(&self, collection: Collection) -> Result<CollectionView, AppError> {
        let products = self.load_products(&collection.product_ids).await?;
        Ok(CollectionView::build(collection, &products, Utc::now()))
    }

    async fn views(&self, collections: Vec<Collection>) -> Result<Vec<CollectionView>, AppError> {
        let mut ids: Vec<Uuid> = collections
            .iter()
            .flat_map(|c| c.product_ids.iter().copied())
            .collect();
        ids.sort_unstable();
        ids.dedup();

        let products = self.load_products(&ids).await?;
        let now = Utc::now();
        Ok(collections
            .into_iter()
            .map(|c| CollectionView::build(c, &products, now))
            .collect())
    }

    async fn load_products(&self, ids: &[Uuid]) -> Result<HashMap<Uuid, Product>, AppError> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        Ok(self
            .products
            .find_by_ids(ids)
            .await?
            .into_iter()
            .map(|p| (p.id, p))
            .collect())
    }
}

fn check_window(collection: &Collection) -> Result<(), AppError> {
    match collection.end_date {
        Some(end) if end <= collection.start_date => {
            Err(AppError::validation("End date must be after start date"))
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use catalog_core::error::ErrorKind;
    use catalog_core::result::AppResult;
    use catalog_core::types::PageResponse;
    use catalog_database::Store;
    use catalog_database::repositories::DiscountOverwrite;
    use catalog_entity::product::query::LowStockQuery;
    use catalog_entity::product::{CreateProduct, ProductQuery, ProductStats};
    use catalog_entity::user::UserRole;
    use chrono::Duration;

    /// Product repository whose discount writes fail on demand.
    #[derive(Debug)]
    struct FailingDiscounts {
        inner: Arc<dyn ProductRepository>,
        stamps: bool,
        clears: bool,
    }

    impl FailingDiscounts {
        fn all(inner: Arc<dyn ProductRepository>) -> Arc<dyn ProductRepository> {
            Arc::new(Self { inner, stamps: true, clears: true })
        }

        fn stamps(inner: Arc<dyn ProductRepository>) -> Arc<dyn ProductRepository> {
            Arc::new(Self { inner, stamps: true, clears: false })
        }

        fn clears(inner: Arc<dyn ProductRepository>) -> Arc<dyn ProductRepository> {
            Arc::new(Self { inner, stamps: false, clears: true })
        }
    }

    #[async_trait]
    impl ProductRepository for FailingDiscounts {
        async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Product>> {
            self.inner.find_by_id(id).await
        }
        async fn find_by_ids(&self, ids: &[Uuid]) -> AppResult<Vec<Product>> {
            self.inner.find_by_ids(ids).await
        }
        async fn list(&self, query: &ProductQuery) -> AppResult<PageResponse<Product>> {
            self.inner.list(query).await
        }
        async fn list_low_stock(&self, query: &LowStockQuery) -> AppResult<PageResponse<Product>> {
            self.inner.list_low_stock(query).await
        }
        async fn insert(&self, product: &Product) -> AppResult<Product> {
            self.inner.insert(product).await
        }
        async fn update(&self, product: &Product) -> AppResult<Product> {
            self.inner.update(product).await
        }
        async fn delete(&self, id: Uuid) -> AppResult<bool> {
            self.inner.delete(id).await
        }
        async fn sku_exists(&self, sku: &str, exclude: Option<Uuid>) -> AppResult<bool> {
            self.inner.sku_exists(sku, exclude).await
        }
        async fn count_by_category(&self, category_id: Uuid) -> AppResult<u64> {
            self.inner.count_by_category(category_id).await
        }
        async fn stats(&self) -> AppResult<ProductStats> {
            self.inner.stats().await
        }
        async fn stamp_discount(
            &self,
            product_ids: &[Uuid],
            collection_id: Uuid,
            percentage: f64,
        ) -> AppResult<Vec<DiscountOverwrite>> {
            if self.stamps {
                return Err(AppError::database("connection reset"));
            }
            self.inner.stamp_discount(product_ids, collection_id, percentage).await
        }
        async fn clear_discount(&self, product_ids: &[Uuid], collection_id: Uuid) -> AppResult<u64> {
            if self.clears {
                return Err(AppError::database("connection reset"));
            }
            self.inner.clear_discount(product_ids, collection_id).await
        }
    }

    fn admin() -> RequestContext {
        RequestContext::new(Uuid::new_v4(), UserRole::Admin, "admin@example.com")
    }

    async fn product(store: &Store, name: &str) -> Product {
        store
            .products
            .insert(&Product::new(CreateProduct {
                name: name.into(),
                description: String::new(),
                category_id: Uuid::new_v4(),
                base_price: 40.0,
                variants: vec![],
                images: vec![],
                tags: vec![],
                is_active: true,
            }))
            .await
            .unwrap()
    }

    fn create(name: &str, ids: Vec<Uuid>, discount: f64) -> CreateCollection {
        CreateCollection {
            name: name.into(),
            description: format!("{name} picks"),
            product_ids: ids,
            is_active: true,
            discount_percentage: discount,
            ..Default::default()
        }
    }

    async fn discount_of(store: &Store, id: Uuid) -> f64 {
        store.products.find_by_id(id).await.unwrap().unwrap().discount_percentage
    }

    #[tokio::test]
    async fn test_discount_mirrored_and_reset_on_removal() {
        let store = Store::memory();
        let svc = CollectionService::new(store.collections.clone(), store.products.clone());
        let ctx = admin();
        let p = product(&store, "Tee").await;

        let c = svc.create(&ctx, create("Summer", vec![], 20.0)).await.unwrap();
        let view = svc.add_product(&ctx, c.id, p.id).await.unwrap();
        assert_eq!(view.products.len(), 1);
        assert_eq!(discount_of(&store, p.id).await, 20.0);

        let err = svc.add_product(&ctx, c.id, p.id).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Conflict);

        let view = svc.remove_product(&ctx, c.id, p.id).await.unwrap();
        assert!(view.products.is_empty());
        assert_eq!(discount_of(&store, p.id).await, 0.0);

        // Not a member any more: still succeeds.
        svc.remove_product(&ctx, c.id, p.id).await.unwrap();
    }

    #[tokio::test]
    async fn test_add_missing_product_is_not_found() {
        let store = Store::memory();
        let svc = CollectionService::new(store.collections.clone(), store.products.clone());
        let ctx = admin();
        let c = svc.create(&ctx, create("Summer", vec![], 10.0)).await.unwrap();
        let err = svc.add_product(&ctx, c.id, Uuid::new_v4()).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_update_discount_to_zero_clears_members() {
        let store = Store::memory();
        let svc = CollectionService::new(store.collections.clone(), store.products.clone());
        let ctx = admin();
        let p = product(&store, "Tee").await;
        let c = svc.create(&ctx, create("Sale", vec![p.id], 30.0)).await.unwrap();
        assert_eq!(discount_of(&store, p.id).await, 30.0);

        svc.update(
            &ctx,
            c.id,
            UpdateCollection {
                discount_percentage: Some(0.0),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(discount_of(&store, p.id).await, 0.0);
    }

    #[tokio::test]
    async fn test_delete_clears_owned_discounts() {
        let store = Store::memory();
        let svc = CollectionService::new(store.collections.clone(), store.products.clone());
        let ctx = admin();
        let p = product(&store, "Tee").await;
        let c = svc.create(&ctx, create("Sale", vec![p.id], 30.0)).await.unwrap();

        svc.delete(&ctx, c.id).await.unwrap();
        assert_eq!(discount_of(&store, p.id).await, 0.0);
        assert_eq!(svc.get(c.id).await.unwrap_err().kind, ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_name_unique_and_window_checked() {
        let store = Store::memory();
        let svc = CollectionService::new(store.collections.clone(), store.products.clone());
        let ctx = admin();
        svc.create(&ctx, create("Sale", vec![], 0.0)).await.unwrap();
        let err = svc.create(&ctx, create("Sale", vec![], 0.0)).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Conflict);

        let now = Utc::now();
        let err = svc
            .create(
                &ctx,
                CreateCollection {
                    start_date: Some(now),
                    end_date: Some(now - Duration::days(1)),
                    ..create("Backwards", vec![], 0.0)
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
    }

    #[tokio::test]
    async fn test_list_active_filters_window() {
        let store = Store::memory();
        let svc = CollectionService::new(store.collections.clone(), store.products.clone());
        let ctx = admin();
        let now = Utc::now();
        svc.create(&ctx, create("Running", vec![], 0.0)).await.unwrap();
        svc.create(
            &ctx,
            CreateCollection {
                start_date: Some(now + Duration::days(3)),
                ..create("Upcoming", vec![], 0.0)
            },
        )
        .await
        .unwrap();
        svc.create(
            &ctx,
            CreateCollection {
                is_active: false,
                ..create("Disabled", vec![], 0.0)
            },
        )
        .await
        .unwrap();

        let active = svc.list_active().await.unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].name, "Running");
        assert_eq!(svc.list().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_create_rolled_back_when_discount_write_fails() {
        let store = Store::memory();
        let p = product(&store, "Tee").await;
        let failing = FailingDiscounts::all(store.products.clone());
        let svc = CollectionService::new(store.collections.clone(), failing);

        let err = svc
            .create(&admin(), create("Sale", vec![p.id], 20.0))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Database);
        assert!(store.collections.find_by_name("Sale").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_membership_rolled_back_when_discount_write_fails() {
        let store = Store::memory();
        let p = product(&store, "Tee").await;
        let healthy = CollectionService::new(store.collections.clone(), store.products.clone());
        let c = healthy.create(&admin(), create("Sale", vec![], 20.0)).await.unwrap();

        let failing = FailingDiscounts::all(store.products.clone());
        let svc = CollectionService::new(store.collections.clone(), failing);
        svc.add_product(&admin(), c.id, p.id).await.unwrap_err();

        let stored = store.collections.find_by_id(c.id).await.unwrap().unwrap();
        assert!(stored.product_ids.is_empty());
    }

    #[tokio::test]
    async fn test_delete_rolled_back_when_discount_clear_fails() {
        let store = Store::memory();
        let p = product(&store, "Tee").await;
        let healthy = CollectionService::new(store.collections.clone(), store.products.clone());
        let c = healthy
            .create(&admin(), create("Sale", vec![p.id], 20.0))
            .await
            .unwrap();

        let failing = FailingDiscounts::all(store.products.clone());
        let svc = CollectionService::new(store.collections.clone(), failing);
        svc.delete(&admin(), c.id).await.unwrap_err();

        let restored = store.collections.find_by_id(c.id).await.unwrap().unwrap();
        assert_eq!(restored.product_ids, vec![p.id]);
    }

    #[tokio::test]
    async fn test_failed_update_keeps_dropped_member_discount() {
        let store = Store::memory();
        let p1 = product(&store, "Tee").await;
        let p2 = product(&store, "Polo").await;
        let healthy = CollectionService::new(store.collections.clone(), store.products.clone());
        let c = healthy
            .create(&admin(), create("Sale", vec![p1.id, p2.id], 20.0))
            .await
            .unwrap();

        let svc = CollectionService::new(
            store.collections.clone(),
            FailingDiscounts::stamps(store.products.clone()),
        );
        let changes = UpdateCollection {
            product_ids: Some(vec![p2.id]),
            discount_percentage: Some(30.0),
            ..Default::default()
        };
        let err = svc.update(&admin(), c.id, changes).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Database);

        let stored = store.collections.find_by_id(c.id).await.unwrap().unwrap();
        assert_eq!(stored.product_ids, vec![p1.id, p2.id]);
        assert_eq!(stored.discount_percentage, 20.0);
        assert_eq!(discount_of(&store, p1.id).await, 20.0);
        assert_eq!(discount_of(&store, p2.id).await, 20.0);
    }

    #[tokio::test]
    async fn test_failed_update_restamps_previous_discount() {
        let store = Store::memory();
        let p1 = product(&store, "Tee").await;
        let p2 = product(&store, "Polo").await;
        let healthy = CollectionService::new(store.collections.clone(), store.products.clone());
        let c = healthy
            .create(&admin(), create("Sale", vec![p1.id, p2.id], 20.0))
            .await
            .unwrap();

        // The new discount lands on p2, then clearing p1 fails.
        let svc = CollectionService::new(
            store.collections.clone(),
            FailingDiscounts::clears(store.products.clone()),
        );
        let changes = UpdateCollection {
            product_ids: Some(vec![p2.id]),
            discount_percentage: Some(30.0),
            ..Default::default()
        };
        svc.update(&admin(), c.id, changes).await.unwrap_err();

        let stored = store.collections.find_by_id(c.id).await.unwrap().unwrap();
        assert_eq!(stored.discount_percentage, 20.0);
        assert_eq!(discount_of(&store, p1.id).await, 20.0);
        assert_eq!(discount_of(&store, p2.id).await, 20.0);
    }
}
