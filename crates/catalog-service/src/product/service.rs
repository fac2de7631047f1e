//! Product listing, CRUD, inventory and statistics.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use serde::Deserialize;
use tracing::{info, warn};
use uuid::Uuid;

use catalog_core::error::AppError;
use catalog_core::types::PageResponse;
use catalog_database::repositories::{CategoryRepository, CollectionRepository, ProductRepository};
use catalog_entity::product::query::LowStockQuery;
use catalog_entity::product::{
    CreateProduct, NewVariant, Product, ProductQuery, ProductStats, UpdateProduct, Variant,
};

use super::view::ProductView;
use crate::context::RequestContext;

/// Set one variant's stock level.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryUpdate {
    /// The product holding the variant.
    pub product_id: Uuid,
    /// The variant to update.
    pub variant_id: Uuid,
    /// New absolute stock level.
    pub quantity: i64,
}

/// Manages products and answers catalog queries.
#[derive(Debug, Clone)]
pub struct ProductService {
    products: Arc<dyn ProductRepository>,
    categories: Arc<dyn CategoryRepository>,
    collections: Arc<dyn CollectionRepository>,
}

impl ProductService {
    /// Creates a new product service.
    pub fn new(
        products: Arc<dyn ProductRepository>,
        categories: Arc<dyn CategoryRepository>,
        collections: Arc<dyn CollectionRepository>,
    ) -> Self {
        Self {
            products,
            categories,
            collections,
        }
    }

    /// Filter, sort and paginate products.
    pub async fn list(&self, query: &ProductQuery) -> Result<PageResponse<ProductView>, AppError> {
        if let (Some(min), Some(max)) = (query.min_price, query.max_price) {
            if min > max {
                return Err(AppError::validation(
                    "minPrice must not be greater than maxPrice",
                ));
            }
        }
        Ok(self.products.list(query).await?.map(ProductView::from))
    }

    /// Fetch one product.
    pub async fn get(&self, id: Uuid) -> Result<ProductView, AppError> {
        self.find(id).await.map(ProductView::from)
    }

    /// Create a product after checking its category and SKUs.
    pub async fn create(
        &self,
        ctx: &RequestContext,
        data: CreateProduct,
    ) -> Result<ProductView, AppError> {
        ctx.require_admin()?;
        self.require_category(data.category_id).await?;
        self.check_skus(&data.variants, None).await?;

        let product = self.products.insert(&Product::new(data)).await?;

        info!(
            user_id = %ctx.user_id,
            product_id = %product.id,
            variants = product.variants.len(),
            "Product created"
        );

        Ok(product.into())
    }

    /// Apply a partial update.
    pub async fn update(
        &self,
        ctx: &RequestContext,
        id: Uuid,
        changes: UpdateProduct,
    ) -> Result<ProductView, AppError> {
        ctx.require_admin()?;
        let mut product = self.find(id).await?;

        if let Some(category_id) = changes.category_id {
            if category_id != product.category_id {
                self.require_category(category_id).await?;
            }
        }
        if let Some(variants) = changes.variants.as_deref() {
            self.check_skus(variants, Some(id)).await?;
        }

        product.apply_update(changes);
        let product = self.products.update(&product).await?;

        info!(user_id = %ctx.user_id, product_id = %id, "Product updated");
        Ok(product.into())
    }

    /// Delete a product and drop it from every collection.
    pub async fn delete(&self, ctx: &RequestContext, id: Uuid) -> Result<(), AppError> {
        ctx.require_admin()?;
        if !self.products.delete(id).await? {
            return Err(AppError::not_found("Product not found"));
        }

        let detached = self.collections.remove_product_everywhere(id).await?;
        info!(
            user_id = %ctx.user_id,
            product_id = %id,
            collections = detached,
            "Product deleted"
        );
        Ok(())
    }

    /// Set the stock of one variant.
    pub async fn update_inventory(
        &self,
        ctx: &RequestContext,
        update: InventoryUpdate,
    ) -> Result<Variant, AppError> {
        ctx.require_admin()?;
        if update.quantity < 0 {
            return Err(AppError::validation("Quantity must not be negative"));
        }

        let mut product = self.find(update.product_id).await?;
        let variant = product
            .variant_mut(update.variant_id)
            .ok_or_else(|| AppError::not_found("Variant not found"))?;
        let previous = variant.stock;
        variant.stock = update.quantity;
        product.updated_at = chrono::Utc::now();

        let product = self.products.update(&product).await?;
        let variant = product
            .variant(update.variant_id)
            .cloned()
            .ok_or_else(|| AppError::internal("Variant missing after inventory update"))?;

        info!(
            user_id = %ctx.user_id,
            product_id = %update.product_id,
            variant_id = %update.variant_id,
            previous,
            stock = variant.stock,
            "Inventory updated"
        );
        Ok(variant)
    }

    /// Products with any variant at or below the threshold.
    pub async fn low_stock(
        &self,
        query: &LowStockQuery,
    ) -> Result<PageResponse<ProductView>, AppError> {
        if query.threshold < 0 {
            return Err(AppError::validation("Threshold must not be negative"));
        }
        Ok(self.products.list_low_stock(query).await?.map(ProductView::from))
    }

    /// Catalog aggregates with category names resolved.
    pub async fn stats(&self) -> Result<ProductStats, AppError> {
        let mut stats = self.products.stats().await?;

        if stats
            .category_distribution
            .iter()
            .any(|c| c.category_name.is_none())
        {
            let names: HashMap<Uuid, String> = self
                .categories
                .find_all()
                .await?
                .into_iter()
                .map(|c| (c.id, c.name))
                .collect();
            for entry in &mut stats.category_distribution {
                if entry.category_name.is_none() {
                    entry.category_name = names.get(&entry.category_id).cloned();
                }
            }
        }

        Ok(stats)
    }

    async fn find(&self, id: Uuid) -> Result<Product, AppError> {
        self.products
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("Product not found"))
    }

    async fn require_category(&self, category_id: Uuid) -> Result<(), AppError> {
        match self.categories.find_by_id(category_id).await? {
            Some(_) => Ok(()),
            None => Err(AppError::not_found("Category not found")),
        }
    }

    /// SKUs must be unique within the request and across other products.
    async fn check_skus(&self, variants: &[NewVariant], owner: Option<Uuid>) -> Result<(), AppError> {
        let mut seen = HashSet::new();
        for variant in variants {
            if !seen.insert(variant.sku.as_str()) {
                return Err(AppError::conflict(format!(
                    "Duplicate SKU '{}' in variants",
                    variant.sku
                )));
            }
        }
        for variant in variants {
            if self.products.sku_exists(&variant.sku, owner).await? {
                warn!(sku = %variant.sku, "Rejected duplicate SKU");
                return Err(AppError::conflict(format!(
                    "SKU '{}' already exists",
                    variant.sku
                )));
            }
        }
        Ok(())
    }
}
