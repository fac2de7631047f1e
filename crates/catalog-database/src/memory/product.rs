//! In-memory product repository.

use async_trait::async_trait;
use uuid::Uuid;

use catalog_core::AppError;
use catalog_core::result::AppResult;
use catalog_core::types::{PageRequest, PageResponse};
use catalog_entity::product::query::LowStockQuery;
use catalog_entity::product::{Product, ProductQuery, ProductStats};

use super::table::{Table, UniqueIndex};
use crate::repositories::{DiscountOverwrite, ProductRepository};

/// Products held in process memory.
#[derive(Debug)]
pub struct MemoryProductRepository {
    products: Table<Product>,
    skus: UniqueIndex,
}

impl MemoryProductRepository {
    /// Create an empty repository.
    pub fn new() -> Self {
        Self {
            products: Table::new(),
            skus: UniqueIndex::new(),
        }
    }

    /// Claim every variant SKU for the product, undoing partial claims on
    /// conflict.
    fn claim_skus(&self, product: &Product, held: &[&str]) -> AppResult<()> {
        let mut claimed = Vec::new();
        for variant in &product.variants {
            let sku = variant.sku.as_str();
            if let Err(e) = self.skus.claim(sku, product.id, || sku_taken(sku)) {
                for sku in claimed {
                    self.skus.release(sku, product.id);
                }
                return Err(e);
            }
            if !held.contains(&sku) {
                claimed.push(sku);
            }
        }
        Ok(())
    }

    fn release_skus<'a>(&self, owner: Uuid, skus: impl IntoIterator<Item = &'a str>) {
        for sku in skus {
            self.skus.release(sku, owner);
        }
    }
}

fn sku_taken(sku: &str) -> AppError {
    AppError::conflict(format!("SKU '{sku}' already exists"))
}

fn skus(product: &Product) -> Vec<&str> {
    product.variants.iter().map(|v| v.sku.as_str()).collect()
}

impl Default for MemoryProductRepository {
    fn default() -> Self {
        Self::new()
    }
}

fn paginate(items: Vec<Product>, page: PageRequest) -> PageResponse<Product> {
    let total = items.len() as u64;
    let window = items
        .into_iter()
        .skip(usize::try_from(page.offset()).unwrap_or(usize::MAX))
        .take(page.limit as usize)
        .collect();
    PageResponse::new(window, page, total)
}

#[async_trait]
impl ProductRepository for MemoryProductRepository {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Product>> {
        Ok(self.products.get(id))
    }

    async fn find_by_ids(&self, ids: &[Uuid]) -> AppResult<Vec<Product>> {
        Ok(ids.iter().filter_map(|id| self.products.get(*id)).collect())
    }

    async fn list(&self, query: &ProductQuery) -> AppResult<PageResponse<Product>> {
        let mut matched = self.products.filter(|p| query.matches(p));
        matched.sort_by(|a, b| query.compare(a, b));
        Ok(paginate(matched, query.page))
    }

    async fn list_low_stock(&self, query: &LowStockQuery) -> AppResult<PageResponse<Product>> {
        let mut matched = self.products.filter(|p| query.matches(p));
        matched.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        Ok(paginate(matched, query.page))
    }

    async fn insert(&self, product: &Product) -> AppResult<Product> {
        self.claim_skus(product, &[])?;
        self.products
            .insert(product.id, product.clone())
            .inspect_err(|_| self.release_skus(product.id, skus(product)))
    }

    async fn update(&self, product: &Product) -> AppResult<Product> {
        let existing = self
            .products
            .get(product.id)
            .ok_or_else(|| AppError::not_found(format!("Product {} not found", product.id)))?;
        let held = skus(&existing);
        let kept = skus(product);

        self.claim_skus(product, &held)?;
        self.release_skus(product.id, held.into_iter().filter(|sku| !kept.contains(sku)));

        self.products
            .replace(product.id, product.clone())
            .ok_or_else(|| AppError::not_found(format!("Product {} not found", product.id)))
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        match self.products.remove(id) {
            Some(removed) => {
                self.release_skus(id, skus(&removed));
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn sku_exists(&self, sku: &str, exclude: Option<Uuid>) -> AppResult<bool> {
        Ok(self.skus.lookup(sku).is_some_and(|owner| Some(owner) != exclude))
    }

    async fn count_by_category(&self, category_id: Uuid) -> AppResult<u64> {
        Ok(self.products.filter(|p| p.category_id == category_id).len() as u64)
    }

    async fn stats(&self) -> AppResult<ProductStats> {
        Ok(ProductStats::compute(&self.products.values()))
    }

    async fn stamp_discount(
        &self,
        product_ids: &[Uuid],
        collection_id: Uuid,
        percentage: f64,
    ) -> AppResult<Vec<DiscountOverwrite>> {
        let mut overwrites = Vec::new();
        self.products.update_where(product_ids, |product| {
            if let Some(previous) = product.stamp_discount(collection_id, percentage) {
                overwrites.push(DiscountOverwrite {
                    product_id: product.id,
                    previous_collection_id: previous,
                });
            }
            true
        });
        Ok(overwrites)
    }

    async fn clear_discount(&self, product_ids: &[Uuid], collection_id: Uuid) -> AppResult<u64> {
        Ok(self
            .products
            .update_where(product_ids, |product| product.clear_discount_from(collection_id)))
    }
}
