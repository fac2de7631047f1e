//! Mirrors a collection's discount onto its member products.
//!
//! A product carries at most one collection discount, tagged with the
//! owning collection. Stamping takes ownership (last write wins). Clearing
//! only touches products this collection still owns.

use std::sync::Arc;

use tracing::{debug, warn};
use uuid::Uuid;

use catalog_core::error::AppError;
use catalog_database::repositories::ProductRepository;
use catalog_entity::collection::Collection;

/// Writes collection discounts onto products.
#[derive(Debug, Clone)]
pub struct DiscountPropagator {
    products: Arc<dyn ProductRepository>,
}

impl DiscountPropagator {
    /// Creates a new propagator.
    pub fn new(products: Arc<dyn ProductRepository>) -> Self {
        Self { products }
    }

    /// Stamp the collection's discount onto `product_ids`.
    ///
    /// Does nothing when the collection carries no discount.
    pub async fn apply_to(&self, collection: &Collection, product_ids: &[Uuid]) -> Result<(), AppError> {
        if !collection.has_discount() || product_ids.is_empty() {
            return Ok(());
        }

        let overwritten = self
            .products
            .stamp_discount(product_ids, collection.id, collection.discount_percentage)
            .await?;

        for o in &overwritten {
            warn!(
                product_id = %o.product_id,
                previous_collection_id = %o.previous_collection_id,
                collection_id = %collection.id,
                "Collection discount overwrote another collection's discount"
            );
        }

        debug!(
            collection_id = %collection.id,
            products = product_ids.len(),
            discount = collection.discount_percentage,
            "Applied collection discount"
        );
        Ok(())
    }

    /// Stamp the discount onto every member.
    pub async fn apply(&self, collection: &Collection) -> Result<(), AppError> {
        self.apply_to(collection, &collection.product_ids).await
    }

    /// Reset the discount on listed products owned by `collection_id`.
    pub async fn clear(&self, collection_id: Uuid, product_ids: &[Uuid]) -> Result<u64, AppError> {
        if product_ids.is_empty() {
            return Ok(0);
        }
        let cleared = self.products.clear_discount(product_ids, collection_id).await?;
        debug!(collection_id = %collection_id, cleared, "Cleared collection discount");
        Ok(cleared)
    }

    /// Bring member discounts in line after `before` became `after`.
    ///
    /// Current members are stamped (or cleared when the discount went to
    /// zero) before dropped members lose theirs, so a failed stamp leaves
    /// every product as it was.
    pub async fn sync(&self, before: &Collection, after: &Collection) -> Result<(), AppError> {
        if after.has_discount() {
            self.apply(after).await?;
        } else {
            self.clear(after.id, &after.product_ids).await?;
        }

        let dropped: Vec<Uuid> = before
            .product_ids
            .iter()
            .copied()
            .filter(|id| !after.contains(*id))
            .collect();
        self.clear(after.id, &dropped).await.map(|_| ())
    }
}
