//! Aggregate catalog statistics.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::model::Product;

/// Variants at or below this many units count as low stock.
pub const LOW_STOCK_THRESHOLD: i64 = 10;

/// Product count for one category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryCount {
    /// Category id.
    pub category_id: Uuid,
    /// Category name; `None` when the category no longer exists.
    pub category_name: Option<String>,
    /// Number of products in the category.
    pub count: u64,
}

/// Catalog-wide inventory summary.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductStats {
    /// Number of products.
    pub total_products: u64,
    /// Number of variants across all products.
    pub total_variants: u64,
    /// Sum of variant stock.
    pub total_stock: i64,
    /// Mean variant price (0 when there are no variants).
    pub average_price: f64,
    /// Variants with stock at or below [`LOW_STOCK_THRESHOLD`].
    pub low_stock_variants: u64,
    /// Per-category product counts, largest first.
    pub category_distribution: Vec<CategoryCount>,
}

impl ProductStats {
    /// Aggregate over an in-memory product set. Category names are left
    /// empty for the caller to resolve.
    pub fn compute<'a>(products: impl IntoIterator<Item = &'a Product>) -> Self {
        let mut stats = Self::default();
        let mut price_sum = 0.0;
        let mut counts: Vec<CategoryCount> = Vec::new();

        for product in products {
            stats.total_products += 1;
            for variant in &product.variants {
                stats.total_variants += 1;
                stats.total_stock += variant.stock;
                price_sum += variant.price;
                if variant.stock <= LOW_STOCK_THRESHOLD {
                    stats.low_stock_variants += 1;
                }
            }
            match counts
                .iter_mut()
                .find(|c| c.category_id == product.category_id)
            {
                Some(entry) => entry.count += 1,
                None => counts.push(CategoryCount {
                    category_id: product.category_id,
                    category_name: None,
                    count: 1,
                }),
            }
        }

        if stats.total_variants > 0 {
            stats.average_price = price_sum / stats.total_variants as f64;
        }
        counts.sort_by(|a, b| b.count.cmp(&a.count));
        stats.category_distribution = counts;
        stats
    }
}
