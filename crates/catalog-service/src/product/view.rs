//! Product read models with derived pricing and stock fields.

use serde::Serialize;
use uuid::Uuid;

use catalog_entity::product::Product;

/// A product as returned to callers, with computed fields.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductView {
    /// The stored product.
    #[serde(flatten)]
    pub product: Product,
    /// Cheapest effective variant price, or the base price without variants.
    pub lowest_price: f64,
    /// Whether any variant has stock.
    pub is_in_stock: bool,
}

impl From<Product> for ProductView {
    fn from(product: Product) -> Self {
        Self {
            lowest_price: product.lowest_price(),
            is_in_stock: product.is_in_stock(),
            product,
        }
    }
}

/// The product fields shown inside a collection.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSummary {
    /// Product id.
    pub id: Uuid,
    /// Product name.
    pub name: String,
    /// Base price.
    pub base_price: f64,
    /// Cheapest effective variant price.
    pub lowest_price: f64,
    /// Collection discount currently applied.
    pub discount_percentage: f64,
    /// Whether any variant has stock.
    pub is_in_stock: bool,
}

impl From<&Product> for ProductSummary {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id,
            name: product.name.clone(),
            base_price: product.base_price,
            lowest_price: product.lowest_price(),
            discount_percentage: product.discount_percentage,
            is_in_stock: product.is_in_stock(),
        }
    }
}
