//! Product and variant entity models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A purchasable size/color configuration of a product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Variant {
    /// Unique variant identifier.
    pub id: Uuid,
    /// Size label, e.g. `"M"`.
    #[serde(default)]
    pub size: Option<String>,
    /// Color label, e.g. `"red"`.
    #[serde(default)]
    pub color: Option<String>,
    /// Stock keeping unit, unique across the catalog.
    pub sku: String,
    /// Unit price before discount.
    pub price: f64,
    /// Units on hand.
    pub stock: i64,
    /// Variant-level discount (0-100).
    #[serde(default)]
    pub discount_percentage: f64,
}

impl Variant {
    /// Price after applying this variant's discount.
    pub fn effective_price(&self) -> f64 {
        self.price * (1.0 - self.discount_percentage / 100.0)
    }

    /// Whether at least one unit is available.
    pub fn in_stock(&self) -> bool {
        self.stock > 0
    }
}

/// A catalog product.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Unique product identifier.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Long description.
    pub description: String,
    /// Owning category.
    #[serde(rename = "category")]
    pub category_id: Uuid,
    /// Price used when the product has no variants.
    pub base_price: f64,
    /// Variants, owned by the product.
    #[sqlx(json)]
    pub variants: Vec<Variant>,
    /// Image URLs.
    pub images: Vec<String>,
    /// Free-form tags.
    pub tags: Vec<String>,
    /// Whether the product is listed.
    pub is_active: bool,
    /// Discount stamped by a collection (0 when none).
    pub discount_percentage: f64,
    /// The collection that owns `discount_percentage`, if any.
    pub discount_collection_id: Option<Uuid>,
    /// When the product was created.
    pub created_at: DateTime<Utc>,
    /// When the product was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Build a new product from creation data, assigning fresh ids.
    pub fn new(data: CreateProduct) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: data.name,
            description: data.description,
            category_id: data.category_id,
            base_price: data.base_price,
            variants: data.variants.into_iter().map(NewVariant::into_variant).collect(),
            images: data.images,
            tags: data.tags,
            is_active: data.is_active,
            discount_percentage: 0.0,
            discount_collection_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Lowest effective price over all variants.
    ///
    /// Falls back to the base price when the product has no variants.
    pub fn lowest_price(&self) -> f64 {
        self.variants
            .iter()
            .map(Variant::effective_price)
            .reduce(f64::min)
            .unwrap_or(self.base_price)
    }

    /// Whether any variant has stock.
    pub fn is_in_stock(&self) -> bool {
        self.variants.iter().any(Variant::in_stock)
    }

    /// Whether any variant is at or below `threshold` units.
    pub fn is_low_stock(&self, threshold: i64) -> bool {
        self.variants.iter().any(|v| v.stock <= threshold)
    }

    /// Sum of stock over all variants.
    pub fn total_stock(&self) -> i64 {
        self.variants.iter().map(|v| v.stock).sum()
    }

    /// Look up a variant by id.
    pub fn variant(&self, variant_id: Uuid) -> Option<&Variant> {
        self.variants.iter().find(|v| v.id == variant_id)
    }

    /// Mutable variant lookup.
    pub fn variant_mut(&mut self, variant_id: Uuid) -> Option<&mut Variant> {
        self.variants.iter_mut().find(|v| v.id == variant_id)
    }

    /// Apply a partial update.
    ///
    /// When variants are replaced, a new variant whose SKU matches an
    /// existing one keeps that variant's id.
    pub fn apply_update(&mut self, changes: UpdateProduct) {
        if let Some(name) = changes.name {
            self.name = name;
        }
        if let Some(description) = changes.description {
            self.description = description;
        }
        if let Some(category_id) = changes.category_id {
            self.category_id = category_id;
        }
        if let Some(base_price) = changes.base_price {
            self.base_price = base_price;
        }
        if let Some(variants) = changes.variants {
            let previous = std::mem::take(&mut self.variants);
            self.variants = variants
                .into_iter()
                .map(|nv| {
                    let existing = previous.iter().find(|v| v.sku == nv.sku).map(|v| v.id);
                    let mut variant = nv.into_variant();
                    if let Some(id) = existing {
                        variant.id = id;
                    }
                    variant
                })
                .collect();
        }
        if let Some(images) = changes.images {
            self.images = images;
        }
        if let Some(tags) = changes.tags {
            self.tags = tags;
        }
        if let Some(is_active) = changes.is_active {
            self.is_active = is_active;
        }
        self.updated_at = Utc::now();
    }

    /// Stamp a collection discount onto this product.
    ///
    /// Returns the id of a different collection whose discount was
    /// overwritten, if any.
    pub fn stamp_discount(&mut self, collection_id: Uuid, percentage: f64) -> Option<Uuid> {
        let previous = self
            .discount_collection_id
            .filter(|owner| *owner != collection_id);
        self.discount_percentage = percentage;
        self.discount_collection_id = Some(collection_id);
        self.updated_at = Utc::now();
        previous
    }

    /// Clear the discount if `collection_id` owns it.
    ///
    /// Returns whether anything changed.
    pub fn clear_discount_from(&mut self, collection_id: Uuid) -> bool {
        if self.discount_collection_id != Some(collection_id) {
            return false;
        }
        self.discount_percentage = 0.0;
        self.discount_collection_id = None;
        self.updated_at = Utc::now();
        true
    }
}

/// Variant data supplied on create or update.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewVariant {
    /// Size label.
    pub size: Option<String>,
    /// Color label.
    pub color: Option<String>,
    /// Stock keeping unit.
    pub sku: String,
    /// Unit price.
    pub price: f64,
    /// Units on hand.
    pub stock: i64,
    /// Variant-level discount.
    pub discount_percentage: f64,
}

impl NewVariant {
    /// Materialize with a fresh id.
    pub fn into_variant(self) -> Variant {
        Variant {
            id: Uuid::new_v4(),
            size: self.size,
            color: self.color,
            sku: self.sku,
            price: self.price,
            stock: self.stock,
            discount_percentage: self.discount_percentage,
        }
    }
}

/// Data required to create a new product.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateProduct {
    /// Display name.
    pub name: String,
    /// Long description.
    pub description: String,
    /// Owning category.
    pub category_id: Uuid,
    /// Base price.
    pub base_price: f64,
    /// Initial variants.
    pub variants: Vec<NewVariant>,
    /// Image URLs.
    pub images: Vec<String>,
    /// Tags.
    pub tags: Vec<String>,
    /// Listed flag.
    pub is_active: bool,
}

/// Partial product update; `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateProduct {
    /// New name.
    pub name: Option<String>,
    /// New description.
    pub description: Option<String>,
    /// New category.
    pub category_id: Option<Uuid>,
    /// New base price.
    pub base_price: Option<f64>,
    /// Replacement variant list.
    pub variants: Option<Vec<NewVariant>>,
    /// Replacement image list.
    pub images: Option<Vec<String>>,
    /// Replacement tag list.
    pub tags: Option<Vec<String>>,
    /// New listed flag.
    pub is_active: Option<bool>,
}

impl UpdateProduct {
    /// SKUs of the replacement variants, if variants are being replaced.
    pub fn skus(&self) -> Vec<&str> {
        self.variants
            .iter()
            .flatten()
            .map(|v| v.sku.as_str())
            .collect()
    }
}
