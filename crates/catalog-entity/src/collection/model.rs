//! Collection entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A curated, time-bounded grouping of products with an optional shared
/// discount.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Collection {
    /// Unique collection identifier.
    pub id: Uuid,
    /// Collection name, unique across the catalog.
    pub name: String,
    /// Description.
    pub description: String,
    /// Member products in insertion order, without duplicates.
    #[serde(rename = "products")]
    pub product_ids: Vec<Uuid>,
    /// Whether the collection is enabled.
    pub is_active: bool,
    /// When the collection starts.
    pub start_date: DateTime<Utc>,
    /// When the collection ends; open-ended when absent.
    pub end_date: Option<DateTime<Utc>>,
    /// Discount mirrored onto member products (0-100).
    pub discount_percentage: f64,
    /// Banner image URL.
    pub image_url: Option<String>,
    /// When the collection was created.
    pub created_at: DateTime<Utc>,
    /// When the collection was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Collection {
    /// Build a new collection from creation data.
    pub fn new(data: CreateCollection) -> Self {
        let now = Utc::now();
        let mut product_ids: Vec<Uuid> = Vec::with_capacity(data.product_ids.len());
        for id in data.product_ids {
            if !product_ids.contains(&id) {
                product_ids.push(id);
            }
        }
        Self {
            id: Uuid::new_v4(),
            name: data.name,
            description: data.description,
            product_ids,
            is_active: data.is_active,
            start_date: data.start_date.unwrap_or(now),
            end_date: data.end_date,
            discount_percentage: data.discount_percentage,
            image_url: data.image_url,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether the collection is enabled and `now` falls inside its window.
    pub fn is_running(&self, now: DateTime<Utc>) -> bool {
        self.is_active && self.start_date <= now && self.end_date.is_none_or(|end| end > now)
    }

    /// Whether the product is a member.
    pub fn contains(&self, product_id: Uuid) -> bool {
        self.product_ids.contains(&product_id)
    }

    /// Whether member products should carry this collection's discount.
    pub fn has_discount(&self) -> bool {
        self.discount_percentage > 0.0
    }

    /// Apply a partial update.
    pub fn apply_update(&mut self, changes: UpdateCollection) {
        if let Some(name) = changes.name {
            self.name = name;
        }
        if let Some(description) = changes.description {
            self.description = description;
        }
        if let Some(product_ids) = changes.product_ids {
            self.product_ids.clear();
            for id in product_ids {
                if !self.product_ids.contains(&id) {
                    self.product_ids.push(id);
                }
            }
        }
        if let Some(is_active) = changes.is_active {
            self.is_active = is_active;
        }
        if let Some(start_date) = changes.start_date {
            self.start_date = start_date;
        }
        if let Some(end_date) = changes.end_date {
            self.end_date = end_date;
        }
        if let Some(discount) = changes.discount_percentage {
            self.discount_percentage = discount;
        }
        if let Some(image_url) = changes.image_url {
            self.image_url = Some(image_url);
        }
        self.updated_at = Utc::now();
    }
}

/// Data required to create a new collection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateCollection {
    /// Collection name.
    pub name: String,
    /// Description.
    pub description: String,
    /// Initial members.
    pub product_ids: Vec<Uuid>,
    /// Enabled flag.
    pub is_active: bool,
    /// Start of the window; defaults to now.
    pub start_date: Option<DateTime<Utc>>,
    /// End of the window.
    pub end_date: Option<DateTime<Utc>>,
    /// Shared discount.
    pub discount_percentage: f64,
    /// Banner image URL.
    pub image_url: Option<String>,
}

/// Partial collection update.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateCollection {
    /// New name.
    pub name: Option<String>,
    /// New description.
    pub description: Option<String>,
    /// Replacement member list.
    pub product_ids: Option<Vec<Uuid>>,
    /// New enabled flag.
    pub is_active: Option<bool>,
    /// New start date.
    pub start_date: Option<DateTime<Utc>>,
    /// `Some(None)` removes the end date.
    pub end_date: Option<Option<DateTime<Utc>>>,
    /// New discount.
    pub discount_percentage: Option<f64>,
    /// New banner image URL.
    pub image_url: Option<String>,
}
