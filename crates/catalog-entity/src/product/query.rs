//! Product listing filters, sort order, and their in-process evaluation.
//!
//! Store providers that cannot push predicates down (the in-memory
//! provider) call [`ProductQuery::matches`] and [`ProductQuery::compare`]
//! directly. The SQL provider compiles the same predicates; the unit tests
//! here pin the semantics both must share.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use catalog_core::AppError;
use catalog_core::types::{PageRequest, SortDirection};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::model::Product;

/// Sortable product fields.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProductSortField {
    /// Product name.
    #[default]
    Name,
    /// Base price.
    BasePrice,
    /// Creation time.
    CreatedAt,
    /// Last update time.
    UpdatedAt,
}

impl ProductSortField {
    /// Column name used by SQL providers.
    pub fn column(&self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::BasePrice => "base_price",
            Self::CreatedAt => "created_at",
            Self::UpdatedAt => "updated_at",
        }
    }
}

impl fmt::Display for ProductSortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name => write!(f, "name"),
            Self::BasePrice => write!(f, "basePrice"),
            Self::CreatedAt => write!(f, "createdAt"),
            Self::UpdatedAt => write!(f, "updatedAt"),
        }
    }
}

impl FromStr for ProductSortField {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "name" => Ok(Self::Name),
            "basePrice" | "price" => Ok(Self::BasePrice),
            "createdAt" => Ok(Self::CreatedAt),
            "updatedAt" => Ok(Self::UpdatedAt),
            _ => Err(AppError::validation(format!(
                "Invalid sort field: '{s}'. Expected one of: name, basePrice, createdAt, updatedAt"
            ))),
        }
    }
}

/// Split a comma-separated tag list, trimming and dropping empties.
pub fn parse_tags(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// A normalized product listing request. All filters are AND-combined.
#[derive(Debug, Clone, Default)]
pub struct ProductQuery {
    /// Page window.
    pub page: PageRequest,
    /// Restrict to one category.
    pub category_id: Option<Uuid>,
    /// Case-insensitive substring over name, description and tags.
    pub search: Option<String>,
    /// Inclusive lower bound on base price.
    pub min_price: Option<f64>,
    /// Inclusive upper bound on base price.
    pub max_price: Option<f64>,
    /// Sort field.
    pub sort_by: ProductSortField,
    /// Sort direction.
    pub sort_order: SortDirection,
    /// `Some(true)`: some variant in stock. `Some(false)`: no variant in stock.
    pub in_stock: Option<bool>,
    /// Product must carry every tag.
    pub tags: Vec<String>,
    /// A single variant must have this color...
    pub color: Option<String>,
    /// ...and this size.
    pub size: Option<String>,
}

impl ProductQuery {
    /// Evaluate every filter against a product.
    pub fn matches(&self, product: &Product) -> bool {
        if let Some(category_id) = self.category_id {
            if product.category_id != category_id {
                return false;
            }
        }

        if let Some(search) = self.search.as_deref() {
            let needle = search.to_lowercase();
            let hit = product.name.to_lowercase().contains(&needle)
                || product.description.to_lowercase().contains(&needle)
                || product.tags.iter().any(|t| t.to_lowercase().contains(&needle));
            if !hit {
                return false;
            }
        }

        if self.min_price.is_some_and(|min| product.base_price < min) {
            return false;
        }
        if self.max_price.is_some_and(|max| product.base_price > max) {
            return false;
        }

        if let Some(in_stock) = self.in_stock {
            if product.is_in_stock() != in_stock {
                return false;
            }
        }

        if !self.tags.iter().all(|tag| product.tags.contains(tag)) {
            return false;
        }

        if self.color.is_some() || self.size.is_some() {
            let variant_hit = product.variants.iter().any(|v| {
                self.color
                    .as_deref()
                    .is_none_or(|c| v.color.as_deref() == Some(c))
                    && self
                        .size
                        .as_deref()
                        .is_none_or(|s| v.size.as_deref() == Some(s))
            });
            if !variant_hit {
                return false;
            }
        }

        true
    }

    /// Order two products by the requested field and direction.
    ///
    /// Ties break on id so paging is deterministic.
    pub fn compare(&self, a: &Product, b: &Product) -> Ordering {
        let primary = match self.sort_by {
            ProductSortField::Name => a.name.cmp(&b.name),
            ProductSortField::BasePrice => a.base_price.total_cmp(&b.base_price),
            ProductSortField::CreatedAt => a.created_at.cmp(&b.created_at),
            ProductSortField::UpdatedAt => a.updated_at.cmp(&b.updated_at),
        };
        self.sort_order.apply(primary).then_with(|| a.id.cmp(&b.id))
    }
}

/// Request for products with any variant at or below a stock threshold.
#[derive(Debug, Clone)]
pub struct LowStockQuery {
    /// Page window.
    pub page: PageRequest,
    /// Inclusive stock threshold.
    pub threshold: i64,
    /// Restrict to one category.
    pub category_id: Option<Uuid>,
}

impl LowStockQuery {
    /// Whether the product qualifies.
    pub fn matches(&self, product: &Product) -> bool {
        self.category_id.is_none_or(|c| product.category_id == c)
            && product.is_low_stock(self.threshold)
    }
}
