//! Query string extraction and normalization for list endpoints.
//!
//! Raw values arrive as strings and are parsed here so that bad input
//! produces a field-specific message instead of a generic rejection.

use std::str::FromStr;

use axum::extract::{FromRequestParts, Query};
use axum::http::request::Parts;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use uuid::Uuid;

use catalog_core::error::AppError;
use catalog_core::types::{PageRequest, SortDirection};
use catalog_entity::product::{
    LOW_STOCK_THRESHOLD, LowStockQuery, ProductQuery, ProductSortField, parse_tags,
};

/// Query parameters whose shape failed to parse are a validation error.
#[derive(Debug, Clone)]
pub struct ValidQuery<T>(pub T);

impl<S, T> FromRequestParts<S> for ValidQuery<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        Query::<T>::from_request_parts(parts, state)
            .await
            .map(|Query(value)| Self(value))
            .map_err(|rejection| AppError::validation(rejection.body_text()))
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_opt<T: FromStr>(value: Option<String>, name: &str) -> Result<Option<T>, AppError> {
    non_empty(value)
        .map(|v| {
            v.parse::<T>()
                .map_err(|_| AppError::validation(format!("Invalid value for {name}: '{v}'")))
        })
        .transpose()
}

/// Page numbers that fail to parse fall back to the defaults.
fn page_request(page: Option<String>, limit: Option<String>) -> PageRequest {
    PageRequest::from_optional(
        non_empty(page).and_then(|p| p.parse().ok()),
        non_empty(limit).and_then(|l| l.parse().ok()),
    )
}

/// `GET /api/products` query string.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductListParams {
    /// Page number.
    pub page: Option<String>,
    /// Page size.
    pub limit: Option<String>,
    /// Category id.
    pub category: Option<String>,
    /// Free-text search.
    pub search: Option<String>,
    /// Lower base-price bound.
    pub min_price: Option<String>,
    /// Upper base-price bound.
    pub max_price: Option<String>,
    /// Sort field.
    pub sort_by: Option<String>,
    /// `asc` or `desc`.
    pub sort_order: Option<String>,
    /// `true` or `false`.
    pub in_stock: Option<String>,
    /// Comma-separated tags.
    pub tags: Option<String>,
    /// Variant color.
    pub color: Option<String>,
    /// Variant size.
    pub size: Option<String>,
}

impl ProductListParams {
    /// Normalize into a product query.
    pub fn into_query(self) -> Result<ProductQuery, AppError> {
        let sort_by = match non_empty(self.sort_by) {
            Some(field) => field.parse::<ProductSortField>()?,
            None => ProductSortField::default(),
        };
        let in_stock = match non_empty(self.in_stock).as_deref() {
            None => None,
            Some("true") => Some(true),
            Some("false") => Some(false),
            Some(other) => {
                return Err(AppError::validation(format!(
                    "Invalid value for inStock: '{other}'. Expected true or false"
                )));
            }
        };

        let min_price: Option<f64> = parse_opt(self.min_price, "minPrice")?;
        let max_price: Option<f64> = parse_opt(self.max_price, "maxPrice")?;
        if min_price.is_some_and(|p| p < 0.0) || max_price.is_some_and(|p| p < 0.0) {
            return Err(AppError::validation("Price bounds must not be negative"));
        }

        Ok(ProductQuery {
            page: page_request(self.page, self.limit),
            category_id: parse_opt::<Uuid>(self.category, "category")?,
            search: non_empty(self.search),
            min_price,
            max_price,
            sort_by,
            sort_order: SortDirection::parse_lenient(self.sort_order.as_deref()),
            in_stock,
            tags: self.tags.as_deref().map(parse_tags).unwrap_or_default(),
            color: non_empty(self.color),
            size: non_empty(self.size),
        })
    }
}

/// `GET /api/products/low-stock` query string.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LowStockParams {
    /// Page number.
    pub page: Option<String>,
    /// Page size.
    pub limit: Option<String>,
    /// Inclusive stock threshold.
    pub threshold: Option<String>,
    /// Category id.
    pub category: Option<String>,
}

impl LowStockParams {
    /// Normalize into a low-stock query.
    pub fn into_query(self) -> Result<LowStockQuery, AppError> {
        Ok(LowStockQuery {
            page: page_request(self.page, self.limit),
            threshold: parse_opt(self.threshold, "threshold")?.unwrap_or(LOW_STOCK_THRESHOLD),
            category_id: parse_opt::<Uuid>(self.category, "category")?,
        })
    }
}
