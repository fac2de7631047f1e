//! Product domain entities.

pub mod model;
pub mod query;
pub mod stats;

pub use model::{CreateProduct, NewVariant, Product, UpdateProduct, Variant};
pub use query::{LowStockQuery, ProductQuery, ProductSortField, parse_tags};
pub use stats::{CategoryCount, LOW_STOCK_THRESHOLD, ProductStats};
