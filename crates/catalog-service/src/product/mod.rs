//! Catalog query engine and product management.

pub mod service;
pub mod view;

pub use service::{InventoryUpdate, ProductService};
pub use view::{ProductSummary, ProductView};
