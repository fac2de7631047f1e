//! Custom Axum extractors.
//!
//! Every rejection is an [`AppError`](catalog_core::error::AppError) so that
//! malformed input renders as the standard error envelope.

pub mod auth;
pub mod json;
pub mod path;
pub mod query;

pub use auth::AuthUser;
pub use json::ValidJson;
pub use path::ValidPath;
pub use query::{LowStockParams, ProductListParams, ValidQuery};
