//! Category hierarchy use cases.

pub mod service;

pub use service::{CategoryDetail, CategoryService};
