//! # catalog-core
//!
//! Core crate for the product catalog service. Contains configuration
//! schemas, the unified error system, and the pagination and sorting
//! types shared by the store adapters and the HTTP layer.
//!
//! This crate has **no** internal dependencies on other catalog crates.

pub mod config;
pub mod error;
pub mod result;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
