//! # catalog-database
//!
//! The document store adapter. Services talk to the repository traits in
//! [`repositories`]; [`Store`] selects a provider from configuration:
//!
//! - `postgres`: products, categories, collections and users as rows with
//!   JSONB variant documents, queried through sqlx.
//! - `memory`: concurrent maps, used for tests and local development.

pub mod connection;
pub mod memory;
pub mod migration;
pub mod postgres;
pub mod repositories;
pub mod store;

pub use connection::DatabasePool;
pub use store::Store;
