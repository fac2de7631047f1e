//! # catalog-entity
//!
//! Domain entity models for the product catalog. Every struct in this
//! crate represents a stored document or a domain value object. Stored
//! entities derive `Debug`, `Clone`, `Serialize`, `Deserialize` and
//! `sqlx::FromRow`; JSON field names are camelCase.
//!
//! Pure domain logic lives here as well: the category tree builder and
//! the product filter/sort model are plain functions over entities so
//! that every store provider evaluates them the same way.

pub mod category;
pub mod collection;
pub mod product;
pub mod user;
