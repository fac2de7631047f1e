//! Category domain entities and hierarchy operations.

pub mod model;
pub mod tree;

pub use model::{Category, CreateCategory, UpdateCategory};
pub use tree::{CategoryNode, ancestors, build_tree, descendants, subcategories, would_create_cycle};
