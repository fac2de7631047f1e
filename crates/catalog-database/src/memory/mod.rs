//! In-memory store provider backed by concurrent maps.
//!
//! Rows keep a monotonically increasing insertion sequence so listings are
//! deterministic. Unique keys (names, emails) are claimed through a
//! separate index map, making the uniqueness check and the claim a single
//! atomic step.

mod table;

pub mod category;
pub mod collection;
pub mod product;
pub mod user;

pub use category::MemoryCategoryRepository;
pub use collection::MemoryCollectionRepository;
pub use product::MemoryProductRepository;
pub use user::MemoryUserRepository;
