//! Shared query types used by list endpoints.

pub mod pagination;
pub mod sorting;

pub use pagination::{PageInfo, PageRequest, PageResponse};
pub use sorting::SortDirection;
