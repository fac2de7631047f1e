//! # catalog-service
//!
//! Business logic service layer for the catalog. Each service orchestrates
//! repositories and credential helpers to implement one group of use
//! cases.
//!
//! Services follow constructor injection: all dependencies are provided
//! at construction time via `Arc` references. Mutating operations take a
//! [`RequestContext`] and enforce the admin requirement themselves.

pub mod auth;
pub mod category;
pub mod collection;
pub mod context;
pub mod product;
pub mod user;

pub use auth::{AuthService, AuthSession, RegisterInput};
pub use category::{CategoryDetail, CategoryService};
pub use collection::{CollectionService, CollectionView, DiscountPropagator};
pub use context::RequestContext;
pub use product::{InventoryUpdate, ProductService, ProductSummary, ProductView};
pub use user::UserService;
