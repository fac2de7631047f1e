//! Collection management and discount propagation.

pub mod propagator;
pub mod service;

pub use propagator::DiscountPropagator;
pub use service::{CollectionService, CollectionView};
