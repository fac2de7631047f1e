//! End-to-end tests against the full router over the in-memory store.

mod helpers;

mod auth_test;
mod category_test;
mod collection_test;
mod product_test;
