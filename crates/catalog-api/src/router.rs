//! Route definitions for the catalog HTTP API.
//!
//! All routes are organized by domain and mounted under `/api`.
//! The router receives `AppState` and passes it to all handlers via Axum's
//! `State` extractor.

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::services::ServeDir;

use catalog_core::error::AppError;

use crate::handlers;
use crate::state::AppState;

/// Build the routing tree: API routes under `/api`, uploaded files under
/// the configured public prefix, and an envelope 404 for everything else.
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .merge(auth_routes())
        .merge(product_routes())
        .merge(category_routes())
        .merge(collection_routes())
        .merge(health_routes());

    let storage = &state.config.storage;
    let uploads = ServeDir::new(&storage.upload_dir);

    Router::new()
        .nest("/api", api_routes)
        .nest_service(&storage.public_url_prefix, uploads)
        .fallback(route_not_found)
        .with_state(state)
}

async fn route_not_found() -> AppError {
    AppError::not_found("Route not found")
}

/// Registration, login and profile
fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(handlers::auth::register))
        .route("/auth/login", post(handlers::auth::login))
        .route(
            "/auth/profile",
            get(handlers::auth::get_profile).put(handlers::auth::update_profile),
        )
}

/// Product CRUD, inventory and reporting
fn product_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/products",
            get(handlers::product::list_products).post(handlers::product::create_product),
        )
        .route("/products/stats", get(handlers::product::product_stats))
        .route("/products/low-stock", get(handlers::product::low_stock))
        .route("/products/inventory", post(handlers::product::update_inventory))
        .route(
            "/products/{id}",
            get(handlers::product::get_product)
                .put(handlers::product::update_product)
                .delete(handlers::product::delete_product),
        )
}

/// Category tree and CRUD
fn category_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/categories",
            get(handlers::category::list_categories).post(handlers::category::create_category),
        )
        .route(
            "/categories/{id}",
            get(handlers::category::get_category)
                .put(handlers::category::update_category)
                .delete(handlers::category::delete_category),
        )
}

/// Collections and membership
fn collection_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/collections",
            get(handlers::collection::list_collections)
                .post(handlers::collection::create_collection),
        )
        .route(
            "/collections/active",
            get(handlers::collection::list_active_collections),
        )
        .route(
            "/collections/{id}",
            get(handlers::collection::get_collection)
                .put(handlers::collection::update_collection)
                .delete(handlers::collection::delete_collection),
        )
        .route(
            "/collections/{id}/products",
            post(handlers::collection::add_product),
        )
        .route(
            "/collections/{id}/products/{product_id}",
            axum::routing::delete(handlers::collection::remove_product),
        )
}

/// Health check (no auth required)
fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health::health_check))
}
