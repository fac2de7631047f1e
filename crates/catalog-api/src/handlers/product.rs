//! Product handlers: listing, CRUD, inventory and statistics.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use uuid::Uuid;

use catalog_core::error::AppError;
use catalog_core::types::PageResponse;
use catalog_entity::product::{ProductStats, Variant};
use catalog_service::ProductView;

use crate::dto::ApiResponse;
use crate::dto::request::{CreateProductRequest, InventoryRequest, UpdateProductRequest};
use crate::extractors::{AuthUser, LowStockParams, ProductListParams, ValidJson, ValidPath, ValidQuery};
use crate::state::AppState;

/// GET /api/products
pub async fn list_products(
    State(state): State<AppState>,
    ValidQuery(params): ValidQuery<ProductListParams>,
) -> Result<Json<ApiResponse<PageResponse<ProductView>>>, AppError> {
    let query = params.into_query()?;
    let page = state.product_service.list(&query).await?;
    Ok(Json(ApiResponse::ok("Products retrieved successfully", page)))
}

/// POST /api/products
pub async fn create_product(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidJson(req): ValidJson<CreateProductRequest>,
) -> Result<(StatusCode, Json<ApiResponse<ProductView>>), AppError> {
    let product = state.product_service.create(&auth, req.into()).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok("Product created successfully", product)),
    ))
}

/// GET /api/products/{id}
pub async fn get_product(
    State(state): State<AppState>,
    ValidPath(id): ValidPath<Uuid>,
) -> Result<Json<ApiResponse<ProductView>>, AppError> {
    let product = state.product_service.get(id).await?;
    Ok(Json(ApiResponse::ok("Product retrieved successfully", product)))
}

/// PUT /api/products/{id}
pub async fn update_product(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidPath(id): ValidPath<Uuid>,
    ValidJson(req): ValidJson<UpdateProductRequest>,
) -> Result<Json<ApiResponse<ProductView>>, AppError> {
    let product = state.product_service.update(&auth, id, req.into()).await?;
    Ok(Json(ApiResponse::ok("Product updated successfully", product)))
}

/// DELETE /api/products/{id}
pub async fn delete_product(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidPath(id): ValidPath<Uuid>,
) -> Result<StatusCode, AppError> {
    state.product_service.delete(&auth, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/products/stats
pub async fn product_stats(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<ProductStats>>, AppError> {
    let stats = state.product_service.stats().await?;
    Ok(Json(ApiResponse::ok("Product statistics retrieved successfully", stats)))
}

/// GET /api/products/low-stock
pub async fn low_stock(
    State(state): State<AppState>,
    ValidQuery(params): ValidQuery<LowStockParams>,
) -> Result<Json<ApiResponse<PageResponse<ProductView>>>, AppError> {
    let query = params.into_query()?;
    let page = state.product_service.low_stock(&query).await?;
    Ok(Json(ApiResponse::ok("Low stock products retrieved successfully", page)))
}

/// POST /api/products/inventory
pub async fn update_inventory(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidJson(req): ValidJson<InventoryRequest>,
) -> Result<Json<ApiResponse<Variant>>, AppError> {
    let variant = state.product_service.update_inventory(&auth, req.into()).await?;
    Ok(Json(ApiResponse::ok("Inventory updated successfully", variant)))
}
