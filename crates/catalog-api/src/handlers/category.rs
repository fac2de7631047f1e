//! Category handlers.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use uuid::Uuid;

use catalog_core::error::AppError;
use catalog_entity::category::{Category, CategoryNode};
use catalog_service::CategoryDetail;

use crate::dto::ApiResponse;
use crate::dto::request::{CreateCategoryRequest, UpdateCategoryRequest};
use crate::extractors::{AuthUser, ValidJson, ValidPath};
use crate::state::AppState;

/// GET /api/categories
pub async fn list_categories(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<CategoryNode>>>, AppError> {
    let tree = state.category_service.list_tree().await?;
    Ok(Json(ApiResponse::ok("Categories retrieved successfully", tree)))
}

/// POST /api/categories
pub async fn create_category(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidJson(req): ValidJson<CreateCategoryRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Category>>), AppError> {
    let category = state.category_service.create_category(&auth, req.into()).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok("Category created successfully", category)),
    ))
}

/// GET /api/categories/{id}
pub async fn get_category(
    State(state): State<AppState>,
    ValidPath(id): ValidPath<Uuid>,
) -> Result<Json<ApiResponse<CategoryDetail>>, AppError> {
    let detail = state.category_service.get_category(id).await?;
    Ok(Json(ApiResponse::ok("Category retrieved successfully", detail)))
}

/// PUT /api/categories/{id}
pub async fn update_category(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidPath(id): ValidPath<Uuid>,
    ValidJson(req): ValidJson<UpdateCategoryRequest>,
) -> Result<Json<ApiResponse<Category>>, AppError> {
    let category = state
        .category_service
        .update_category(&auth, id, req.into())
        .await?;
    Ok(Json(ApiResponse::ok("Category updated successfully", category)))
}

/// DELETE /api/categories/{id}
pub async fn delete_category(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidPath(id): ValidPath<Uuid>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    state.category_service.delete_category(&auth, id).await?;
    Ok(Json(ApiResponse::ok("Category deleted successfully", ())))
}
