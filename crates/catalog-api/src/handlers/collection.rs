//! Collection handlers.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use uuid::Uuid;

use catalog_core::error::AppError;
use catalog_service::CollectionView;

use crate::dto::ApiResponse;
use crate::dto::request::{AddProductRequest, CreateCollectionRequest, UpdateCollectionRequest};
use crate::extractors::{AuthUser, ValidJson, ValidPath};
use crate::state::AppState;

/// GET /api/collections
pub async fn list_collections(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<CollectionView>>>, AppError> {
    let collections = state.collection_service.list().await?;
    Ok(Json(ApiResponse::ok("Collections retrieved successfully", collections)))
}

/// GET /api/collections/active
pub async fn list_active_collections(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<CollectionView>>>, AppError> {
    let collections = state.collection_service.list_active().await?;
    Ok(Json(ApiResponse::ok(
        "Active collections retrieved successfully",
        collections,
    )))
}

/// POST /api/collections
pub async fn create_collection(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidJson(req): ValidJson<CreateCollectionRequest>,
) -> Result<(StatusCode, Json<ApiResponse<CollectionView>>), AppError> {
    let collection = state.collection_service.create(&auth, req.into()).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok("Collection created successfully", collection)),
    ))
}

/// GET /api/collections/{id}
pub async fn get_collection(
    State(state): State<AppState>,
    ValidPath(id): ValidPath<Uuid>,
) -> Result<Json<ApiResponse<CollectionView>>, AppError> {
    let collection = state.collection_service.get(id).await?;
    Ok(Json(ApiResponse::ok("Collection retrieved successfully", collection)))
}

/// PUT /api/collections/{id}
pub async fn update_collection(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidPath(id): ValidPath<Uuid>,
    ValidJson(req): ValidJson<UpdateCollectionRequest>,
) -> Result<Json<ApiResponse<CollectionView>>, AppError> {
    let collection = state
        .collection_service
        .update(&auth, id, req.into())
        .await?;
    Ok(Json(ApiResponse::ok("Collection updated successfully", collection)))
}

/// DELETE /api/collections/{id}
pub async fn delete_collection(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidPath(id): ValidPath<Uuid>,
) -> Result<StatusCode, AppError> {
    state.collection_service.delete(&auth, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/collections/{id}/products
pub async fn add_product(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidPath(id): ValidPath<Uuid>,
    ValidJson(req): ValidJson<AddProductRequest>,
) -> Result<Json<ApiResponse<CollectionView>>, AppError> {
    let collection = state
        .collection_service
        .add_product(&auth, id, req.product_id)
        .await?;
    Ok(Json(ApiResponse::ok("Product added to collection", collection)))
}

/// DELETE /api/collections/{id}/products/{product_id}
pub async fn remove_product(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidPath((id, product_id)): ValidPath<(Uuid, Uuid)>,
) -> Result<Json<ApiResponse<CollectionView>>, AppError> {
    let collection = state
        .collection_service
        .remove_product(&auth, id, product_id)
        .await?;
    Ok(Json(ApiResponse::ok("Product removed from collection", collection)))
}
