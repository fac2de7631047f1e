//! Auth handlers: register, login, profile.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;

use catalog_core::error::AppError;
use catalog_entity::user::User;
use catalog_service::AuthSession;

use crate::dto::ApiResponse;
use crate::dto::request::{LoginRequest, RegisterRequest, UpdateProfileRequest};
use crate::extractors::{AuthUser, ValidJson};
use crate::state::AppState;

/// POST /api/auth/register
pub async fn register(
    State(state): State<AppState>,
    ValidJson(req): ValidJson<RegisterRequest>,
) -> Result<(StatusCode, Json<ApiResponse<AuthSession>>), AppError> {
    let session = state.auth_service.register(req.into()).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok("User registered successfully", session)),
    ))
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    ValidJson(req): ValidJson<LoginRequest>,
) -> Result<Json<ApiResponse<AuthSession>>, AppError> {
    let session = state.auth_service.login(&req.email, &req.password).await?;
    Ok(Json(ApiResponse::ok("Login successful", session)))
}

/// GET /api/auth/profile
pub async fn get_profile(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ApiResponse<User>>, AppError> {
    let user = state.user_service.get_profile(&auth).await?;
    Ok(Json(ApiResponse::ok("Profile retrieved successfully", user)))
}

/// PUT /api/auth/profile
pub async fn update_profile(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidJson(req): ValidJson<UpdateProfileRequest>,
) -> Result<Json<ApiResponse<User>>, AppError> {
    let user = state.user_service.update_profile(&auth, req.into()).await?;
    Ok(Json(ApiResponse::ok("Profile updated successfully", user)))
}
