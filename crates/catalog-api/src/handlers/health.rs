//! Health check handler.

use axum::Json;
use axum::extract::State;

use crate::dto::ApiResponse;
use crate::dto::response::HealthResponse;
use crate::state::AppState;

/// GET /api/health
pub async fn health_check(State(state): State<AppState>) -> Json<ApiResponse<HealthResponse>> {
    let reachable = match state.store.health_check().await {
        Ok(ok) => ok,
        Err(e) => {
            tracing::warn!(error = %e, "Store health check failed");
            false
        }
    };

    Json(ApiResponse::ok(
        "Service is running",
        HealthResponse {
            status: if reachable { "ok" } else { "degraded" }.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            store: state.store.provider_name().to_string(),
            uptime_seconds: state.started_at.elapsed().as_secs(),
        },
    ))
}
