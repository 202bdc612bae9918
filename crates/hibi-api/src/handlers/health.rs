//! Health check handlers.

use axum::Json;
use axum::extract::State;


use crate::error::ApiError;
use hibi_core::traits::time_index::TimeIndex;

use crate::dto::{ApiResponse, DetailedHealthResponse, HealthResponse};
use crate::state::AppState;

/// GET /api/health
pub async fn health() -> Json<ApiResponse<HealthResponse>> {
    Json(ApiResponse::ok(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    }))
}

/// GET /api/health/detailed
pub async fn health_detailed(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<DetailedHealthResponse>>, ApiError> {
    let database = match state.db.health_check().await {
        Ok(true) => "connected",
        _ => "unavailable",
    };
    let index = match state.index.health_check().await {
        Ok(true) => "connected",
        _ => "unavailable",
    };
    let queue = state.queue.stats().await?;

    let status = if database == "connected" && index == "connected" {
        "ok"
    } else {
        "degraded"
    };

    Ok(Json(ApiResponse::ok(DetailedHealthResponse {
        status: status.to_string(),
        database: database.to_string(),
        index: index.to_string(),
        queue,
    })))
}
