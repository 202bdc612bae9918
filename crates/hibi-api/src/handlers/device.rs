//! Device registration handlers.

use axum::Json;
use axum::extract::{Path, State};

use hibi_core::error::AppError;

use crate::error::ApiError;

use crate::dto::{ApiResponse, DeviceResponse, RegisterDeviceRequest};
use crate::extractors::AuthUser;
use crate::state::AppState;

/// POST /api/devices
pub async fn register_device(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(req): Json<RegisterDeviceRequest>,
) -> Result<Json<ApiResponse<DeviceResponse>>, ApiError> {
    if req.device_id.trim().is_empty() {
        return Err(AppError::validation("device_id must not be empty").into());
    }
    if req.push_token.trim().is_empty() {
        return Err(AppError::validation("push_token must not be empty").into());
    }

    let token = state
        .device_service
        .register(user_id, &req.device_id, &req.push_token, req.platform)
        .await?;
    Ok(Json(ApiResponse::ok(token.into())))
}

/// DELETE /api/devices/{device_id}
pub async fn revoke_device(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(device_id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let revoked = state.device_service.revoke(user_id, &device_id).await?;
    if !revoked {
        return Err(AppError::not_found(format!("Device '{device_id}' not found")).into());
    }
    Ok(Json(
        serde_json::json!({ "success": true, "data": { "message": "Device revoked" } }),
    ))
}

/// GET /api/devices
pub async fn list_devices(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<ApiResponse<Vec<DeviceResponse>>>, ApiError> {
    let devices = state.device_service.list(user_id).await?;
    Ok(Json(ApiResponse::ok(
        devices.into_iter().map(Into::into).collect(),
    )))
}
