//! Reminder settings handlers.

use axum::Json;
use axum::extract::State;


use crate::error::ApiError;

use crate::dto::{ApiResponse, ReminderResponse, SetReminderRequest};
use crate::extractors::AuthUser;
use crate::state::AppState;

/// PUT /api/reminders
pub async fn set_reminder(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(req): Json<SetReminderRequest>,
) -> Result<Json<ApiResponse<ReminderResponse>>, ApiError> {
    let time = req.parse_time()?;
    let setting = state
        .reminder_service
        .set_reminder(user_id, time, req.active)
        .await?;
    Ok(Json(ApiResponse::ok(setting.into())))
}

/// POST /api/reminders/read
pub async fn mark_reminder_read(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<serde_json::Value>, ApiError> {
    state.reminder_service.mark_read(user_id).await?;
    Ok(Json(
        serde_json::json!({ "success": true, "data": { "message": "Reminder acknowledged" } }),
    ))
}

/// GET /api/reminders
pub async fn get_reminder(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<ApiResponse<Option<ReminderResponse>>>, ApiError> {
    let setting = state.reminder_service.get_reminder(user_id).await?;
    Ok(Json(ApiResponse::ok(setting.map(Into::into))))
}
