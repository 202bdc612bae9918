//! Topic broadcast handler.
//!
//! Lets collaborating services (recap generation, operational tooling)
//! push a topic notification through the same queue and fan-out the
//! scheduled reminders use.

use axum::Json;
use axum::extract::State;


use crate::error::ApiError;

use crate::dto::{ApiResponse, BroadcastRequest, BroadcastResponse};
use crate::state::AppState;

/// POST /api/broadcasts
pub async fn send_broadcast(
    State(state): State<AppState>,
    Json(req): Json<BroadcastRequest>,
) -> Result<Json<ApiResponse<BroadcastResponse>>, ApiError> {
    let enqueued = state
        .notification_service
        .broadcast(req.topic, &req.recipient_ids)
        .await?;

    Ok(Json(ApiResponse::ok(BroadcastResponse {
        requested: req.recipient_ids.len(),
        enqueued,
    })))
}
