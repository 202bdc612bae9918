//! Request and response DTOs.

use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use hibi_core::error::AppError;
use hibi_core::result::AppResult;
use hibi_core::types::id::RecipientId;
use hibi_delivery::queue::QueueStats;
use hibi_entity::device::model::DeviceToken;
use hibi_entity::device::platform::DevicePlatform;
use hibi_entity::notification::topic::NotificationTopic;
use hibi_service::reminder::ReminderSetting;

/// Standard success response wrapper.
#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse<T: Serialize> {
    /// Whether the request was successful.
    pub success: bool,
    /// Response data.
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Creates a successful response.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// PUT /api/reminders body.
#[derive(Debug, Clone, Deserialize)]
pub struct SetReminderRequest {
    /// Time of day as `HH:MM` (user-local wall clock).
    pub time: String,
    /// Whether the reminder should fire. Defaults to on.
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

impl SetReminderRequest {
    /// Parse and validate the `HH:MM` time field.
    pub fn parse_time(&self) -> AppResult<NaiveTime> {
        NaiveTime::parse_from_str(&self.time, "%H:%M")
            .map_err(|_| AppError::validation(format!("Invalid time '{}', expected HH:MM", self.time)))
    }
}

/// Reminder setting as reported to clients.
#[derive(Debug, Clone, Serialize)]
pub struct ReminderResponse {
    /// Configured time of day, `HH:MM`.
    pub time: String,
    /// Whether the reminder fires.
    pub active: bool,
}

impl From<ReminderSetting> for ReminderResponse {
    fn from(setting: ReminderSetting) -> Self {
        Self {
            time: setting.scheduled_time.format("%H:%M").to_string(),
            active: setting.is_active,
        }
    }
}

/// POST /api/devices body.
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterDeviceRequest {
    /// Client-chosen stable device identifier.
    pub device_id: String,
    /// Push-service token for this device.
    pub push_token: String,
    /// Device platform.
    pub platform: DevicePlatform,
}

/// Registered device as reported to clients. The push token itself is a
/// credential and is never echoed back.
#[derive(Debug, Clone, Serialize)]
pub struct DeviceResponse {
    /// Stable device identifier.
    pub device_id: String,
    /// Device platform.
    pub platform: DevicePlatform,
    /// Last time the token was registered or rotated.
    pub last_used_at: DateTime<Utc>,
}

impl From<DeviceToken> for DeviceResponse {
    fn from(token: DeviceToken) -> Self {
        Self {
            device_id: token.device_id,
            platform: token.device_type,
            last_used_at: token.last_used_at,
        }
    }
}

/// POST /api/broadcasts body.
#[derive(Debug, Clone, Deserialize)]
pub struct BroadcastRequest {
    /// Topic whose payload is delivered.
    pub topic: NotificationTopic,
    /// Recipients to enqueue the notification for.
    pub recipient_ids: Vec<RecipientId>,
}

/// POST /api/broadcasts response.
#[derive(Debug, Clone, Serialize)]
pub struct BroadcastResponse {
    /// Recipients in the request.
    pub requested: usize,
    /// Deliveries actually enqueued.
    pub enqueued: usize,
}

/// GET /api/health response.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Overall status.
    pub status: String,
    /// Service version.
    pub version: String,
}

/// GET /api/health/detailed response.
#[derive(Debug, Clone, Serialize)]
pub struct DetailedHealthResponse {
    /// Overall status.
    pub status: String,
    /// Database connectivity.
    pub database: String,
    /// Time-index connectivity.
    pub index: String,
    /// Delivery queue depth per status.
    pub queue: QueueStats,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_time_valid() {
        let req = SetReminderRequest {
            time: "21:30".to_string(),
            active: true,
        };
        let time = req.parse_time().expect("parse");
        assert_eq!(time, NaiveTime::from_hms_opt(21, 30, 0).expect("valid time"));
    }

    #[test]
    fn test_parse_time_rejects_garbage() {
        for bad in ["25:00", "9am", "", "12:60"] {
            let req = SetReminderRequest {
                time: bad.to_string(),
                active: true,
            };
            assert!(req.parse_time().is_err(), "accepted {bad:?}");
        }
    }
}
