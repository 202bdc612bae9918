//! Device token entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use hibi_core::types::id::{DeviceTokenId, UserId};

use super::platform::DevicePlatform;

/// A push token registered for one of a user's devices.
///
/// Uniqueness is on `(user_id, device_id)`: re-registering the same device
/// updates the existing record in place rather than duplicating it. Tokens
/// are flagged inactive (never hard-deleted) when superseded or revoked.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DeviceToken {
    /// Unique token record identifier.
    pub id: DeviceTokenId,
    /// The owning user.
    pub user_id: UserId,
    /// Client-generated stable device identifier.
    pub device_id: String,
    /// The push-service token for this device.
    pub push_token: String,
    /// Platform the token was issued for.
    pub device_type: DevicePlatform,
    /// Whether this token currently receives deliveries.
    pub is_active: bool,
    /// When the token was last re-registered or used.
    pub last_used_at: DateTime<Utc>,
    /// When the record was created.
    pub created_at: DateTime<Utc>,
    /// When the record was last updated.
    pub updated_at: DateTime<Utc>,
}
