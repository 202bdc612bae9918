//! Device token repository implementation.

use sqlx::PgPool;

use hibi_core::error::{AppError, ErrorKind};
use hibi_core::result::AppResult;
use hibi_core::types::id::{DeviceTokenId, UserId};
use hibi_entity::device::model::DeviceToken;
use hibi_entity::device::platform::DevicePlatform;

/// Repository for device push-token rows.
#[derive(Debug, Clone)]
pub struct DeviceTokenRepository {
    pool: PgPool,
}

impl DeviceTokenRepository {
    /// Create a new device token repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find the record for a `(user, device)` pair, active or not.
    pub async fn find_by_user_and_device(
        &self,
        user_id: UserId,
        device_id: &str,
    ) -> AppResult<Option<DeviceToken>> {
        sqlx::query_as::<_, DeviceToken>(
            "SELECT * FROM device_tokens WHERE user_id = $1 AND device_id = $2",
        )
        .bind(user_id)
        .bind(device_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find device token", e))
    }

    /// Create a token record for a newly registered device.
    pub async fn create(
        &self,
        user_id: UserId,
        device_id: &str,
        push_token: &str,
        device_type: DevicePlatform,
    ) -> AppResult<DeviceToken> {
        sqlx::query_as::<_, DeviceToken>(
            "INSERT INTO device_tokens (user_id, device_id, push_token, device_type) \
             VALUES ($1, $2, $3, $4) RETURNING *",
        )
        .bind(user_id)
        .bind(device_id)
        .bind(push_token)
        .bind(device_type)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to create device token", e)
        })
    }

    /// Replace the push token in place, reactivating the record if needed.
    pub async fn update_token(
        &self,
        id: DeviceTokenId,
        push_token: &str,
    ) -> AppResult<DeviceToken> {
        sqlx::query_as::<_, DeviceToken>(
            "UPDATE device_tokens SET push_token = $2, is_active = TRUE, \
             last_used_at = NOW(), updated_at = NOW() \
             WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(push_token)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to update device token", e)
        })?
        .ok_or_else(|| AppError::not_found(format!("Device token {id} not found")))
    }

    /// List every active token a user owns.
    pub async fn find_active_by_user(&self, user_id: UserId) -> AppResult<Vec<DeviceToken>> {
        sqlx::query_as::<_, DeviceToken>(
            "SELECT * FROM device_tokens WHERE user_id = $1 AND is_active \
             ORDER BY last_used_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list device tokens", e))
    }

    /// Flag a device's token inactive. Returns `true` if a row was updated.
    /// Records are never hard-deleted.
    pub async fn deactivate(&self, user_id: UserId, device_id: &str) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE device_tokens SET is_active = FALSE, updated_at = NOW() \
             WHERE user_id = $1 AND device_id = $2 AND is_active",
        )
        .bind(user_id)
        .bind(device_id)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to deactivate device token", e)
        })?;
        Ok(result.rows_affected() > 0)
    }
}
