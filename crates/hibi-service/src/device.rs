//! Device push-token lifecycle.

use std::sync::Arc;

use tracing::info;

use hibi_core::result::AppResult;
use hibi_core::types::id::UserId;
use hibi_entity::device::model::DeviceToken;
use hibi_entity::device::platform::DevicePlatform;

use crate::store::DeviceStore;

/// Manages the device tokens a user's pushes fan out to.
#[derive(Debug, Clone)]
pub struct DeviceService {
    devices: Arc<dyn DeviceStore>,
}

impl DeviceService {
    /// Create a new device service.
    pub fn new(devices: Arc<dyn DeviceStore>) -> Self {
        Self { devices }
    }

    /// Register a device, keyed by `(user, device)`.
    ///
    /// Re-registering with the same token is a no-op; a changed token is
    /// replaced in place (push services rotate tokens); a previously
    /// revoked device is reactivated.
    pub async fn register(
        &self,
        user_id: UserId,
        device_id: &str,
        push_token: &str,
        platform: DevicePlatform,
    ) -> AppResult<DeviceToken> {
        match self
            .devices
            .find_by_user_and_device(user_id, device_id)
            .await?
        {
            Some(existing) if existing.is_active && existing.push_token == push_token => {
                Ok(existing)
            }
            Some(existing) => {
                let updated = self.devices.update_token(existing.id, push_token).await?;
                info!(%user_id, device_id, "Device token rotated");
                Ok(updated)
            }
            None => {
                let created = self
                    .devices
                    .create(user_id, device_id, push_token, platform)
                    .await?;
                info!(%user_id, device_id, "Device registered");
                Ok(created)
            }
        }
    }

    /// Revoke a device's token. Returns `false` if no active record existed.
    pub async fn revoke(&self, user_id: UserId, device_id: &str) -> AppResult<bool> {
        let revoked = self.devices.deactivate(user_id, device_id).await?;
        if revoked {
            info!(%user_id, device_id, "Device revoked");
        }
        Ok(revoked)
    }

    /// List a user's active devices.
    pub async fn list(&self, user_id: UserId) -> AppResult<Vec<DeviceToken>> {
        self.devices.find_active_by_user(user_id).await
    }
}
