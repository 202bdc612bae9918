//! Persistence seams the services write through.
//!
//! Mirrors the read-side seams in `hibi_delivery::source`: the services
//! own the lifecycle decisions (no-op vs update vs create, row-then-index
//! ordering) and reach storage only through these traits. Production
//! wires in the repositories, tests wire in fakes.

use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, NaiveTime, Utc};

use hibi_core::result::AppResult;
use hibi_core::types::id::{DeviceTokenId, RecipientId, ScheduleId, UserId};
use hibi_database::repositories::device::DeviceTokenRepository;
use hibi_database::repositories::recipient::RecipientRepository;
use hibi_database::repositories::reminder::ReminderScheduleRepository;
use hibi_entity::device::model::DeviceToken;
use hibi_entity::device::platform::DevicePlatform;
use hibi_entity::notification::topic::NotificationTopic;
use hibi_entity::recipient::model::Recipient;
use hibi_entity::reminder::model::ReminderSchedule;

/// Recipient (topic subscription) rows.
#[async_trait]
pub trait RecipientStore: Send + Sync + fmt::Debug {
    /// Find a user's subscription to a topic.
    async fn find_by_user_and_topic(
        &self,
        user_id: UserId,
        topic: NotificationTopic,
    ) -> AppResult<Option<Recipient>>;

    /// Create a subscription.
    async fn create(
        &self,
        user_id: UserId,
        topic: NotificationTopic,
        is_active: bool,
    ) -> AppResult<Recipient>;

    /// Set the active flag. Returns the updated row.
    async fn set_active(&self, id: RecipientId, is_active: bool) -> AppResult<Recipient>;

    /// Mark the recipient's latest notification as acknowledged.
    async fn mark_read(&self, id: RecipientId, read_at: DateTime<Utc>) -> AppResult<()>;
}

/// Reminder schedule rows.
#[async_trait]
pub trait ScheduleStore: Send + Sync + fmt::Debug {
    /// Find the schedule belonging to a recipient (at most one).
    async fn find_by_recipient(
        &self,
        recipient_id: RecipientId,
    ) -> AppResult<Option<ReminderSchedule>>;

    /// Create a schedule for a recipient.
    async fn create(
        &self,
        recipient_id: RecipientId,
        scheduled_time: NaiveTime,
    ) -> AppResult<ReminderSchedule>;

    /// Update the scheduled time of an existing row.
    async fn update_time(
        &self,
        id: ScheduleId,
        scheduled_time: NaiveTime,
    ) -> AppResult<ReminderSchedule>;

    /// Every schedule whose recipient is currently active.
    async fn find_all_active(&self) -> AppResult<Vec<ReminderSchedule>>;
}

/// Device push-token rows.
#[async_trait]
pub trait DeviceStore: Send + Sync + fmt::Debug {
    /// Find the record for a `(user, device)` pair, active or not.
    async fn find_by_user_and_device(
        &self,
        user_id: UserId,
        device_id: &str,
    ) -> AppResult<Option<DeviceToken>>;

    /// Create a token record for a newly registered device.
    async fn create(
        &self,
        user_id: UserId,
        device_id: &str,
        push_token: &str,
        device_type: DevicePlatform,
    ) -> AppResult<DeviceToken>;

    /// Replace the push token in place, reactivating the record if needed.
    async fn update_token(&self, id: DeviceTokenId, push_token: &str) -> AppResult<DeviceToken>;

    /// Every active token a user owns.
    async fn find_active_by_user(&self, user_id: UserId) -> AppResult<Vec<DeviceToken>>;

    /// Flag a device's token inactive. Returns `true` if a row was updated.
    async fn deactivate(&self, user_id: UserId, device_id: &str) -> AppResult<bool>;
}

#[async_trait]
impl RecipientStore for RecipientRepository {
    async fn find_by_user_and_topic(
        &self,
        user_id: UserId,
        topic: NotificationTopic,
    ) -> AppResult<Option<Recipient>> {
        self.find_by_user_and_topic(user_id, topic).await
    }

    async fn create(
        &self,
        user_id: UserId,
        topic: NotificationTopic,
        is_active: bool,
    ) -> AppResult<Recipient> {
        self.create(user_id, topic, is_active).await
    }

    async fn set_active(&self, id: RecipientId, is_active: bool) -> AppResult<Recipient> {
        self.set_active(id, is_active).await
    }

    async fn mark_read(&self, id: RecipientId, read_at: DateTime<Utc>) -> AppResult<()> {
        self.mark_read(id, read_at).await
    }
}

#[async_trait]
impl ScheduleStore for ReminderScheduleRepository {
    async fn find_by_recipient(
        &self,
        recipient_id: RecipientId,
    ) -> AppResult<Option<ReminderSchedule>> {
        self.find_by_recipient(recipient_id).await
    }

    async fn create(
        &self,
        recipient_id: RecipientId,
        scheduled_time: NaiveTime,
    ) -> AppResult<ReminderSchedule> {
        self.create(recipient_id, scheduled_time).await
    }

    async fn update_time(
        &self,
        id: ScheduleId,
        scheduled_time: NaiveTime,
    ) -> AppResult<ReminderSchedule> {
        self.update_time(id, scheduled_time).await
    }

    async fn find_all_active(&self) -> AppResult<Vec<ReminderSchedule>> {
        self.find_all_active().await
    }
}

#[async_trait]
impl DeviceStore for DeviceTokenRepository {
    async fn find_by_user_and_device(
        &self,
        user_id: UserId,
        device_id: &str,
    ) -> AppResult<Option<DeviceToken>> {
        self.find_by_user_and_device(user_id, device_id).await
    }

    async fn create(
        &self,
        user_id: UserId,
        device_id: &str,
        push_token: &str,
        device_type: DevicePlatform,
    ) -> AppResult<DeviceToken> {
        self.create(user_id, device_id, push_token, device_type).await
    }

    async fn update_token(&self, id: DeviceTokenId, push_token: &str) -> AppResult<DeviceToken> {
        self.update_token(id, push_token).await
    }

    async fn find_active_by_user(&self, user_id: UserId) -> AppResult<Vec<DeviceToken>> {
        self.find_active_by_user(user_id).await
    }

    async fn deactivate(&self, user_id: UserId, device_id: &str) -> AppResult<bool> {
        self.deactivate(user_id, device_id).await
    }
}
