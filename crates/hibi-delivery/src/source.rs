//! Data-source seams the pipeline reads through.
//!
//! The fan-out and consumer logic never touch the database directly;
//! they read recipients, device tokens, schedules, and payloads through
//! these traits. Production wires in the repositories, tests wire in
//! fakes.

use std::fmt;

use async_trait::async_trait;

use hibi_core::result::AppResult;
use hibi_core::types::id::{RecipientId, ScheduleId, UserId};
use hibi_database::repositories::device::DeviceTokenRepository;
use hibi_database::repositories::recipient::RecipientRepository;
use hibi_database::repositories::reminder::ReminderScheduleRepository;
use hibi_entity::device::model::DeviceToken;
use hibi_entity::notification::payload::NotificationPayload;
use hibi_entity::notification::topic::NotificationTopic;
use hibi_entity::recipient::model::Recipient;
use hibi_entity::reminder::model::ReminderSchedule;

/// Resolves a recipient row by id.
#[async_trait]
pub trait RecipientSource: Send + Sync + fmt::Debug {
    /// Look up a recipient. `None` means the row no longer exists.
    async fn recipient(&self, id: RecipientId) -> AppResult<Option<Recipient>>;
}

/// Lists the active device tokens of a user.
#[async_trait]
pub trait DeviceTokenSource: Send + Sync + fmt::Debug {
    /// Every active token the user owns. An empty list is a valid state.
    async fn active_tokens(&self, user_id: UserId) -> AppResult<Vec<DeviceToken>>;
}

/// Resolves a reminder schedule by id.
#[async_trait]
pub trait ScheduleSource: Send + Sync + fmt::Debug {
    /// Look up a schedule. `None` means it was deleted since indexing.
    async fn schedule(&self, id: ScheduleId) -> AppResult<Option<ReminderSchedule>>;
}

/// Produces the notification content for a topic.
#[async_trait]
pub trait PayloadSource: Send + Sync + fmt::Debug {
    /// Build the payload delivered to every recipient of `topic`.
    async fn payload_for(&self, topic: NotificationTopic) -> AppResult<NotificationPayload>;
}

#[async_trait]
impl RecipientSource for RecipientRepository {
    async fn recipient(&self, id: RecipientId) -> AppResult<Option<Recipient>> {
        self.find_by_id(id).await
    }
}

#[async_trait]
impl DeviceTokenSource for DeviceTokenRepository {
    async fn active_tokens(&self, user_id: UserId) -> AppResult<Vec<DeviceToken>> {
        self.find_active_by_user(user_id).await
    }
}

#[async_trait]
impl ScheduleSource for ReminderScheduleRepository {
    async fn schedule(&self, id: ScheduleId) -> AppResult<Option<ReminderSchedule>> {
        self.find_by_id(id).await
    }
}
