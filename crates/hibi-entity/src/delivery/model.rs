//! Delivery queue row model.

use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use hibi_core::types::id::{DeliveryId, RecipientId, ScheduleId};

/// What kind of delivery a queue row represents; plays the routing-key
/// role on the durable queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "delivery_kind", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum DeliveryKind {
    /// A scheduled reminder came due; payload is re-resolved from the
    /// recipient's topic at consume time.
    Reminder,
    /// A topic-triggered notification; carries its payload inline.
    Topic,
}

/// A queued delivery: one logical notification for one recipient.
///
/// Reminder rows carry exactly `{schedule_id, recipient_id, scheduled_time}`;
/// topic rows carry the serialized payload instead. Rows survive consumer
/// restarts and are claimed with `FOR UPDATE SKIP LOCKED`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Delivery {
    /// Unique delivery identifier.
    pub id: DeliveryId,
    /// Routing kind.
    pub kind: DeliveryKind,
    /// The schedule that produced this delivery (reminder rows only).
    pub schedule_id: Option<ScheduleId>,
    /// The recipient to deliver to.
    pub recipient_id: RecipientId,
    /// The schedule's configured time of day (reminder rows only).
    pub scheduled_time: Option<NaiveTime>,
    /// Serialized `NotificationPayload` (topic rows only).
    pub payload: Option<serde_json::Value>,
    /// Current status.
    pub status: super::status::DeliveryStatus,
    /// Number of processing attempts so far.
    pub attempts: i32,
    /// Maximum allowed attempts.
    pub max_attempts: i32,
    /// Error message from the last failed attempt.
    pub error_message: Option<String>,
    /// Worker that claimed this delivery.
    pub worker_id: Option<String>,
    /// When the delivery was claimed.
    pub claimed_at: Option<DateTime<Utc>>,
    /// When processing finished.
    pub completed_at: Option<DateTime<Utc>>,
    /// When the row was created.
    pub created_at: DateTime<Utc>,
    /// When the row was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Delivery {
    /// Check if another processing attempt is allowed.
    pub fn can_retry(&self) -> bool {
        self.attempts < self.max_attempts
    }
}
