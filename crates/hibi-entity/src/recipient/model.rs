//! Recipient entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use hibi_core::types::id::{RecipientId, UserId};

use crate::notification::topic::NotificationTopic;

/// A user's subscription to a notification topic.
///
/// `is_active` gates whether this recipient currently receives deliveries;
/// `is_read`/`read_at` track acknowledgment and are orthogonal to delivery.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Recipient {
    /// Unique recipient identifier.
    pub id: RecipientId,
    /// The subscribing user.
    pub user_id: UserId,
    /// The subscribed topic.
    pub topic: NotificationTopic,
    /// Whether deliveries are currently enabled for this recipient.
    pub is_active: bool,
    /// Whether the user has acknowledged the latest notification.
    pub is_read: bool,
    /// When the latest notification was acknowledged.
    pub read_at: Option<DateTime<Utc>>,
    /// When the subscription was created.
    pub created_at: DateTime<Utc>,
    /// When the subscription was last updated.
    pub updated_at: DateTime<Utc>,
}
