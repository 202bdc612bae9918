//! Reminder schedule entity model.

use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use hibi_core::types::id::{RecipientId, ScheduleId};

/// The daily time of day at which a recipient's reminder fires.
///
/// One schedule exists per recipient (enforced by a uniqueness constraint).
/// `scheduled_time` has no date component; the reminder recurs daily.
/// Deactivating the recipient removes the schedule's time-index entry but
/// keeps this row for reactivation.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ReminderSchedule {
    /// Unique schedule identifier.
    pub id: ScheduleId,
    /// The recipient this schedule belongs to.
    pub recipient_id: RecipientId,
    /// Wall-clock time of day at which the reminder fires.
    pub scheduled_time: NaiveTime,
    /// When the schedule was created.
    pub created_at: DateTime<Utc>,
    /// When the schedule was last updated.
    pub updated_at: DateTime<Utc>,
}
