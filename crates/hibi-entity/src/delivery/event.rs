//! Wire event published when a reminder comes due.

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use hibi_core::types::id::{RecipientId, ScheduleId};

/// The minimal due-reminder event crossing the queue boundary.
///
/// A flat, independently-deserializable record: no references to live
/// objects, so the consumer can process it long after publication and on
/// a different execution context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DueReminder {
    /// The schedule that came due.
    pub schedule_id: ScheduleId,
    /// The recipient to deliver to.
    pub recipient_id: RecipientId,
    /// The schedule's configured time of day.
    pub scheduled_time: NaiveTime,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flat_wire_roundtrip() {
        let event = DueReminder {
            schedule_id: ScheduleId::new(),
            recipient_id: RecipientId::new(),
            scheduled_time: NaiveTime::from_hms_opt(9, 0, 0).expect("valid time"),
        };
        let json = serde_json::to_string(&event).expect("serialize");
        let parsed: DueReminder = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(parsed, event);
    }
}
