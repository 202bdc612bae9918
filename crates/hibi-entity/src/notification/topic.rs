//! Notification topic enumeration.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A payload-producing notification topic a user can subscribe to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "notification_topic", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum NotificationTopic {
    /// The daily "write your diary" reminder.
    DiaryReminder,
    /// The weekly emotion/entry recap.
    WeeklyRecap,
}

impl NotificationTopic {
    /// Return the topic as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DiaryReminder => "diary_reminder",
            Self::WeeklyRecap => "weekly_recap",
        }
    }
}

impl fmt::Display for NotificationTopic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
