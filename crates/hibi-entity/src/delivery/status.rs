//! Delivery status enumeration.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Status of a queued delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "delivery_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum DeliveryStatus {
    /// Waiting to be claimed by a worker.
    Pending,
    /// Currently being processed by a worker.
    Running,
    /// Fan-out completed (best-effort; per-device failures do not fail it).
    Completed,
    /// Failed after all processing attempts.
    Failed,
}

impl DeliveryStatus {
    /// Check if the delivery is in a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    /// Return the status as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for DeliveryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
