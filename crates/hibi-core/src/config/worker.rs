//! Poller and delivery-worker configuration.

use serde::{Deserialize, Serialize};

/// Reminder poller and delivery worker configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerConfig {
    /// Whether the poller and delivery worker run in this process.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Sender strategy: `"queued"` (publish to the delivery queue) or
    /// `"direct"` (fan out in-process from the poller).
    #[serde(default = "default_sender")]
    pub sender: String,
    /// Cron expression for the poll tick (seconds granularity).
    #[serde(default = "default_poll_cron")]
    pub poll_cron: String,
    /// Half-width of the due window in minutes, around the tick's
    /// time of day.
    #[serde(default = "default_window_minutes")]
    pub window_minutes: u64,
    /// Number of concurrent delivery-processing tasks.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    /// Interval in seconds between delivery-queue polls.
    #[serde(default = "default_poll_interval")]
    pub poll_interval_seconds: u64,
    /// Maximum processing attempts per queued delivery.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: i32,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            sender: default_sender(),
            poll_cron: default_poll_cron(),
            window_minutes: default_window_minutes(),
            concurrency: default_concurrency(),
            poll_interval_seconds: default_poll_interval(),
            max_attempts: default_max_attempts(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_sender() -> String {
    "queued".to_string()
}

/// Every hour boundary.
fn default_poll_cron() -> String {
    "0 0 * * * *".to_string()
}

/// ±30 minutes: wide relative to the hourly tick so drift never loses
/// a reminder; re-selection across two ticks is acceptable.
fn default_window_minutes() -> u64 {
    30
}

fn default_concurrency() -> usize {
    4
}

fn default_poll_interval() -> u64 {
    5
}

fn default_max_attempts() -> i32 {
    3
}
