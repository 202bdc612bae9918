//! Time-index abstraction for "what is due now" range queries.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveTime;

use crate::result::AppResult;
use crate::types::id::ScheduleId;

/// A sorted, score-keyed index mapping reminder schedules to their
/// time of day (scored in seconds since midnight).
///
/// The index is a transient projection of the relational schedule rows,
/// never the source of truth: it is rebuilt or kept in sync from schedule
/// writes and can be reconstructed at any time.
///
/// Implementations must be safe under concurrent access from request
/// handlers (`upsert`/`remove`) and the poller (`due_within`).
#[async_trait]
pub trait TimeIndex: Send + Sync + fmt::Debug {
    /// Insert the entry or move it to the score of `time`.
    ///
    /// Idempotent under repeated identical calls: the index holds at most
    /// one entry per schedule.
    async fn upsert(&self, schedule_id: ScheduleId, time: NaiveTime) -> AppResult<()>;

    /// Remove the entry if present. Absence is a no-op, not an error.
    async fn remove(&self, schedule_id: ScheduleId) -> AppResult<()>;

    /// Return all schedule ids whose score lies within
    /// `[score(now) - half_window, score(now) + half_window]`.
    ///
    /// Windows that straddle midnight wrap around to the other end of
    /// the day.
    async fn due_within(
        &self,
        now: NaiveTime,
        half_window: Duration,
    ) -> AppResult<Vec<ScheduleId>>;

    /// Check index connectivity/usability.
    async fn health_check(&self) -> AppResult<bool>;
}
