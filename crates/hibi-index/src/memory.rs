//! In-process time-index implementation.
//!
//! A two-sided sorted structure: `by_schedule` answers "where is this
//! schedule currently scored" (for idempotent moves and removal) and
//! `by_score` answers the windowed range query. Both live under one lock
//! so they can never disagree.

use std::collections::{BTreeMap, HashMap};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveTime;

use hibi_core::error::AppError;
use hibi_core::result::AppResult;
use hibi_core::traits::time_index::TimeIndex;
use hibi_core::types::id::ScheduleId;
use hibi_core::types::time::{time_score, window_ranges};

#[derive(Debug, Default)]
struct Inner {
    /// Current score per schedule.
    by_schedule: HashMap<ScheduleId, u32>,
    /// Sorted (score, schedule) pairs for range scans.
    by_score: BTreeMap<(u32, ScheduleId), ()>,
}

/// In-memory time-index provider.
#[derive(Debug, Default)]
pub struct MemoryTimeIndex {
    inner: RwLock<Inner>,
}

impl MemoryTimeIndex {
    /// Create an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> AppResult<RwLockReadGuard<'_, Inner>> {
        self.inner
            .read()
            .map_err(|_| AppError::index("Time index lock poisoned"))
    }

    fn write(&self) -> AppResult<RwLockWriteGuard<'_, Inner>> {
        self.inner
            .write()
            .map_err(|_| AppError::index("Time index lock poisoned"))
    }

    /// Number of entries currently indexed.
    pub fn len(&self) -> AppResult<usize> {
        Ok(self.read()?.by_schedule.len())
    }
}

#[async_trait]
impl TimeIndex for MemoryTimeIndex {
    async fn upsert(&self, schedule_id: ScheduleId, time: NaiveTime) -> AppResult<()> {
        let score = time_score(time);
        let mut inner = self.write()?;

        if let Some(old) = inner.by_schedule.insert(schedule_id, score) {
            if old == score {
                return Ok(());
            }
            inner.by_score.remove(&(old, schedule_id));
        }
        inner.by_score.insert((score, schedule_id), ());
        Ok(())
    }

    async fn remove(&self, schedule_id: ScheduleId) -> AppResult<()> {
        let mut inner = self.write()?;
        if let Some(score) = inner.by_schedule.remove(&schedule_id) {
            inner.by_score.remove(&(score, schedule_id));
        }
        Ok(())
    }

    async fn due_within(
        &self,
        now: NaiveTime,
        half_window: Duration,
    ) -> AppResult<Vec<ScheduleId>> {
        let ranges = window_ranges(now, half_window.as_secs() as u32);
        let inner = self.read()?;

        let mut due = Vec::new();
        for (lo, hi) in ranges {
            let start = (lo, ScheduleId::from_uuid(uuid::Uuid::nil()));
            let end = (hi, ScheduleId::from_uuid(uuid::Uuid::max()));
            due.extend(inner.by_score.range(start..=end).map(|((_, id), ())| *id));
        }
        Ok(due)
    }

    async fn health_check(&self) -> AppResult<bool> {
        // Surfaces lock poisoning; an in-process index has no connectivity to check.
        self.read()?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).expect("valid time")
    }

    fn half_hour() -> Duration {
        Duration::from_secs(30 * 60)
    }

    #[tokio::test]
    async fn test_upsert_is_idempotent() {
        let index = MemoryTimeIndex::new();
        let id = ScheduleId::new();

        index.upsert(id, t(9, 0)).await.expect("upsert");
        index.upsert(id, t(9, 0)).await.expect("upsert again");

        assert_eq!(index.len().expect("len"), 1);
        let due = index.due_within(t(9, 0), half_hour()).await.expect("query");
        assert_eq!(due, vec![id]);
    }

    #[tokio::test]
    async fn test_upsert_moves_entry() {
        let index = MemoryTimeIndex::new();
        let id = ScheduleId::new();

        index.upsert(id, t(9, 0)).await.expect("upsert");
        index.upsert(id, t(21, 0)).await.expect("move");

        assert_eq!(index.len().expect("len"), 1);
        assert!(index.due_within(t(9, 0), half_hour()).await.expect("query").is_empty());
        assert_eq!(
            index.due_within(t(21, 0), half_hour()).await.expect("query"),
            vec![id]
        );
    }

    #[tokio::test]
    async fn test_window_correctness() {
        let index = MemoryTimeIndex::new();
        let id = ScheduleId::new();
        index.upsert(id, t(9, 0)).await.expect("upsert");

        // ±30min around 08:45 and 09:15 both cover 09:00.
        assert_eq!(index.due_within(t(8, 45), half_hour()).await.expect("query"), vec![id]);
        assert_eq!(index.due_within(t(9, 15), half_hour()).await.expect("query"), vec![id]);
        // 07:00 ± 30min does not.
        assert!(index.due_within(t(7, 0), half_hour()).await.expect("query").is_empty());
    }

    #[tokio::test]
    async fn test_remove_is_noop_when_absent() {
        let index = MemoryTimeIndex::new();
        index.remove(ScheduleId::new()).await.expect("remove absent");

        let id = ScheduleId::new();
        index.upsert(id, t(12, 0)).await.expect("upsert");
        index.remove(id).await.expect("remove");
        index.remove(id).await.expect("remove twice");
        assert_eq!(index.len().expect("len"), 0);
    }

    #[tokio::test]
    async fn test_window_straddles_midnight() {
        let index = MemoryTimeIndex::new();
        let late = ScheduleId::new();
        let early = ScheduleId::new();
        index.upsert(late, t(23, 50)).await.expect("upsert");
        index.upsert(early, t(0, 10)).await.expect("upsert");

        let due = index.due_within(t(0, 5), half_hour()).await.expect("query");
        assert!(due.contains(&late));
        assert!(due.contains(&early));

        let due = index.due_within(t(23, 45), half_hour()).await.expect("query");
        assert!(due.contains(&late));
        assert!(due.contains(&early));
    }

    #[tokio::test]
    async fn test_boundary_is_inclusive() {
        let index = MemoryTimeIndex::new();
        let id = ScheduleId::new();
        index.upsert(id, t(9, 30)).await.expect("upsert");

        // 09:00 + 30min reaches exactly 09:30.
        assert_eq!(index.due_within(t(9, 0), half_hour()).await.expect("query"), vec![id]);
    }
}
