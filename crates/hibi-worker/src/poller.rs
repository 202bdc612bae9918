//! Reminder poller — periodic tick that finds due reminders.
//!
//! Ticks are stateless: each one queries the time index around the
//! current wall-clock time and hands every match to the sender. The
//! window is deliberately wider than the tick period, so a reminder may
//! be selected by two adjacent ticks; downstream delivery tolerates
//! that, losing one is the failure mode to avoid.

use std::sync::Arc;
use std::time::Duration;

use chrono::Local;
use tokio::sync::Mutex;
use tokio_cron_scheduler::{Job as CronJob, JobScheduler};
use tracing::{debug, error, info, warn};

use hibi_core::error::AppError;
use hibi_core::result::AppResult;
use hibi_core::traits::time_index::TimeIndex;
use hibi_delivery::sender::ReminderSender;
use hibi_delivery::source::ScheduleSource;
use hibi_entity::delivery::event::DueReminder;

/// Periodic poller over the time index.
#[derive(Debug)]
pub struct ReminderPoller {
    index: Arc<dyn TimeIndex>,
    schedules: Arc<dyn ScheduleSource>,
    sender: Arc<dyn ReminderSender>,
    half_window: Duration,
    /// Held for the duration of a tick so overlapping ticks skip.
    tick_guard: Mutex<()>,
}

impl ReminderPoller {
    /// Create a poller with a `±window_minutes` due window.
    pub fn new(
        index: Arc<dyn TimeIndex>,
        schedules: Arc<dyn ScheduleSource>,
        sender: Arc<dyn ReminderSender>,
        window_minutes: u64,
    ) -> Self {
        Self {
            index,
            schedules,
            sender,
            half_window: Duration::from_secs(window_minutes * 60),
            tick_guard: Mutex::new(()),
        }
    }

    /// Run one poll tick. Returns the number of reminders dispatched.
    ///
    /// A tick that finds a previous tick still running returns without
    /// doing anything; the wide window means the next tick covers for it.
    pub async fn tick(&self) -> AppResult<usize> {
        let Ok(_guard) = self.tick_guard.try_lock() else {
            warn!("Previous poll tick still running, skipping this one");
            return Ok(0);
        };

        let now = Local::now().time();
        let due = self.index.due_within(now, self.half_window).await?;

        if due.is_empty() {
            debug!(%now, "Poll tick found no due reminders");
            return Ok(0);
        }

        let mut dispatched = 0;
        for schedule_id in due {
            let schedule = match self.schedules.schedule(schedule_id).await {
                Ok(Some(schedule)) => schedule,
                Ok(None) => {
                    // Deleted since it was indexed; the index catches up on
                    // the next rebuild.
                    debug!(%schedule_id, "Indexed schedule no longer exists, skipping");
                    continue;
                }
                Err(e) => {
                    error!(%schedule_id, error = %e, "Failed to load due schedule");
                    continue;
                }
            };

            let event = DueReminder {
                schedule_id: schedule.id,
                recipient_id: schedule.recipient_id,
                scheduled_time: schedule.scheduled_time,
            };

            match self.sender.send_due(event).await {
                Ok(()) => dispatched += 1,
                Err(e) => {
                    error!(%schedule_id, error = %e, "Failed to dispatch due reminder");
                }
            }
        }

        info!(%now, dispatched, "Poll tick finished");
        Ok(dispatched)
    }
}

/// Cron wrapper that fires the poller on a schedule.
pub struct PollScheduler {
    scheduler: JobScheduler,
}

impl std::fmt::Debug for PollScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PollScheduler").finish()
    }
}

impl PollScheduler {
    /// Create a new scheduler.
    pub async fn new() -> AppResult<Self> {
        let scheduler = JobScheduler::new()
            .await
            .map_err(|e| AppError::internal(format!("Failed to create scheduler: {e}")))?;
        Ok(Self { scheduler })
    }

    /// Register the reminder poll tick under the given cron expression.
    pub async fn register_poll(
        &self,
        poller: Arc<ReminderPoller>,
        cron: &str,
    ) -> AppResult<()> {
        let job = CronJob::new_async(cron, move |_uuid, _lock| {
            let poller = Arc::clone(&poller);
            Box::pin(async move {
                if let Err(e) = poller.tick().await {
                    error!(error = %e, "Poll tick failed");
                }
            })
        })
        .map_err(|e| AppError::internal(format!("Failed to create poll schedule: {e}")))?;

        self.scheduler
            .add(job)
            .await
            .map_err(|e| AppError::internal(format!("Failed to add poll schedule: {e}")))?;

        info!(cron, "Registered reminder poll tick");
        Ok(())
    }

    /// Start the scheduler.
    pub async fn start(&self) -> AppResult<()> {
        self.scheduler
            .start()
            .await
            .map_err(|e| AppError::internal(format!("Failed to start scheduler: {e}")))?;
        info!("Poll scheduler started");
        Ok(())
    }

    /// Shut the scheduler down.
    pub async fn shutdown(&self) -> AppResult<()> {
        let mut scheduler = self.scheduler.clone();
        scheduler
            .shutdown()
            .await
            .map_err(|e| AppError::internal(format!("Failed to shutdown scheduler: {e}")))?;
        info!("Poll scheduler shut down");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex as StdMutex;

    use async_trait::async_trait;
    use chrono::NaiveTime;
    use hibi_core::types::id::{RecipientId, ScheduleId};
    use hibi_entity::reminder::model::ReminderSchedule;

    use super::*;

    #[derive(Debug)]
    struct FixedIndex {
        ids: Vec<ScheduleId>,
    }

    #[async_trait]
    impl TimeIndex for FixedIndex {
        async fn upsert(&self, _id: ScheduleId, _time: NaiveTime) -> AppResult<()> {
            Ok(())
        }

        async fn remove(&self, _id: ScheduleId) -> AppResult<()> {
            Ok(())
        }

        async fn due_within(
            &self,
            _now: NaiveTime,
            _half_window: Duration,
        ) -> AppResult<Vec<ScheduleId>> {
            Ok(self.ids.clone())
        }

        async fn health_check(&self) -> AppResult<bool> {
            Ok(true)
        }
    }

    #[derive(Debug, Default)]
    struct FakeSchedules {
        by_id: HashMap<ScheduleId, ReminderSchedule>,
    }

    #[async_trait]
    impl ScheduleSource for FakeSchedules {
        async fn schedule(&self, id: ScheduleId) -> AppResult<Option<ReminderSchedule>> {
            Ok(self.by_id.get(&id).cloned())
        }
    }

    #[derive(Debug, Default)]
    struct RecordingSender {
        events: StdMutex<Vec<DueReminder>>,
        fail: bool,
    }

    #[async_trait]
    impl ReminderSender for RecordingSender {
        async fn send_due(&self, event: DueReminder) -> AppResult<()> {
            if self.fail {
                return Err(AppError::queue("sender unavailable"));
            }
            self.events.lock().expect("lock").push(event);
            Ok(())
        }
    }

    fn schedule(id: ScheduleId) -> ReminderSchedule {
        ReminderSchedule {
            id,
            recipient_id: RecipientId::new(),
            scheduled_time: NaiveTime::from_hms_opt(9, 0, 0).expect("valid time"),
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_tick_dispatches_due_schedules() {
        let a = ScheduleId::new();
        let b = ScheduleId::new();
        let mut by_id = HashMap::new();
        by_id.insert(a, schedule(a));
        by_id.insert(b, schedule(b));

        let sender = Arc::new(RecordingSender::default());
        let poller = ReminderPoller::new(
            Arc::new(FixedIndex { ids: vec![a, b] }),
            Arc::new(FakeSchedules { by_id }),
            sender.clone(),
            30,
        );

        let dispatched = poller.tick().await.expect("tick");
        assert_eq!(dispatched, 2);
        assert_eq!(sender.events.lock().expect("lock").len(), 2);
    }

    #[tokio::test]
    async fn test_missing_schedule_is_skipped() {
        let known = ScheduleId::new();
        let deleted = ScheduleId::new();
        let mut by_id = HashMap::new();
        by_id.insert(known, schedule(known));

        let sender = Arc::new(RecordingSender::default());
        let poller = ReminderPoller::new(
            Arc::new(FixedIndex {
                ids: vec![deleted, known],
            }),
            Arc::new(FakeSchedules { by_id }),
            sender.clone(),
            30,
        );

        let dispatched = poller.tick().await.expect("tick");
        assert_eq!(dispatched, 1);
        let events = sender.events.lock().expect("lock");
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].schedule_id, known);
    }

    #[tokio::test]
    async fn test_sender_failure_does_not_abort_tick() {
        let a = ScheduleId::new();
        let mut by_id = HashMap::new();
        by_id.insert(a, schedule(a));

        let sender = Arc::new(RecordingSender {
            events: StdMutex::new(Vec::new()),
            fail: true,
        });
        let poller = ReminderPoller::new(
            Arc::new(FixedIndex { ids: vec![a] }),
            Arc::new(FakeSchedules { by_id }),
            sender,
            30,
        );

        // The failed dispatch is logged; the tick itself succeeds.
        let dispatched = poller.tick().await.expect("tick");
        assert_eq!(dispatched, 0);
    }
}
