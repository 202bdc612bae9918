//! Reminder settings management.
//!
//! One write path owns both stores: the relational rows are updated
//! first (they are the source of truth), then the time index is brought
//! in line. If the index write fails the caller sees the error and can
//! retry; a rebuild also reconciles.

use std::sync::Arc;

use chrono::{NaiveTime, Utc};
use serde::Serialize;
use tracing::info;

use hibi_core::error::AppError;
use hibi_core::result::AppResult;
use hibi_core::traits::time_index::TimeIndex;
use hibi_core::types::id::UserId;
use hibi_entity::notification::topic::NotificationTopic;

use crate::store::{RecipientStore, ScheduleStore};

/// A user's reminder setting as the API reports it.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ReminderSetting {
    /// Configured time of day.
    pub scheduled_time: NaiveTime,
    /// Whether the reminder fires.
    pub is_active: bool,
}

/// Manages per-user diary reminder settings.
#[derive(Debug, Clone)]
pub struct ReminderService {
    recipients: Arc<dyn RecipientStore>,
    schedules: Arc<dyn ScheduleStore>,
    index: Arc<dyn TimeIndex>,
}

impl ReminderService {
    /// Create a new reminder service.
    pub fn new(
        recipients: Arc<dyn RecipientStore>,
        schedules: Arc<dyn ScheduleStore>,
        index: Arc<dyn TimeIndex>,
    ) -> Self {
        Self {
            recipients,
            schedules,
            index,
        }
    }

    /// Set (create or update) a user's diary reminder.
    ///
    /// Idempotent: calling with the current time and flag changes nothing.
    /// The recipient and schedule rows are created on first use.
    pub async fn set_reminder(
        &self,
        user_id: UserId,
        time: NaiveTime,
        activate: bool,
    ) -> AppResult<ReminderSetting> {
        let recipient = match self
            .recipients
            .find_by_user_and_topic(user_id, NotificationTopic::DiaryReminder)
            .await?
        {
            Some(r) if r.is_active == activate => r,
            Some(r) => self.recipients.set_active(r.id, activate).await?,
            None => {
                self.recipients
                    .create(user_id, NotificationTopic::DiaryReminder, activate)
                    .await?
            }
        };

        let schedule = match self.schedules.find_by_recipient(recipient.id).await? {
            Some(s) if s.scheduled_time == time => s,
            Some(s) => self.schedules.update_time(s.id, time).await?,
            None => self.schedules.create(recipient.id, time).await?,
        };

        // Rows first, index second.
        if activate {
            self.index
                .upsert(schedule.id, schedule.scheduled_time)
                .await?;
        } else {
            self.index.remove(schedule.id).await?;
        }

        info!(
            %user_id,
            time = %schedule.scheduled_time,
            active = recipient.is_active,
            "Reminder setting updated"
        );

        Ok(ReminderSetting {
            scheduled_time: schedule.scheduled_time,
            is_active: recipient.is_active,
        })
    }

    /// Fetch a user's reminder setting, if one was ever configured.
    pub async fn get_reminder(&self, user_id: UserId) -> AppResult<Option<ReminderSetting>> {
        let Some(recipient) = self
            .recipients
            .find_by_user_and_topic(user_id, NotificationTopic::DiaryReminder)
            .await?
        else {
            return Ok(None);
        };

        let Some(schedule) = self.schedules.find_by_recipient(recipient.id).await? else {
            return Ok(None);
        };

        Ok(Some(ReminderSetting {
            scheduled_time: schedule.scheduled_time,
            is_active: recipient.is_active,
        }))
    }

    /// Acknowledge the user's latest reminder notification.
    pub async fn mark_read(&self, user_id: UserId) -> AppResult<()> {
        let recipient = self
            .recipients
            .find_by_user_and_topic(user_id, NotificationTopic::DiaryReminder)
            .await?
            .ok_or_else(|| AppError::not_found("No reminder subscription for user"))?;

        self.recipients.mark_read(recipient.id, Utc::now()).await
    }

    /// Rebuild the time index from the relational rows.
    ///
    /// Run at startup so a fresh in-memory index (or a flushed Redis one)
    /// reflects every active schedule. Returns the number of entries.
    pub async fn rebuild_index(&self) -> AppResult<usize> {
        let schedules = self.schedules.find_all_active().await?;
        let count = schedules.len();

        for schedule in schedules {
            self.index
                .upsert(schedule.id, schedule.scheduled_time)
                .await?;
        }

        info!(count, "Time index rebuilt from schedules");
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::time::Duration;

    use async_trait::async_trait;
    use chrono::{DateTime, Utc};
    use hibi_core::types::id::{RecipientId, ScheduleId};
    use hibi_core::types::time::{ranges_contain, time_score, window_ranges};
    use hibi_entity::recipient::model::Recipient;
    use hibi_entity::reminder::model::ReminderSchedule;

    use super::*;

    #[derive(Debug, Default)]
    struct FakeRecipients {
        rows: Mutex<HashMap<RecipientId, Recipient>>,
    }

    #[async_trait]
    impl RecipientStore for FakeRecipients {
        async fn find_by_user_and_topic(
            &self,
            user_id: UserId,
            topic: NotificationTopic,
        ) -> AppResult<Option<Recipient>> {
            Ok(self
                .rows
                .lock()
                .expect("lock")
                .values()
                .find(|r| r.user_id == user_id && r.topic == topic)
                .cloned())
        }

        async fn create(
            &self,
            user_id: UserId,
            topic: NotificationTopic,
            is_active: bool,
        ) -> AppResult<Recipient> {
            let recipient = Recipient {
                id: RecipientId::new(),
                user_id,
                topic,
                is_active,
                is_read: false,
                read_at: None,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            };
            self.rows
                .lock()
                .expect("lock")
                .insert(recipient.id, recipient.clone());
            Ok(recipient)
        }

        async fn set_active(&self, id: RecipientId, is_active: bool) -> AppResult<Recipient> {
            let mut rows = self.rows.lock().expect("lock");
            let recipient = rows
                .get_mut(&id)
                .ok_or_else(|| AppError::not_found("recipient"))?;
            recipient.is_active = is_active;
            Ok(recipient.clone())
        }

        async fn mark_read(&self, id: RecipientId, read_at: DateTime<Utc>) -> AppResult<()> {
            let mut rows = self.rows.lock().expect("lock");
            let recipient = rows
                .get_mut(&id)
                .ok_or_else(|| AppError::not_found("recipient"))?;
            recipient.is_read = true;
            recipient.read_at = Some(read_at);
            Ok(())
        }
    }

    #[derive(Debug, Default)]
    struct FakeSchedules {
        rows: Mutex<HashMap<ScheduleId, ReminderSchedule>>,
    }

    impl FakeSchedules {
        fn row_count(&self) -> usize {
            self.rows.lock().expect("lock").len()
        }
    }

    #[async_trait]
    impl ScheduleStore for FakeSchedules {
        async fn find_by_recipient(
            &self,
            recipient_id: RecipientId,
        ) -> AppResult<Option<ReminderSchedule>> {
            Ok(self
                .rows
                .lock()
                .expect("lock")
                .values()
                .find(|s| s.recipient_id == recipient_id)
                .cloned())
        }

        async fn create(
            &self,
            recipient_id: RecipientId,
            scheduled_time: NaiveTime,
        ) -> AppResult<ReminderSchedule> {
            let schedule = ReminderSchedule {
                id: ScheduleId::new(),
                recipient_id,
                scheduled_time,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            };
            self.rows
                .lock()
                .expect("lock")
                .insert(schedule.id, schedule.clone());
            Ok(schedule)
        }

        async fn update_time(
            &self,
            id: ScheduleId,
            scheduled_time: NaiveTime,
        ) -> AppResult<ReminderSchedule> {
            let mut rows = self.rows.lock().expect("lock");
            let schedule = rows
                .get_mut(&id)
                .ok_or_else(|| AppError::not_found("schedule"))?;
            schedule.scheduled_time = scheduled_time;
            Ok(schedule.clone())
        }

        async fn find_all_active(&self) -> AppResult<Vec<ReminderSchedule>> {
            Ok(self.rows.lock().expect("lock").values().cloned().collect())
        }
    }

    #[derive(Debug, Default)]
    struct FakeIndex {
        entries: Mutex<HashMap<ScheduleId, u32>>,
    }

    #[async_trait]
    impl TimeIndex for FakeIndex {
        async fn upsert(&self, schedule_id: ScheduleId, time: NaiveTime) -> AppResult<()> {
            self.entries
                .lock()
                .expect("lock")
                .insert(schedule_id, time_score(time));
            Ok(())
        }

        async fn remove(&self, schedule_id: ScheduleId) -> AppResult<()> {
            self.entries.lock().expect("lock").remove(&schedule_id);
            Ok(())
        }

        async fn due_within(
            &self,
            now: NaiveTime,
            half_window: Duration,
        ) -> AppResult<Vec<ScheduleId>> {
            let ranges = window_ranges(now, half_window.as_secs() as u32);
            Ok(self
                .entries
                .lock()
                .expect("lock")
                .iter()
                .filter(|&(_, &score)| ranges_contain(&ranges, score))
                .map(|(&id, _)| id)
                .collect())
        }

        async fn health_check(&self) -> AppResult<bool> {
            Ok(true)
        }
    }

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).expect("valid time")
    }

    fn service() -> (ReminderService, Arc<FakeSchedules>, Arc<FakeIndex>) {
        let schedules = Arc::new(FakeSchedules::default());
        let index = Arc::new(FakeIndex::default());
        let service = ReminderService::new(
            Arc::new(FakeRecipients::default()),
            schedules.clone(),
            index.clone(),
        );
        (service, schedules, index)
    }

    #[tokio::test]
    async fn test_activation_creates_row_and_index_entry() {
        let (service, schedules, index) = service();
        let user_id = UserId::new();

        let setting = service
            .set_reminder(user_id, t(9, 0), true)
            .await
            .expect("set");

        assert!(setting.is_active);
        assert_eq!(schedules.row_count(), 1);
        let due = index
            .due_within(t(9, 0), Duration::from_secs(1800))
            .await
            .expect("query");
        assert_eq!(due.len(), 1);
    }

    #[tokio::test]
    async fn test_deactivation_removes_index_entry_but_keeps_row() {
        let (service, schedules, index) = service();
        let user_id = UserId::new();

        service
            .set_reminder(user_id, t(9, 0), true)
            .await
            .expect("activate");
        service
            .set_reminder(user_id, t(9, 0), false)
            .await
            .expect("deactivate");

        // The schedule row survives for reactivation; only the index entry goes.
        assert_eq!(schedules.row_count(), 1);
        let due = index
            .due_within(t(9, 0), Duration::from_secs(1800))
            .await
            .expect("query");
        assert!(due.is_empty());

        let setting = service
            .get_reminder(user_id)
            .await
            .expect("get")
            .expect("setting");
        assert!(!setting.is_active);
        assert_eq!(setting.scheduled_time, t(9, 0));
    }

    #[tokio::test]
    async fn test_reactivation_restores_index_entry() {
        let (service, schedules, index) = service();
        let user_id = UserId::new();

        service
            .set_reminder(user_id, t(9, 0), true)
            .await
            .expect("activate");
        service
            .set_reminder(user_id, t(9, 0), false)
            .await
            .expect("deactivate");
        service
            .set_reminder(user_id, t(21, 0), true)
            .await
            .expect("reactivate");

        // Still one row, now indexed at the new time.
        assert_eq!(schedules.row_count(), 1);
        let due = index
            .due_within(t(21, 0), Duration::from_secs(1800))
            .await
            .expect("query");
        assert_eq!(due.len(), 1);
        assert!(
            index
                .due_within(t(9, 0), Duration::from_secs(1800))
                .await
                .expect("query")
                .is_empty()
        );
    }

    #[tokio::test]
    async fn test_set_reminder_is_idempotent() {
        let (service, schedules, index) = service();
        let user_id = UserId::new();

        service
            .set_reminder(user_id, t(9, 0), true)
            .await
            .expect("set");
        service
            .set_reminder(user_id, t(9, 0), true)
            .await
            .expect("set again");

        assert_eq!(schedules.row_count(), 1);
        assert_eq!(index.entries.lock().expect("lock").len(), 1);
    }

    #[tokio::test]
    async fn test_rebuild_index_restores_entries() {
        let (service, _schedules, index) = service();
        let user_id = UserId::new();

        service
            .set_reminder(user_id, t(9, 0), true)
            .await
            .expect("set");
        index.entries.lock().expect("lock").clear();

        let count = service.rebuild_index().await.expect("rebuild");
        assert_eq!(count, 1);
        assert_eq!(index.entries.lock().expect("lock").len(), 1);
    }

    #[tokio::test]
    async fn test_mark_read_requires_subscription() {
        let (service, _schedules, _index) = service();
        let err = service.mark_read(UserId::new()).await.expect_err("no sub");
        assert_eq!(err.kind, hibi_core::error::ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_mark_read_acknowledges() {
        let recipients = Arc::new(FakeRecipients::default());
        let service = ReminderService::new(
            recipients.clone(),
            Arc::new(FakeSchedules::default()),
            Arc::new(FakeIndex::default()),
        );
        let user_id = UserId::new();

        service
            .set_reminder(user_id, t(9, 0), true)
            .await
            .expect("set");
        service.mark_read(user_id).await.expect("mark read");

        let rows = recipients.rows.lock().expect("lock");
        let recipient = rows.values().next().expect("recipient");
        assert!(recipient.is_read);
        assert!(recipient.read_at.is_some());
    }
}
