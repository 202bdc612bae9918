//! Reminder schedule repository implementation.

use chrono::NaiveTime;
use sqlx::PgPool;

use hibi_core::error::{AppError, ErrorKind};
use hibi_core::result::AppResult;
use hibi_core::types::id::{RecipientId, ScheduleId};
use hibi_entity::reminder::model::ReminderSchedule;

/// Repository for reminder schedule rows.
#[derive(Debug, Clone)]
pub struct ReminderScheduleRepository {
    pool: PgPool,
}

impl ReminderScheduleRepository {
    /// Create a new reminder schedule repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a schedule by ID.
    pub async fn find_by_id(&self, id: ScheduleId) -> AppResult<Option<ReminderSchedule>> {
        sqlx::query_as::<_, ReminderSchedule>("SELECT * FROM reminder_schedules WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find schedule", e))
    }

    /// Find the schedule belonging to a recipient (at most one).
    pub async fn find_by_recipient(
        &self,
        recipient_id: RecipientId,
    ) -> AppResult<Option<ReminderSchedule>> {
        sqlx::query_as::<_, ReminderSchedule>(
            "SELECT * FROM reminder_schedules WHERE recipient_id = $1",
        )
        .bind(recipient_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find schedule", e))
    }

    /// Create a schedule for a recipient.
    pub async fn create(
        &self,
        recipient_id: RecipientId,
        scheduled_time: NaiveTime,
    ) -> AppResult<ReminderSchedule> {
        sqlx::query_as::<_, ReminderSchedule>(
            "INSERT INTO reminder_schedules (recipient_id, scheduled_time) \
             VALUES ($1, $2) RETURNING *",
        )
        .bind(recipient_id)
        .bind(scheduled_time)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to create schedule", e))
    }

    /// Update the scheduled time. Surfaces NotFound if the row is missing —
    /// an update path must never silently create.
    pub async fn update_time(
        &self,
        id: ScheduleId,
        scheduled_time: NaiveTime,
    ) -> AppResult<ReminderSchedule> {
        sqlx::query_as::<_, ReminderSchedule>(
            "UPDATE reminder_schedules SET scheduled_time = $2, updated_at = NOW() \
             WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(scheduled_time)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to update schedule", e))?
        .ok_or_else(|| AppError::not_found(format!("Reminder schedule {id} not found")))
    }

    /// List all schedules whose recipient is currently active.
    ///
    /// Used to rebuild the time index from the relational source of truth.
    pub async fn find_all_active(&self) -> AppResult<Vec<ReminderSchedule>> {
        sqlx::query_as::<_, ReminderSchedule>(
            "SELECT s.* FROM reminder_schedules s \
             JOIN recipients r ON r.id = s.recipient_id \
             WHERE r.is_active",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to list active schedules", e)
        })
    }
}
