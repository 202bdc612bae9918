//! Delivery queue repository implementation.
//!
//! The `delivery_queue` table is the durable queue boundary: publishing is
//! a single INSERT, and consumers claim rows with `FOR UPDATE SKIP LOCKED`
//! so multiple workers can drain the queue concurrently without double
//! processing.

use sqlx::PgPool;

use hibi_core::error::{AppError, ErrorKind};
use hibi_core::result::AppResult;
use hibi_core::types::id::{DeliveryId, RecipientId};
use hibi_entity::delivery::event::DueReminder;
use hibi_entity::delivery::model::Delivery;
use hibi_entity::delivery::status::DeliveryStatus;

/// Repository for the durable delivery queue.
#[derive(Debug, Clone)]
pub struct DeliveryRepository {
    pool: PgPool,
}

impl DeliveryRepository {
    /// Create a new delivery repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a due-reminder delivery.
    pub async fn create_reminder(
        &self,
        event: &DueReminder,
        max_attempts: i32,
    ) -> AppResult<Delivery> {
        sqlx::query_as::<_, Delivery>(
            "INSERT INTO delivery_queue (kind, schedule_id, recipient_id, scheduled_time, max_attempts) \
             VALUES ('reminder', $1, $2, $3, $4) RETURNING *",
        )
        .bind(event.schedule_id)
        .bind(event.recipient_id)
        .bind(event.scheduled_time)
        .bind(max_attempts)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to enqueue reminder", e))
    }

    /// Insert a topic-triggered delivery carrying its payload inline.
    pub async fn create_topic(
        &self,
        recipient_id: RecipientId,
        payload: &serde_json::Value,
        max_attempts: i32,
    ) -> AppResult<Delivery> {
        sqlx::query_as::<_, Delivery>(
            "INSERT INTO delivery_queue (kind, recipient_id, payload, max_attempts) \
             VALUES ('topic', $1, $2, $3) RETURNING *",
        )
        .bind(recipient_id)
        .bind(payload)
        .bind(max_attempts)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to enqueue delivery", e))
    }

    /// Claim the next pending delivery (SKIP LOCKED for concurrency).
    ///
    /// The claim increments `attempts` and moves the row to `running` in
    /// one statement, so a crashed worker leaves an attributable row rather
    /// than a lost message.
    pub async fn claim_next(&self, worker_id: &str) -> AppResult<Option<Delivery>> {
        sqlx::query_as::<_, Delivery>(
            "UPDATE delivery_queue SET status = 'running', claimed_at = NOW(), \
             worker_id = $1, attempts = attempts + 1, updated_at = NOW() \
             WHERE id = ( \
                SELECT id FROM delivery_queue \
                WHERE status = 'pending' \
                ORDER BY created_at ASC \
                FOR UPDATE SKIP LOCKED \
                LIMIT 1 \
             ) RETURNING *",
        )
        .bind(worker_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to claim delivery", e))
    }

    /// Mark a delivery as completed.
    pub async fn mark_completed(&self, id: DeliveryId) -> AppResult<()> {
        sqlx::query(
            "UPDATE delivery_queue SET status = 'completed', completed_at = NOW(), \
             updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to complete delivery", e))?;
        Ok(())
    }

    /// Mark a delivery as failed.
    pub async fn mark_failed(&self, id: DeliveryId, error_message: &str) -> AppResult<()> {
        sqlx::query(
            "UPDATE delivery_queue SET status = 'failed', error_message = $2, \
             completed_at = NOW(), updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(error_message)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to fail delivery", e))?;
        Ok(())
    }

    /// Return a running delivery to pending for another attempt.
    pub async fn release(&self, id: DeliveryId, error_message: &str) -> AppResult<()> {
        sqlx::query(
            "UPDATE delivery_queue SET status = 'pending', error_message = $2, \
             worker_id = NULL, claimed_at = NULL, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(error_message)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to release delivery", e))?;
        Ok(())
    }

    /// Count deliveries in a given status.
    pub async fn count_by_status(&self, status: DeliveryStatus) -> AppResult<i64> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM delivery_queue WHERE status = $1")
            .bind(status)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count deliveries", e))
    }
}
