//! Durable delivery queue boundary.
//!
//! Producers publish with a single INSERT; a slow or stopped consumer
//! never blocks the poll tick, and queued deliveries survive restarts.

use hibi_core::result::AppResult;
use hibi_core::types::id::{DeliveryId, RecipientId};
use hibi_database::repositories::delivery::DeliveryRepository;
use hibi_entity::delivery::event::DueReminder;
use hibi_entity::delivery::model::Delivery;
use hibi_entity::delivery::status::DeliveryStatus;
use hibi_entity::notification::payload::NotificationPayload;

/// Queue depth broken down by status.
#[derive(Debug, Clone, Copy, serde::Serialize)]
pub struct QueueStats {
    /// Deliveries waiting to be claimed.
    pub pending: i64,
    /// Deliveries currently being processed.
    pub running: i64,
    /// Deliveries that finished successfully.
    pub completed: i64,
    /// Deliveries that exhausted their attempts.
    pub failed: i64,
}

/// Producer/consumer facade over the `delivery_queue` table.
#[derive(Debug, Clone)]
pub struct DeliveryQueue {
    repo: DeliveryRepository,
    max_attempts: i32,
}

impl DeliveryQueue {
    /// Create a queue facade.
    pub fn new(repo: DeliveryRepository, max_attempts: i32) -> Self {
        Self { repo, max_attempts }
    }

    /// Publish a due reminder. The row carries only the flat event; the
    /// payload is re-resolved at consume time.
    pub async fn publish_due(&self, event: &DueReminder) -> AppResult<Delivery> {
        self.repo.create_reminder(event, self.max_attempts).await
    }

    /// Publish a topic-triggered notification with its payload inline.
    pub async fn publish_topic(
        &self,
        recipient_id: RecipientId,
        payload: &NotificationPayload,
    ) -> AppResult<Delivery> {
        let payload = serde_json::to_value(payload)?;
        self.repo
            .create_topic(recipient_id, &payload, self.max_attempts)
            .await
    }

    /// Claim the next pending delivery for this worker, if any.
    pub async fn claim_next(&self, worker_id: &str) -> AppResult<Option<Delivery>> {
        self.repo.claim_next(worker_id).await
    }

    /// Mark a claimed delivery as completed.
    pub async fn complete(&self, id: DeliveryId) -> AppResult<()> {
        self.repo.mark_completed(id).await
    }

    /// Mark a claimed delivery as permanently failed.
    pub async fn fail(&self, id: DeliveryId, error_message: &str) -> AppResult<()> {
        self.repo.mark_failed(id, error_message).await
    }

    /// Return a claimed delivery to pending for another attempt.
    pub async fn release(&self, id: DeliveryId, error_message: &str) -> AppResult<()> {
        self.repo.release(id, error_message).await
    }

    /// Current queue depth per status.
    pub async fn stats(&self) -> AppResult<QueueStats> {
        Ok(QueueStats {
            pending: self.repo.count_by_status(DeliveryStatus::Pending).await?,
            running: self.repo.count_by_status(DeliveryStatus::Running).await?,
            completed: self.repo.count_by_status(DeliveryStatus::Completed).await?,
            failed: self.repo.count_by_status(DeliveryStatus::Failed).await?,
        })
    }
}
