//! Queue-publishing sender strategy.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use hibi_core::result::AppResult;
use hibi_entity::delivery::event::DueReminder;

use crate::queue::DeliveryQueue;
use crate::sender::ReminderSender;

/// Publishes due reminders to the durable delivery queue.
///
/// Publishing is one INSERT, so the tick cost stays flat no matter how
/// slow the consumer is; the queue consumer does the actual fan-out.
#[derive(Debug, Clone)]
pub struct QueuedSender {
    queue: Arc<DeliveryQueue>,
}

impl QueuedSender {
    /// Create a queued sender over the delivery queue.
    pub fn new(queue: Arc<DeliveryQueue>) -> Self {
        Self { queue }
    }
}

#[async_trait]
impl ReminderSender for QueuedSender {
    async fn send_due(&self, event: DueReminder) -> AppResult<()> {
        let delivery = self.queue.publish_due(&event).await?;
        debug!(
            delivery_id = %delivery.id,
            schedule_id = %event.schedule_id,
            "Published due reminder to delivery queue"
        );
        Ok(())
    }
}
