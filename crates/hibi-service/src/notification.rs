//! Topic broadcasts and the payload catalog.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{error, info};

use hibi_core::result::AppResult;
use hibi_core::types::id::RecipientId;
use hibi_delivery::queue::DeliveryQueue;
use hibi_delivery::source::PayloadSource;
use hibi_entity::notification::payload::NotificationPayload;
use hibi_entity::notification::topic::NotificationTopic;

/// Enqueues topic notifications for sets of recipients.
#[derive(Debug, Clone)]
pub struct NotificationService {
    queue: Arc<DeliveryQueue>,
    payloads: Arc<dyn PayloadSource>,
}

impl NotificationService {
    /// Create a new notification service.
    pub fn new(queue: Arc<DeliveryQueue>, payloads: Arc<dyn PayloadSource>) -> Self {
        Self { queue, payloads }
    }

    /// Broadcast a topic to a set of recipients through the delivery queue.
    ///
    /// Builds the topic's payload once and enqueues one delivery per
    /// recipient; the queue consumer fans each out to the recipient's
    /// devices.
    pub async fn broadcast(
        &self,
        topic: NotificationTopic,
        recipient_ids: &[RecipientId],
    ) -> AppResult<usize> {
        let payload = self.payloads.payload_for(topic).await?;
        self.enqueue_for_recipients(&payload, recipient_ids).await
    }

    /// Enqueue one payload for each recipient.
    ///
    /// One failed enqueue does not stop the rest; failures are logged and
    /// the count of successfully enqueued deliveries is returned.
    pub async fn enqueue_for_recipients(
        &self,
        payload: &NotificationPayload,
        recipient_ids: &[RecipientId],
    ) -> AppResult<usize> {
        let mut enqueued = 0;
        for &recipient_id in recipient_ids {
            match self.queue.publish_topic(recipient_id, payload).await {
                Ok(_) => enqueued += 1,
                Err(e) => {
                    error!(%recipient_id, error = %e, "Failed to enqueue notification");
                }
            }
        }

        info!(
            topic = %payload.topic,
            requested = recipient_ids.len(),
            enqueued,
            "Topic notification enqueued"
        );
        Ok(enqueued)
    }
}

/// Static notification content per topic.
#[derive(Debug, Clone, Copy, Default)]
pub struct PayloadCatalog;

impl PayloadCatalog {
    /// Create the catalog.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl PayloadSource for PayloadCatalog {
    async fn payload_for(&self, topic: NotificationTopic) -> AppResult<NotificationPayload> {
        Ok(match topic {
            NotificationTopic::DiaryReminder => NotificationPayload::new(
                topic,
                "Diary reminder",
                "Time to write about your day.",
            )
            .with_data("screen", "diary/new"),
            NotificationTopic::WeeklyRecap => NotificationPayload::new(
                topic,
                "Your weekly recap",
                "Look back at what you wrote this week.",
            )
            .with_data("screen", "recap/weekly"),
        })
    }
}
