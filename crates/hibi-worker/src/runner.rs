//! Delivery runner — drains the durable queue and fans out.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Semaphore, watch};
use tokio::time;
use tracing::{debug, error, info, trace, warn};

use hibi_core::config::worker::WorkerConfig;
use hibi_core::error::AppError;
use hibi_core::result::AppResult;
use hibi_delivery::fanout::FanOutSender;
use hibi_delivery::isolate::spawn_isolated;
use hibi_delivery::queue::DeliveryQueue;
use hibi_entity::delivery::event::DueReminder;
use hibi_entity::delivery::model::{Delivery, DeliveryKind};
use hibi_entity::notification::payload::NotificationPayload;

/// Queue consumer that claims deliveries and runs the fan-out.
///
/// Multiple runners (in one process or many) drain the same queue safely;
/// the claim is `FOR UPDATE SKIP LOCKED` underneath.
#[derive(Debug)]
pub struct DeliveryRunner {
    queue: Arc<DeliveryQueue>,
    fanout: Arc<FanOutSender>,
    config: WorkerConfig,
    worker_id: String,
}

impl DeliveryRunner {
    /// Create a new delivery runner.
    pub fn new(
        queue: Arc<DeliveryQueue>,
        fanout: Arc<FanOutSender>,
        config: WorkerConfig,
        worker_id: String,
    ) -> Self {
        Self {
            queue,
            fanout,
            config,
            worker_id,
        }
    }

    /// Run until the cancel signal is received.
    pub async fn run(&self, mut cancel: watch::Receiver<bool>) {
        info!(
            worker_id = %self.worker_id,
            concurrency = self.config.concurrency,
            poll_interval = self.config.poll_interval_seconds,
            "Delivery runner started"
        );

        let semaphore = Arc::new(Semaphore::new(self.config.concurrency));
        let poll_interval = Duration::from_secs(self.config.poll_interval_seconds);

        loop {
            tokio::select! {
                _ = cancel.changed() => {
                    if *cancel.borrow() {
                        info!(worker_id = %self.worker_id, "Delivery runner received shutdown signal");
                        break;
                    }
                }
                _ = self.claim_and_process(&semaphore) => {
                    tokio::select! {
                        _ = cancel.changed() => {
                            if *cancel.borrow() {
                                info!(worker_id = %self.worker_id, "Delivery runner shutting down");
                                break;
                            }
                        }
                        _ = time::sleep(poll_interval) => {}
                    }
                }
            }
        }

        info!(worker_id = %self.worker_id, "Waiting for in-flight deliveries to finish");
        let max_permits = self.config.concurrency as u32;
        let _ = time::timeout(Duration::from_secs(30), semaphore.acquire_many(max_permits)).await;
        info!(worker_id = %self.worker_id, "Delivery runner shut down");
    }

    /// Claim one delivery and process it on a spawned task.
    async fn claim_and_process(&self, semaphore: &Arc<Semaphore>) {
        let permit = match Arc::clone(semaphore).try_acquire_owned() {
            Ok(p) => p,
            Err(_) => {
                trace!("All delivery slots occupied");
                return;
            }
        };

        match self.queue.claim_next(&self.worker_id).await {
            Ok(Some(delivery)) => {
                let queue = Arc::clone(&self.queue);
                let fanout = Arc::clone(&self.fanout);

                spawn_isolated("delivery", async move {
                    let _permit = permit;

                    debug!(
                        delivery_id = %delivery.id,
                        kind = ?delivery.kind,
                        attempt = delivery.attempts,
                        max_attempts = delivery.max_attempts,
                        "Processing delivery"
                    );

                    match process(&fanout, &delivery).await {
                        Ok(()) => queue.complete(delivery.id).await,
                        Err(e) => {
                            let message = e.to_string();
                            if delivery.can_retry() {
                                warn!(
                                    delivery_id = %delivery.id,
                                    error = %message,
                                    "Delivery failed, releasing for retry"
                                );
                                queue.release(delivery.id, &message).await
                            } else {
                                error!(
                                    delivery_id = %delivery.id,
                                    error = %message,
                                    "Delivery failed permanently"
                                );
                                queue.fail(delivery.id, &message).await
                            }
                        }
                    }
                });
            }
            Ok(None) => {
                drop(permit);
                trace!("No pending deliveries");
            }
            Err(e) => {
                drop(permit);
                error!(error = %e, "Failed to claim delivery");
            }
        }
    }
}

/// Dispatch one claimed delivery by kind.
pub(crate) async fn process(fanout: &FanOutSender, delivery: &Delivery) -> AppResult<()> {
    match delivery.kind {
        DeliveryKind::Reminder => {
            let schedule_id = delivery
                .schedule_id
                .ok_or_else(|| AppError::queue("Reminder delivery without schedule_id"))?;
            let scheduled_time = delivery
                .scheduled_time
                .ok_or_else(|| AppError::queue("Reminder delivery without scheduled_time"))?;

            let event = DueReminder {
                schedule_id,
                recipient_id: delivery.recipient_id,
                scheduled_time,
            };
            fanout.send_by_schedule(&event).await?;
        }
        DeliveryKind::Topic => {
            let value = delivery
                .payload
                .as_ref()
                .ok_or_else(|| AppError::queue("Topic delivery without payload"))?;
            let payload: NotificationPayload = serde_json::from_value(value.clone())?;
            fanout.send_to_recipient(delivery.recipient_id, &payload).await?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use chrono::Utc;
    use hibi_core::traits::push::PushTransport;
    use hibi_core::types::id::{DeliveryId, DeviceTokenId, RecipientId, UserId};
    use hibi_delivery::source::{DeviceTokenSource, PayloadSource, RecipientSource};
    use hibi_entity::delivery::status::DeliveryStatus;
    use hibi_entity::device::model::DeviceToken;
    use hibi_entity::device::platform::DevicePlatform;
    use hibi_entity::notification::topic::NotificationTopic;
    use hibi_entity::recipient::model::Recipient;

    use super::*;

    #[derive(Debug)]
    struct OneRecipient {
        recipient: Recipient,
    }

    #[async_trait]
    impl RecipientSource for OneRecipient {
        async fn recipient(&self, _id: RecipientId) -> AppResult<Option<Recipient>> {
            Ok(Some(self.recipient.clone()))
        }
    }

    #[derive(Debug)]
    struct TwoDevices {
        tokens: Vec<DeviceToken>,
    }

    #[async_trait]
    impl DeviceTokenSource for TwoDevices {
        async fn active_tokens(&self, _user_id: UserId) -> AppResult<Vec<DeviceToken>> {
            Ok(self.tokens.clone())
        }
    }

    #[derive(Debug)]
    struct StaticPayloads;

    #[async_trait]
    impl PayloadSource for StaticPayloads {
        async fn payload_for(&self, topic: NotificationTopic) -> AppResult<NotificationPayload> {
            Ok(NotificationPayload::new(topic, "Fallback", "Fallback"))
        }
    }

    #[derive(Debug, Default)]
    struct RecordingTransport {
        sent: Mutex<Vec<(String, String)>>,
    }

    #[async_trait]
    impl PushTransport for RecordingTransport {
        async fn send(
            &self,
            token: &str,
            title: &str,
            _body: &str,
            _data: &HashMap<String, String>,
        ) -> AppResult<()> {
            self.sent
                .lock()
                .expect("lock")
                .push((token.to_string(), title.to_string()));
            Ok(())
        }
    }

    fn device(user_id: UserId, push_token: &str) -> DeviceToken {
        DeviceToken {
            id: DeviceTokenId::new(),
            user_id,
            device_id: format!("device-{push_token}"),
            push_token: push_token.to_string(),
            device_type: DevicePlatform::Android,
            is_active: true,
            last_used_at: Utc::now(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn delivery(kind: DeliveryKind, recipient_id: RecipientId) -> Delivery {
        Delivery {
            id: DeliveryId::new(),
            kind,
            schedule_id: None,
            recipient_id,
            scheduled_time: None,
            payload: None,
            status: DeliveryStatus::Running,
            attempts: 1,
            max_attempts: 3,
            error_message: None,
            worker_id: Some("worker-test".to_string()),
            claimed_at: Some(Utc::now()),
            completed_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn fanout(
        recipient: Recipient,
        tokens: Vec<DeviceToken>,
    ) -> (FanOutSender, Arc<RecordingTransport>) {
        let transport = Arc::new(RecordingTransport::default());
        let fanout = FanOutSender::new(
            Arc::new(OneRecipient { recipient }),
            Arc::new(TwoDevices { tokens }),
            Arc::new(StaticPayloads),
            transport.clone(),
        );
        (fanout, transport)
    }

    fn recipient(user_id: UserId) -> Recipient {
        Recipient {
            id: RecipientId::new(),
            user_id,
            topic: NotificationTopic::WeeklyRecap,
            is_active: true,
            is_read: false,
            read_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_topic_delivery_fans_out_inline_payload() {
        let user_id = UserId::new();
        let r = recipient(user_id);
        let recipient_id = r.id;
        let (fanout, transport) =
            fanout(r, vec![device(user_id, "tok-1"), device(user_id, "tok-2")]);

        let payload =
            NotificationPayload::new(NotificationTopic::WeeklyRecap, "Your weekly recap", "Body");
        let mut row = delivery(DeliveryKind::Topic, recipient_id);
        row.payload = Some(serde_json::to_value(&payload).expect("serialize"));

        process(&fanout, &row).await.expect("process");

        // The inline payload is used, not the catalog fallback.
        let sent = transport.sent.lock().expect("lock");
        assert_eq!(sent.len(), 2);
        assert!(sent.iter().all(|(_, title)| title == "Your weekly recap"));
    }

    #[tokio::test]
    async fn test_topic_delivery_without_payload_is_an_error() {
        let user_id = UserId::new();
        let r = recipient(user_id);
        let recipient_id = r.id;
        let (fanout, _transport) = fanout(r, vec![]);

        let row = delivery(DeliveryKind::Topic, recipient_id);
        let err = process(&fanout, &row).await.expect_err("missing payload");
        assert_eq!(err.kind, hibi_core::error::ErrorKind::Queue);
    }

    #[tokio::test]
    async fn test_reminder_delivery_requires_schedule_fields() {
        let user_id = UserId::new();
        let r = recipient(user_id);
        let recipient_id = r.id;
        let (fanout, _transport) = fanout(r, vec![]);

        let row = delivery(DeliveryKind::Reminder, recipient_id);
        let err = process(&fanout, &row).await.expect_err("missing schedule");
        assert_eq!(err.kind, hibi_core::error::ErrorKind::Queue);
    }
}

