//! Fan-out of one logical notification to every device a user owns.
//!
//! A failure against one token must not prevent delivery to the user's
//! other devices: per-token errors are logged and counted, never
//! propagated. Having zero registered devices is a successful no-op.

use std::sync::Arc;

use hibi_core::result::AppResult;
use hibi_core::traits::push::PushTransport;
use hibi_core::types::id::{RecipientId, UserId};
use hibi_entity::delivery::event::DueReminder;
use hibi_entity::notification::payload::NotificationPayload;
use tracing::{debug, info, warn};

use crate::source::{DeviceTokenSource, PayloadSource, RecipientSource};

/// Result of one fan-out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FanOutOutcome {
    /// Recipient missing or inactive; nothing was sent.
    Skipped,
    /// Fan-out ran; counts are per device token.
    Sent {
        /// Tokens the transport accepted.
        delivered: usize,
        /// Tokens that errored (logged, not propagated).
        failed: usize,
    },
}

/// Sends one notification to all of a recipient's devices.
#[derive(Debug, Clone)]
pub struct FanOutSender {
    recipients: Arc<dyn RecipientSource>,
    devices: Arc<dyn DeviceTokenSource>,
    payloads: Arc<dyn PayloadSource>,
    transport: Arc<dyn PushTransport>,
}

impl FanOutSender {
    /// Create a fan-out sender over the given sources and transport.
    pub fn new(
        recipients: Arc<dyn RecipientSource>,
        devices: Arc<dyn DeviceTokenSource>,
        payloads: Arc<dyn PayloadSource>,
        transport: Arc<dyn PushTransport>,
    ) -> Self {
        Self {
            recipients,
            devices,
            payloads,
            transport,
        }
    }

    /// Deliver a due reminder: resolve its recipient, build the topic
    /// payload, and fan out to the user's devices.
    ///
    /// A recipient that was deleted or deactivated after the reminder was
    /// selected is skipped silently; the schedule row is the source of
    /// truth and the index may briefly lag it.
    pub async fn send_by_schedule(&self, event: &DueReminder) -> AppResult<FanOutOutcome> {
        let Some(recipient) = self.recipients.recipient(event.recipient_id).await? else {
            debug!(recipient_id = %event.recipient_id, "Recipient gone, skipping reminder");
            return Ok(FanOutOutcome::Skipped);
        };

        if !recipient.is_active {
            debug!(recipient_id = %recipient.id, "Recipient inactive, skipping reminder");
            return Ok(FanOutOutcome::Skipped);
        }

        let payload = self.payloads.payload_for(recipient.topic).await?;
        self.send_to_user(recipient.user_id, &payload).await
    }

    /// Deliver an already-built payload to a recipient, honoring the
    /// active flag.
    pub async fn send_to_recipient(
        &self,
        recipient_id: RecipientId,
        payload: &NotificationPayload,
    ) -> AppResult<FanOutOutcome> {
        let Some(recipient) = self.recipients.recipient(recipient_id).await? else {
            debug!(%recipient_id, "Recipient gone, skipping notification");
            return Ok(FanOutOutcome::Skipped);
        };

        if !recipient.is_active {
            debug!(%recipient_id, "Recipient inactive, skipping notification");
            return Ok(FanOutOutcome::Skipped);
        }

        self.send_to_user(recipient.user_id, payload).await
    }

    /// Fan a payload out to every active device token of a user.
    async fn send_to_user(
        &self,
        user_id: UserId,
        payload: &NotificationPayload,
    ) -> AppResult<FanOutOutcome> {
        let tokens = self.devices.active_tokens(user_id).await?;

        if tokens.is_empty() {
            debug!(%user_id, "No active devices, nothing to send");
            return Ok(FanOutOutcome::Sent {
                delivered: 0,
                failed: 0,
            });
        }

        let mut delivered = 0;
        let mut failed = 0;
        for token in &tokens {
            match self
                .transport
                .send(&token.push_token, &payload.title, &payload.body, &payload.data)
                .await
            {
                Ok(()) => delivered += 1,
                Err(e) => {
                    warn!(
                        %user_id,
                        device_id = %token.device_id,
                        error = %e,
                        "Push to one device failed, continuing fan-out"
                    );
                    failed += 1;
                }
            }
        }

        info!(%user_id, delivered, failed, topic = %payload.topic, "Fan-out finished");
        Ok(FanOutOutcome::Sent { delivered, failed })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use chrono::Utc;
    use hibi_core::error::AppError;
    use hibi_core::types::id::DeviceTokenId;
    use hibi_entity::device::platform::DevicePlatform;
    use hibi_entity::notification::topic::NotificationTopic;
    use hibi_entity::recipient::model::Recipient;

    use super::*;

    #[derive(Debug)]
    struct FakeRecipients {
        recipient: Option<Recipient>,
    }

    #[async_trait]
    impl RecipientSource for FakeRecipients {
        async fn recipient(&self, _id: RecipientId) -> AppResult<Option<Recipient>> {
            Ok(self.recipient.clone())
        }
    }

    #[derive(Debug)]
    struct FakeDevices {
        tokens: Vec<DeviceToken>,
    }

    use hibi_entity::device::model::DeviceToken;

    #[async_trait]
    impl DeviceTokenSource for FakeDevices {
        async fn active_tokens(&self, _user_id: UserId) -> AppResult<Vec<DeviceToken>> {
            Ok(self.tokens.clone())
        }
    }

    #[derive(Debug)]
    struct FakePayloads;

    #[async_trait]
    impl PayloadSource for FakePayloads {
        async fn payload_for(&self, topic: NotificationTopic) -> AppResult<NotificationPayload> {
            Ok(NotificationPayload::new(topic, "Title", "Body"))
        }
    }

    /// Transport that fails for tokens listed in `fail_tokens`.
    #[derive(Debug, Default)]
    struct RecordingTransport {
        fail_tokens: Vec<String>,
        sent: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl PushTransport for RecordingTransport {
        async fn send(
            &self,
            token: &str,
            _title: &str,
            _body: &str,
            _data: &HashMap<String, String>,
        ) -> AppResult<()> {
            if self.fail_tokens.iter().any(|t| t == token) {
                return Err(AppError::push("transport rejected token"));
            }
            self.sent.lock().expect("lock").push(token.to_string());
            Ok(())
        }
    }

    fn recipient(user_id: UserId, is_active: bool) -> Recipient {
        Recipient {
            id: RecipientId::new(),
            user_id,
            topic: NotificationTopic::DiaryReminder,
            is_active,
            is_read: false,
            read_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn device(user_id: UserId, push_token: &str) -> DeviceToken {
        DeviceToken {
            id: DeviceTokenId::new(),
            user_id,
            device_id: format!("device-{push_token}"),
            push_token: push_token.to_string(),
            device_type: DevicePlatform::Ios,
            is_active: true,
            last_used_at: Utc::now(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn event(recipient_id: RecipientId) -> DueReminder {
        DueReminder {
            schedule_id: hibi_core::types::id::ScheduleId::new(),
            recipient_id,
            scheduled_time: chrono::NaiveTime::from_hms_opt(9, 0, 0).expect("valid time"),
        }
    }

    fn sender(
        recipient: Option<Recipient>,
        tokens: Vec<DeviceToken>,
        fail_tokens: Vec<String>,
    ) -> (FanOutSender, Arc<RecordingTransport>) {
        let transport = Arc::new(RecordingTransport {
            fail_tokens,
            sent: Mutex::new(Vec::new()),
        });
        let fanout = FanOutSender::new(
            Arc::new(FakeRecipients { recipient }),
            Arc::new(FakeDevices { tokens }),
            Arc::new(FakePayloads),
            transport.clone(),
        );
        (fanout, transport)
    }

    #[tokio::test]
    async fn test_one_bad_token_does_not_block_the_rest() {
        let user_id = UserId::new();
        let r = recipient(user_id, true);
        let recipient_id = r.id;
        let tokens = vec![
            device(user_id, "good-1"),
            device(user_id, "bad"),
            device(user_id, "good-2"),
        ];
        let (fanout, transport) = sender(Some(r), tokens, vec!["bad".to_string()]);

        let outcome = fanout
            .send_by_schedule(&event(recipient_id))
            .await
            .expect("fan-out");

        assert_eq!(
            outcome,
            FanOutOutcome::Sent {
                delivered: 2,
                failed: 1
            }
        );
        let sent = transport.sent.lock().expect("lock");
        assert_eq!(sent.as_slice(), ["good-1", "good-2"]);
    }

    #[tokio::test]
    async fn test_zero_devices_is_a_successful_noop() {
        let user_id = UserId::new();
        let r = recipient(user_id, true);
        let recipient_id = r.id;
        let (fanout, transport) = sender(Some(r), vec![], vec![]);

        let outcome = fanout
            .send_by_schedule(&event(recipient_id))
            .await
            .expect("fan-out");

        assert_eq!(
            outcome,
            FanOutOutcome::Sent {
                delivered: 0,
                failed: 0
            }
        );
        assert!(transport.sent.lock().expect("lock").is_empty());
    }

    #[tokio::test]
    async fn test_inactive_recipient_is_skipped() {
        let user_id = UserId::new();
        let r = recipient(user_id, false);
        let recipient_id = r.id;
        let tokens = vec![device(user_id, "t1")];
        let (fanout, transport) = sender(Some(r), tokens, vec![]);

        let outcome = fanout
            .send_by_schedule(&event(recipient_id))
            .await
            .expect("fan-out");

        assert_eq!(outcome, FanOutOutcome::Skipped);
        assert!(transport.sent.lock().expect("lock").is_empty());
    }

    #[tokio::test]
    async fn test_missing_recipient_is_skipped() {
        let (fanout, _transport) = sender(None, vec![], vec![]);
        let outcome = fanout
            .send_by_schedule(&event(RecipientId::new()))
            .await
            .expect("fan-out");
        assert_eq!(outcome, FanOutOutcome::Skipped);
    }
}
