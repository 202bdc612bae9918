//! Sender strategy seam between the poller and delivery.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use hibi_core::config::worker::WorkerConfig;
use hibi_core::error::AppError;
use hibi_core::result::AppResult;
use hibi_entity::delivery::event::DueReminder;

use crate::direct::DirectSender;
use crate::fanout::FanOutSender;
use crate::queue::DeliveryQueue;
use crate::queued::QueuedSender;

/// Accepts due reminders from the poller.
///
/// `send_due` must return quickly: implementations either hand the event
/// to the queue or spawn the fan-out, never run it inline on the tick.
#[async_trait]
pub trait ReminderSender: Send + Sync + fmt::Debug {
    /// Accept one due reminder for delivery.
    async fn send_due(&self, event: DueReminder) -> AppResult<()>;
}

/// Sender selected at construction time from configuration.
///
/// The poller holds this and stays strategy-agnostic.
#[derive(Debug, Clone)]
pub struct SenderDispatch {
    inner: Arc<dyn ReminderSender>,
}

impl SenderDispatch {
    /// Build the configured sender strategy.
    pub fn from_config(
        config: &WorkerConfig,
        queue: Arc<DeliveryQueue>,
        fanout: Arc<FanOutSender>,
    ) -> AppResult<Self> {
        let inner: Arc<dyn ReminderSender> = match config.sender.as_str() {
            "queued" => Arc::new(QueuedSender::new(queue)),
            "direct" => Arc::new(DirectSender::new(fanout, config.concurrency)),
            other => {
                return Err(AppError::configuration(format!(
                    "Unknown sender strategy: '{other}'. Supported: queued, direct"
                )));
            }
        };
        Ok(Self { inner })
    }

    /// Wrap an existing sender (for testing).
    pub fn from_sender(sender: Arc<dyn ReminderSender>) -> Self {
        Self { inner: sender }
    }
}

#[async_trait]
impl ReminderSender for SenderDispatch {
    async fn send_due(&self, event: DueReminder) -> AppResult<()> {
        self.inner.send_due(event).await
    }
}
