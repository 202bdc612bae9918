//! In-process sender strategy.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Semaphore;

use hibi_core::error::AppError;
use hibi_core::result::AppResult;
use hibi_entity::delivery::event::DueReminder;

use crate::fanout::FanOutSender;
use crate::isolate::spawn_isolated;
use crate::sender::ReminderSender;

/// Fans out in a spawned task, without a queue hop.
///
/// Concurrent fan-outs are bounded by a semaphore; when every slot is
/// busy, `send_due` waits for one (caller-waits backpressure, nothing is
/// dropped). Suited to single-instance deployments.
#[derive(Debug, Clone)]
pub struct DirectSender {
    fanout: Arc<FanOutSender>,
    limiter: Arc<Semaphore>,
}

impl DirectSender {
    /// Create a direct sender with at most `concurrency` in-flight fan-outs.
    pub fn new(fanout: Arc<FanOutSender>, concurrency: usize) -> Self {
        Self {
            fanout,
            limiter: Arc::new(Semaphore::new(concurrency)),
        }
    }
}

#[async_trait]
impl ReminderSender for DirectSender {
    async fn send_due(&self, event: DueReminder) -> AppResult<()> {
        let permit = Arc::clone(&self.limiter)
            .acquire_owned()
            .await
            .map_err(|_| AppError::internal("Fan-out limiter closed"))?;

        let fanout = Arc::clone(&self.fanout);
        spawn_isolated("direct-fanout", async move {
            let _permit = permit;
            fanout.send_by_schedule(&event).await?;
            Ok(())
        });
        Ok(())
    }
}
