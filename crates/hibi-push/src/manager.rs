//! Push manager that dispatches to the configured transport.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use hibi_core::config::push::PushConfig;
use hibi_core::error::AppError;
use hibi_core::result::AppResult;
use hibi_core::traits::push::PushTransport;

/// Push manager that wraps the configured transport.
#[derive(Debug, Clone)]
pub struct PushManager {
    /// The inner transport.
    inner: Arc<dyn PushTransport>,
}

impl PushManager {
    /// Create a new push manager from configuration.
    pub fn new(config: &PushConfig) -> AppResult<Self> {
        let inner: Arc<dyn PushTransport> = match config.provider.as_str() {
            "fcm" => {
                info!("Initializing FCM push transport");
                Arc::new(crate::fcm::FcmTransport::new(&config.fcm)?)
            }
            "log" => {
                info!("Initializing logging push transport");
                Arc::new(crate::log::LogTransport::new())
            }
            other => {
                return Err(AppError::configuration(format!(
                    "Unknown push provider: '{other}'. Supported: fcm, log"
                )));
            }
        };

        Ok(Self { inner })
    }

    /// Create a manager from an existing transport (for testing).
    pub fn from_transport(transport: Arc<dyn PushTransport>) -> Self {
        Self { inner: transport }
    }
}

#[async_trait]
impl PushTransport for PushManager {
    async fn send(
        &self,
        token: &str,
        title: &str,
        body: &str,
        data: &HashMap<String, String>,
    ) -> AppResult<()> {
        self.inner.send(token, title, body, data).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_log_provider_from_config() {
        let config = PushConfig {
            provider: "log".to_string(),
            fcm: Default::default(),
        };
        let manager = PushManager::new(&config).expect("manager");
        assert!(
            manager
                .send("token", "t", "b", &HashMap::new())
                .await
                .is_ok()
        );
    }

    #[test]
    fn test_unknown_provider_is_rejected() {
        let config = PushConfig {
            provider: "apns".to_string(),
            fcm: Default::default(),
        };
        assert!(PushManager::new(&config).is_err());
    }
}
