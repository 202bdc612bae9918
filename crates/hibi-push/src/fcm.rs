//! Firebase Cloud Messaging transport.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;
use tracing::debug;

use hibi_core::config::push::FcmConfig;
use hibi_core::error::{AppError, ErrorKind};
use hibi_core::result::AppResult;
use hibi_core::traits::push::PushTransport;

/// FCM push transport using the legacy HTTP API.
#[derive(Debug, Clone)]
pub struct FcmTransport {
    client: reqwest::Client,
    endpoint: String,
    server_key: String,
}

impl FcmTransport {
    /// Create a new FCM transport from configuration.
    pub fn new(config: &FcmConfig) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| {
                AppError::with_source(ErrorKind::Push, "Failed to build HTTP client", e)
            })?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            server_key: config.server_key.clone(),
        })
    }
}

#[async_trait]
impl PushTransport for FcmTransport {
    async fn send(
        &self,
        token: &str,
        title: &str,
        body: &str,
        data: &HashMap<String, String>,
    ) -> AppResult<()> {
        let payload = json!({
            "to": token,
            "notification": {
                "title": title,
                "body": body,
            },
            "data": data,
        });

        let response = self
            .client
            .post(&self.endpoint)
            .header("Authorization", format!("key={}", self.server_key))
            .json(&payload)
            .send()
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Push, "FCM request failed", e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::push(format!(
                "FCM returned HTTP {}",
                status.as_u16()
            )));
        }

        debug!(title, "Push notification accepted by FCM");
        Ok(())
    }
}
