//! Logging push transport for development and tests.

use std::collections::HashMap;

use async_trait::async_trait;
use tracing::info;

use hibi_core::result::AppResult;
use hibi_core::traits::push::PushTransport;

/// Transport that records every send to the log instead of delivering it.
#[derive(Debug, Clone, Default)]
pub struct LogTransport;

impl LogTransport {
    /// Create a new logging transport.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl PushTransport for LogTransport {
    async fn send(
        &self,
        token: &str,
        title: &str,
        body: &str,
        data: &HashMap<String, String>,
    ) -> AppResult<()> {
        info!(
            token = %truncate_token(token),
            title,
            body,
            data_keys = data.len(),
            "Push notification (log transport)"
        );
        Ok(())
    }
}

/// Tokens are credentials; log only enough to correlate.
fn truncate_token(token: &str) -> &str {
    let end = token
        .char_indices()
        .nth(8)
        .map(|(i, _)| i)
        .unwrap_or(token.len());
    &token[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_token() {
        assert_eq!(truncate_token("abcdefghijklmnop"), "abcdefgh");
        assert_eq!(truncate_token("short"), "short");
    }

    #[tokio::test]
    async fn test_send_always_succeeds() {
        let transport = LogTransport::new();
        let result = transport
            .send("token-1", "Title", "Body", &HashMap::new())
            .await;
        assert!(result.is_ok());
    }
}
