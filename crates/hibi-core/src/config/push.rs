//! Push-transport configuration.

use serde::{Deserialize, Serialize};

/// Top-level push-transport configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PushConfig {
    /// Transport provider: `"fcm"` or `"log"`.
    ///
    /// The log provider only records sends and is intended for
    /// development and tests.
    #[serde(default = "default_provider")]
    pub provider: String,
    /// FCM-specific configuration.
    #[serde(default)]
    pub fcm: FcmConfig,
}

/// Firebase Cloud Messaging transport configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FcmConfig {
    /// FCM HTTP endpoint.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Server key used in the `Authorization` header.
    #[serde(default)]
    pub server_key: String,
    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

impl Default for FcmConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            server_key: String::new(),
            timeout_seconds: default_timeout(),
        }
    }
}

fn default_provider() -> String {
    "log".to_string()
}

fn default_endpoint() -> String {
    "https://fcm.googleapis.com/fcm/send".to_string()
}

fn default_timeout() -> u64 {
    10
}
