//! Time-index provider configuration.

use serde::{Deserialize, Serialize};

/// Top-level time-index configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexConfig {
    /// Index provider type: `"memory"` or `"redis"`.
    ///
    /// The memory provider is per-process; the Redis provider backs the
    /// index with a sorted set shared across instances.
    #[serde(default = "default_provider")]
    pub provider: String,
    /// Redis-specific index configuration.
    #[serde(default)]
    pub redis: RedisIndexConfig,
}

/// Redis time-index backend configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedisIndexConfig {
    /// Redis connection URL.
    #[serde(default = "default_redis_url")]
    pub url: String,
    /// Key prefix for all Hibi index keys.
    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,
}

impl Default for RedisIndexConfig {
    fn default() -> Self {
        Self {
            url: default_redis_url(),
            key_prefix: default_key_prefix(),
        }
    }
}

fn default_provider() -> String {
    "memory".to_string()
}

fn default_redis_url() -> String {
    "redis://localhost:6379".to_string()
}

fn default_key_prefix() -> String {
    "hibi:".to_string()
}
