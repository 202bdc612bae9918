//! Time-index manager that dispatches to the configured provider.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveTime;
use tracing::info;

use hibi_core::config::index::IndexConfig;
use hibi_core::error::AppError;
use hibi_core::result::AppResult;
use hibi_core::traits::time_index::TimeIndex;
use hibi_core::types::id::ScheduleId;

/// Time-index manager that wraps the configured provider.
///
/// The provider is selected at construction time based on configuration.
#[derive(Debug, Clone)]
pub struct TimeIndexManager {
    /// The inner index provider.
    inner: Arc<dyn TimeIndex>,
}

impl TimeIndexManager {
    /// Create a new time-index manager from configuration.
    pub async fn new(config: &IndexConfig) -> AppResult<Self> {
        let inner: Arc<dyn TimeIndex> = match config.provider.as_str() {
            #[cfg(feature = "redis-backend")]
            "redis" => {
                info!("Initializing Redis time-index provider");
                let client = crate::redis::RedisClient::connect(&config.redis).await?;
                Arc::new(crate::redis::RedisTimeIndex::new(client))
            }
            #[cfg(feature = "memory")]
            "memory" => {
                info!("Initializing in-memory time-index provider");
                Arc::new(crate::memory::MemoryTimeIndex::new())
            }
            other => {
                return Err(AppError::configuration(format!(
                    "Unknown index provider: '{other}'. Supported: memory, redis"
                )));
            }
        };

        Ok(Self { inner })
    }

    /// Create a manager from an existing provider (for testing).
    pub fn from_provider(provider: Arc<dyn TimeIndex>) -> Self {
        Self { inner: provider }
    }

    /// Get a reference to the inner provider.
    pub fn provider(&self) -> &dyn TimeIndex {
        self.inner.as_ref()
    }
}

#[async_trait]
impl TimeIndex for TimeIndexManager {
    async fn upsert(&self, schedule_id: ScheduleId, time: NaiveTime) -> AppResult<()> {
        self.inner.upsert(schedule_id, time).await
    }

    async fn remove(&self, schedule_id: ScheduleId) -> AppResult<()> {
        self.inner.remove(schedule_id).await
    }

    async fn due_within(
        &self,
        now: NaiveTime,
        half_window: Duration,
    ) -> AppResult<Vec<ScheduleId>> {
        self.inner.due_within(now, half_window).await
    }

    async fn health_check(&self) -> AppResult<bool> {
        self.inner.health_check().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_provider_from_config() {
        let config = IndexConfig {
            provider: "memory".to_string(),
            redis: Default::default(),
        };
        let manager = TimeIndexManager::new(&config).await.expect("manager");
        assert!(manager.health_check().await.expect("health"));
    }

    #[tokio::test]
    async fn test_unknown_provider_is_rejected() {
        let config = IndexConfig {
            provider: "etcd".to_string(),
            redis: Default::default(),
        };
        assert!(TimeIndexManager::new(&config).await.is_err());
    }
}
