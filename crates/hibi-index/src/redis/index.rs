//! Redis time-index implementation.
//!
//! One sorted set holds every schedule, keyed by its UUID with the
//! time-of-day score (seconds since midnight) as the member score. ZADD
//! updates the score in place, so an upsert and a move are the same call.

use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveTime;
use redis::AsyncCommands;
use tracing::warn;

use hibi_core::error::{AppError, ErrorKind};
use hibi_core::result::AppResult;
use hibi_core::traits::time_index::TimeIndex;
use hibi_core::types::id::ScheduleId;
use hibi_core::types::time::{time_score, window_ranges};

use super::client::RedisClient;

/// Sorted set name, under the configured key prefix.
const INDEX_KEY: &str = "reminder:index";

/// Redis-backed time-index provider.
#[derive(Debug, Clone)]
pub struct RedisTimeIndex {
    client: RedisClient,
}

impl RedisTimeIndex {
    /// Create a new Redis time index.
    pub fn new(client: RedisClient) -> Self {
        Self { client }
    }

    fn map_err(e: redis::RedisError) -> AppError {
        AppError::with_source(ErrorKind::Index, format!("Redis error: {e}"), e)
    }

    fn index_key(&self) -> String {
        self.client.prefixed_key(INDEX_KEY)
    }
}

#[async_trait]
impl TimeIndex for RedisTimeIndex {
    async fn upsert(&self, schedule_id: ScheduleId, time: NaiveTime) -> AppResult<()> {
        let key = self.index_key();
        let mut conn = self.client.conn_mut();
        let _: () = conn
            .zadd(&key, schedule_id.to_string(), time_score(time))
            .await
            .map_err(Self::map_err)?;
        Ok(())
    }

    async fn remove(&self, schedule_id: ScheduleId) -> AppResult<()> {
        let key = self.index_key();
        let mut conn = self.client.conn_mut();
        let _: () = conn
            .zrem(&key, schedule_id.to_string())
            .await
            .map_err(Self::map_err)?;
        Ok(())
    }

    async fn due_within(
        &self,
        now: NaiveTime,
        half_window: Duration,
    ) -> AppResult<Vec<ScheduleId>> {
        let key = self.index_key();
        let mut conn = self.client.conn_mut();

        let mut due = Vec::new();
        for (lo, hi) in window_ranges(now, half_window.as_secs() as u32) {
            let members: Vec<String> = conn
                .zrangebyscore(&key, lo, hi)
                .await
                .map_err(Self::map_err)?;

            for member in members {
                match ScheduleId::from_str(&member) {
                    Ok(id) => due.push(id),
                    // A malformed member must not block the rest of the window.
                    Err(_) => warn!(member = %member, "Skipping non-UUID member in reminder index"),
                }
            }
        }
        Ok(due)
    }

    async fn health_check(&self) -> AppResult<bool> {
        let mut conn = self.client.conn_mut();
        let pong: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(Self::map_err)?;
        Ok(pong == "PONG")
    }
}
