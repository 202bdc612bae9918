//! Recipient repository implementation.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use hibi_core::error::{AppError, ErrorKind};
use hibi_core::result::AppResult;
use hibi_core::types::id::{RecipientId, UserId};
use hibi_entity::notification::topic::NotificationTopic;
use hibi_entity::recipient::model::Recipient;

/// Repository for recipient (topic subscription) rows.
#[derive(Debug, Clone)]
pub struct RecipientRepository {
    pool: PgPool,
}

impl RecipientRepository {
    /// Create a new recipient repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a recipient by ID.
    pub async fn find_by_id(&self, id: RecipientId) -> AppResult<Option<Recipient>> {
        sqlx::query_as::<_, Recipient>("SELECT * FROM recipients WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find recipient", e))
    }

    /// Find a user's subscription to a topic.
    pub async fn find_by_user_and_topic(
        &self,
        user_id: UserId,
        topic: NotificationTopic,
    ) -> AppResult<Option<Recipient>> {
        sqlx::query_as::<_, Recipient>(
            "SELECT * FROM recipients WHERE user_id = $1 AND topic = $2",
        )
        .bind(user_id)
        .bind(topic)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find recipient", e))
    }

    /// Create a subscription. The user is referenced by id only; no full
    /// user row is fetched or required.
    pub async fn create(
        &self,
        user_id: UserId,
        topic: NotificationTopic,
        is_active: bool,
    ) -> AppResult<Recipient> {
        sqlx::query_as::<_, Recipient>(
            "INSERT INTO recipients (user_id, topic, is_active) \
             VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(user_id)
        .bind(topic)
        .bind(is_active)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to create recipient", e))
    }

    /// Set the active flag. Returns the updated row.
    pub async fn set_active(&self, id: RecipientId, is_active: bool) -> AppResult<Recipient> {
        sqlx::query_as::<_, Recipient>(
            "UPDATE recipients SET is_active = $2, updated_at = NOW() \
             WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(is_active)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to update recipient", e))?
        .ok_or_else(|| AppError::not_found(format!("Recipient {id} not found")))
    }

    /// Mark the recipient's latest notification as acknowledged.
    pub async fn mark_read(&self, id: RecipientId, read_at: DateTime<Utc>) -> AppResult<()> {
        sqlx::query(
            "UPDATE recipients SET is_read = TRUE, read_at = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(read_at)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to mark read", e))?;
        Ok(())
    }
}
