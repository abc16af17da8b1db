//! Session repository for database operations.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::{Row, SqlitePool};

use crate::entities::{timestamp, SessionRecord};
use crate::store::SessionStore;
use crate::types::{DatabaseError, DatabaseResult};

/// Repository for session database operations
#[derive(Clone)]
pub struct SessionRepository {
    pool: SqlitePool,
}

impl SessionRepository {
    /// Create a new session repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl SessionStore for SessionRepository {
    async fn load(&self, token: &str) -> DatabaseResult<Option<SessionRecord>> {
        let row = sqlx::query(
            "SELECT token, data, expires_at FROM sessions WHERE token = ? AND expires_at > ?",
        )
        .bind(token)
        .bind(timestamp(Utc::now()))
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let data: String = row.try_get("data")?;
        let expires_at: String = row.try_get("expires_at")?;
        let expires_at = DateTime::parse_from_rfc3339(&expires_at)
            .map_err(|e| DatabaseError::SerializationError(e.to_string()))?
            .with_timezone(&Utc);

        Ok(Some(SessionRecord {
            token: row.try_get("token")?,
            data: serde_json::from_str::<HashMap<String, Value>>(&data)?,
            expires_at,
        }))
    }

    async fn save(&self, record: &SessionRecord) -> DatabaseResult<()> {
        let data = serde_json::to_string(&record.data)?;

        sqlx::query(
            "INSERT INTO sessions (token, data, created_at, expires_at) VALUES (?, ?, ?, ?)
             ON CONFLICT(token) DO UPDATE SET data = excluded.data, expires_at = excluded.expires_at",
        )
        .bind(&record.token)
        .bind(data)
        .bind(timestamp(Utc::now()))
        .bind(timestamp(record.expires_at))
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete(&self, token: &str) -> DatabaseResult<()> {
        sqlx::query("DELETE FROM sessions WHERE token = ?")
            .bind(token)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> DatabaseResult<u64> {
        let result = sqlx::query("DELETE FROM sessions WHERE expires_at <= ?")
            .bind(timestamp(now))
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
