use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use crate::core::timezone::{parse_storage, to_storage};
use crate::core::Result;

/// A login session keyed by the SHA-256 of its bearer token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionRecord {
    pub token_hash: String,
    pub user_id: i64,
    pub created_at: DateTime<Utc>,
    pub last_seen_at: DateTime<Utc>,
}

#[async_trait]
pub trait SessionRepository: Send + Sync {
    async fn create(&self, token_hash: &str, user_id: i64, at: DateTime<Utc>) -> Result<()>;

    async fn find(&self, token_hash: &str) -> Result<Option<SessionRecord>>;

    async fn touch(&self, token_hash: &str, at: DateTime<Utc>) -> Result<()>;

    async fn delete(&self, token_hash: &str) -> Result<bool>;

    /// End every session of a user; returns how many
    async fn delete_for_user(&self, user_id: i64) -> Result<u64>;

    /// Remove sessions idle since before `cutoff`; returns how many
    async fn delete_idle_before(&self, cutoff: DateTime<Utc>) -> Result<u64>;
}

#[derive(Debug, sqlx::FromRow)]
struct SessionRow {
    token_hash: String,
    user_id: i64,
    created_at: String,
    last_seen_at: String,
}

pub struct SqliteSessionRepository {
    pool: SqlitePool,
}

impl SqliteSessionRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SessionRepository for SqliteSessionRepository {
    async fn create(&self, token_hash: &str, user_id: i64, at: DateTime<Utc>) -> Result<()> {
        sqlx::query(
            "INSERT INTO sessions (token_hash, user_id, created_at, last_seen_at) VALUES (?, ?, ?, ?)",
        )
        .bind(token_hash)
        .bind(user_id)
        .bind(to_storage(at))
        .bind(to_storage(at))
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find(&self, token_hash: &str) -> Result<Option<SessionRecord>> {
        let row = sqlx::query_as::<_, SessionRow>(
            "SELECT token_hash, user_id, created_at, last_seen_at FROM sessions WHERE token_hash = ?",
        )
        .bind(token_hash)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        Ok(Some(SessionRecord {
            token_hash: row.token_hash,
            user_id: row.user_id,
            created_at: parse_storage(&row.created_at, "created_at")?,
            last_seen_at: parse_storage(&row.last_seen_at, "last_seen_at")?,
        }))
    }

    async fn touch(&self, token_hash: &str, at: DateTime<Utc>) -> Result<()> {
        sqlx::query("UPDATE sessions SET last_seen_at = ? WHERE token_hash = ?")
            .bind(to_storage(at))
            .bind(token_hash)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn delete(&self, token_hash: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM sessions WHERE token_hash = ?")
            .bind(token_hash)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_for_user(&self, user_id: i64) -> Result<u64> {
        let result = sqlx::query("DELETE FROM sessions WHERE user_id = ?")
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    async fn delete_idle_before(&self, cutoff: DateTime<Utc>) -> Result<u64> {
        let result = sqlx::query("DELETE FROM sessions WHERE last_seen_at < ?")
            .bind(to_storage(cutoff))
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
