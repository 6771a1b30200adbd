use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use crate::core::timezone::{parse_storage, to_storage};
use crate::core::{AppError, Result};
use crate::modules::users::models::{NewPasswordResetRequest, PasswordResetRequest};

#[async_trait]
pub trait PasswordResetRepository: Send + Sync {
    async fn create(
        &self,
        request: &NewPasswordResetRequest,
        at: DateTime<Utc>,
    ) -> Result<PasswordResetRequest>;

    async fn find(&self, id: i64) -> Result<Option<PasswordResetRequest>>;

    /// Pending requests, newest first
    async fn list_pending(&self) -> Result<Vec<PasswordResetRequest>>;

    /// Close a pending request. With `password_hash`, the user's password is
    /// replaced and their sessions ended in the same transaction.
    /// Returns false when the request was no longer pending.
    async fn resolve(
        &self,
        id: i64,
        resolved_by: i64,
        password_hash: Option<&str>,
        at: DateTime<Utc>,
    ) -> Result<bool>;

    /// Returns false when the request was no longer pending
    async fn reject(&self, id: i64, rejected_by: i64, at: DateTime<Utc>) -> Result<bool>;
}

#[derive(Debug, sqlx::FromRow)]
struct ResetRow {
    id: i64,
    user_id: i64,
    username: String,
    email: Option<String>,
    phone: Option<String>,
    request_type: String,
    status: String,
    requested_at: String,
    resolved_at: Option<String>,
    resolved_by: Option<i64>,
}

impl ResetRow {
    fn into_request(self) -> Result<PasswordResetRequest> {
        Ok(PasswordResetRequest {
            id: self.id,
            user_id: self.user_id,
            username: self.username,
            email: self.email,
            phone: self.phone,
            request_type: self.request_type.parse()?,
            status: self.status.parse()?,
            requested_at: parse_storage(&self.requested_at, "requested_at")?,
            resolved_at: self
                .resolved_at
                .as_deref()
                .map(|at| parse_storage(at, "resolved_at"))
                .transpose()?,
            resolved_by: self.resolved_by,
        })
    }
}

const RESET_COLUMNS: &str = "id, user_id, username, email, phone, request_type, status, \
                             requested_at, resolved_at, resolved_by";

pub struct SqlitePasswordResetRepository {
    pool: SqlitePool,
}

impl SqlitePasswordResetRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PasswordResetRepository for SqlitePasswordResetRepository {
    async fn create(
        &self,
        request: &NewPasswordResetRequest,
        at: DateTime<Utc>,
    ) -> Result<PasswordResetRequest> {
        let id = sqlx::query(
            r#"
            INSERT INTO password_reset_requests (
                user_id, username, email, phone, request_type, status, requested_at
            ) VALUES (?, ?, ?, ?, ?, 'pending', ?)
            "#,
        )
        .bind(request.user_id)
        .bind(&request.username)
        .bind(&request.email)
        .bind(&request.phone)
        .bind(request.request_type.as_str())
        .bind(to_storage(at))
        .execute(&self.pool)
        .await?
        .last_insert_rowid();

        self.find(id).await?.ok_or_else(|| {
            AppError::internal(format!("Password reset request {} vanished after insert", id))
        })
    }

    async fn find(&self, id: i64) -> Result<Option<PasswordResetRequest>> {
        let sql = format!(
            "SELECT {} FROM password_reset_requests WHERE id = ?",
            RESET_COLUMNS
        );
        sqlx::query_as::<_, ResetRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(ResetRow::into_request)
            .transpose()
    }

    async fn list_pending(&self) -> Result<Vec<PasswordResetRequest>> {
        let sql = format!(
            "SELECT {} FROM password_reset_requests WHERE status = 'pending' \
             ORDER BY requested_at DESC, id DESC",
            RESET_COLUMNS
        );
        let rows = sqlx::query_as::<_, ResetRow>(&sql)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(ResetRow::into_request).collect()
    }

    async fn resolve(
        &self,
        id: i64,
        resolved_by: i64,
        password_hash: Option<&str>,
        at: DateTime<Utc>,
    ) -> Result<bool> {
        let mut tx = self.pool.begin().await?;

        let closed = sqlx::query(
            "UPDATE password_reset_requests SET status = 'resolved', resolved_at = ?, \
             resolved_by = ? WHERE id = ? AND status = 'pending'",
        )
        .bind(to_storage(at))
        .bind(resolved_by)
        .bind(id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if closed == 0 {
            return Ok(false);
        }

        if let Some(password_hash) = password_hash {
            sqlx::query(
                "UPDATE users SET password_hash = ? \
                 WHERE id = (SELECT user_id FROM password_reset_requests WHERE id = ?)",
            )
            .bind(password_hash)
            .bind(id)
            .execute(&mut *tx)
            .await?;

            sqlx::query(
                "DELETE FROM sessions \
                 WHERE user_id = (SELECT user_id FROM password_reset_requests WHERE id = ?)",
            )
            .bind(id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(true)
    }

    async fn reject(&self, id: i64, rejected_by: i64, at: DateTime<Utc>) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE password_reset_requests SET status = 'rejected', resolved_at = ?, \
             resolved_by = ? WHERE id = ? AND status = 'pending'",
        )
        .bind(to_storage(at))
        .bind(rejected_by)
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
