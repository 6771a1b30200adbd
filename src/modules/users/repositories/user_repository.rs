use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use crate::core::timezone::{parse_storage, to_storage};
use crate::core::{AppError, Result};
use crate::modules::users::models::{NewUser, User, UserRole, UserStatus};

/// A user together with the stored password hash
#[derive(Debug, Clone)]
pub struct UserCredentials {
    pub user: User,
    pub password_hash: String,
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create(&self, user: &NewUser) -> Result<User>;

    async fn find_by_id(&self, id: i64) -> Result<Option<User>>;

    async fn find_credentials(&self, username: &str) -> Result<Option<UserCredentials>>;

    async fn find_credentials_by_id(&self, id: i64) -> Result<Option<UserCredentials>>;

    /// Oldest account registered with this email or phone
    async fn find_by_contact(&self, email: Option<&str>, phone: Option<&str>) -> Result<Option<User>>;

    /// Users ordered by id; only those in `status` when given
    async fn list(&self, status: Option<UserStatus>) -> Result<Vec<User>>;

    async fn approve(&self, id: i64, approved_by: i64, at: DateTime<Utc>) -> Result<bool>;

    async fn set_role(&self, id: i64, role: UserRole) -> Result<bool>;

    async fn set_password_hash(&self, id: i64, password_hash: &str) -> Result<bool>;

    async fn update_contact(&self, id: i64, email: Option<&str>, phone: Option<&str>) -> Result<bool>;

    async fn delete(&self, id: i64) -> Result<bool>;

    /// Admins able to log in; pending accounts do not count
    async fn count_approved_admins(&self) -> Result<i64>;
}

#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: i64,
    username: String,
    password_hash: String,
    full_name: String,
    email: Option<String>,
    phone: Option<String>,
    role: String,
    status: String,
    created_at: String,
    approved_at: Option<String>,
    approved_by: Option<i64>,
}

impl UserRow {
    fn into_credentials(self) -> Result<UserCredentials> {
        let user = User {
            id: self.id,
            username: self.username,
            full_name: self.full_name,
            email: self.email,
            phone: self.phone,
            role: self.role.parse()?,
            status: self.status.parse()?,
            created_at: parse_storage(&self.created_at, "created_at")?,
            approved_at: self
                .approved_at
                .as_deref()
                .map(|at| parse_storage(at, "approved_at"))
                .transpose()?,
            approved_by: self.approved_by,
        };

        Ok(UserCredentials {
            user,
            password_hash: self.password_hash,
        })
    }

    fn into_user(self) -> Result<User> {
        Ok(self.into_credentials()?.user)
    }
}

const USER_COLUMNS: &str = "id, username, password_hash, full_name, email, phone, role, status, \
                            created_at, approved_at, approved_by";

pub struct SqliteUserRepository {
    pool: SqlitePool,
}

impl SqliteUserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn fetch_by_id(&self, id: i64) -> Result<Option<UserRow>> {
        let sql = format!("SELECT {} FROM users WHERE id = ?", USER_COLUMNS);
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row)
    }

    async fn fetch_by_username(&self, username: &str) -> Result<Option<UserRow>> {
        let sql = format!("SELECT {} FROM users WHERE username = ?", USER_COLUMNS);
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row)
    }
}

#[async_trait]
impl UserRepository for SqliteUserRepository {
    async fn create(&self, user: &NewUser) -> Result<User> {
        let now = Utc::now();
        let approved_at = (user.status == UserStatus::Approved).then(|| to_storage(now));

        let id = sqlx::query(
            r#"
            INSERT INTO users (
                username, password_hash, full_name, email, phone, role, status,
                created_at, approved_at, approved_by
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(&user.full_name)
        .bind(&user.email)
        .bind(&user.phone)
        .bind(user.role.as_str())
        .bind(user.status.as_str())
        .bind(to_storage(now))
        .bind(&approved_at)
        .bind(user.approved_by)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::on_unique_violation(e, "username already exists"))?
        .last_insert_rowid();

        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::internal(format!("User {} vanished after insert", id)))
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>> {
        self.fetch_by_id(id)
            .await?
            .map(UserRow::into_user)
            .transpose()
    }

    async fn find_credentials(&self, username: &str) -> Result<Option<UserCredentials>> {
        self.fetch_by_username(username)
            .await?
            .map(UserRow::into_credentials)
            .transpose()
    }

    async fn find_credentials_by_id(&self, id: i64) -> Result<Option<UserCredentials>> {
        self.fetch_by_id(id)
            .await?
            .map(UserRow::into_credentials)
            .transpose()
    }

    async fn find_by_contact(&self, email: Option<&str>, phone: Option<&str>) -> Result<Option<User>> {
        if let Some(email) = email {
            let sql = format!(
                "SELECT {} FROM users WHERE email = ? COLLATE NOCASE ORDER BY id LIMIT 1",
                USER_COLUMNS
            );
            let row = sqlx::query_as::<_, UserRow>(&sql)
                .bind(email)
                .fetch_optional(&self.pool)
                .await?;
            if let Some(row) = row {
                return row.into_user().map(Some);
            }
        }

        let Some(phone) = phone else {
            return Ok(None);
        };

        let sql = format!("SELECT {} FROM users WHERE phone = ? ORDER BY id LIMIT 1", USER_COLUMNS);
        sqlx::query_as::<_, UserRow>(&sql)
            .bind(phone)
            .fetch_optional(&self.pool)
            .await?
            .map(UserRow::into_user)
            .transpose()
    }

    async fn list(&self, status: Option<UserStatus>) -> Result<Vec<User>> {
        let sql = format!(
            "SELECT {} FROM users WHERE (?1 IS NULL OR status = ?1) ORDER BY id",
            USER_COLUMNS
        );
        let rows = sqlx::query_as::<_, UserRow>(&sql)
            .bind(status.map(|s| s.as_str()))
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(UserRow::into_user).collect()
    }

    async fn approve(&self, id: i64, approved_by: i64, at: DateTime<Utc>) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE users SET status = 'approved', approved_at = ?, approved_by = ? WHERE id = ?",
        )
        .bind(to_storage(at))
        .bind(approved_by)
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn set_role(&self, id: i64, role: UserRole) -> Result<bool> {
        let result = sqlx::query("UPDATE users SET role = ? WHERE id = ?")
            .bind(role.as_str())
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn set_password_hash(&self, id: i64, password_hash: &str) -> Result<bool> {
        let result = sqlx::query("UPDATE users SET password_hash = ? WHERE id = ?")
            .bind(password_hash)
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn update_contact(&self, id: i64, email: Option<&str>, phone: Option<&str>) -> Result<bool> {
        let result = sqlx::query("UPDATE users SET email = ?, phone = ? WHERE id = ?")
            .bind(email)
            .bind(phone)
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn count_approved_admins(&self) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM users WHERE role = 'admin' AND status = 'approved'",
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }
}
