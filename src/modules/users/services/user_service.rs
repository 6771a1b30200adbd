use std::sync::Arc;

use chrono::Utc;

use crate::core::{AppError, Result};
use crate::modules::users::models::{
    normalize_contact, validate_password, validate_username, CreateUserRequest, NewUser,
    Principal, SetPasswordRequest, User, UserRole, UserStatus,
};
use crate::modules::users::repositories::{SessionRepository, UserRepository};
use crate::modules::users::services::password::hash_password;

/// Admin-only account management. Every method checks the caller's role.
pub struct UserService {
    users: Arc<dyn UserRepository>,
    sessions: Arc<dyn SessionRepository>,
}

impl UserService {
    pub fn new(users: Arc<dyn UserRepository>, sessions: Arc<dyn SessionRepository>) -> Self {
        Self { users, sessions }
    }

    pub async fn list_users(&self, admin: &Principal) -> Result<Vec<User>> {
        admin.require_admin()?;
        self.users.list(None).await
    }

    pub async fn list_pending(&self, admin: &Principal) -> Result<Vec<User>> {
        admin.require_admin()?;
        self.users.list(Some(UserStatus::Pending)).await
    }

    pub async fn approve_user(&self, admin: &Principal, id: i64) -> Result<User> {
        admin.require_admin()?;
        let user = self.find(id).await?;

        if user.is_approved() {
            return Err(AppError::validation(format!(
                "User '{}' is already approved",
                user.username
            )));
        }

        self.users.approve(id, admin.user_id, Utc::now()).await?;
        tracing::info!(user_id = id, approved_by = admin.user_id, "User approved");

        self.find(id).await
    }

    /// Reject a pending sign-up by deleting it
    pub async fn reject_user(&self, admin: &Principal, id: i64) -> Result<()> {
        admin.require_admin()?;
        let user = self.find(id).await?;

        if user.is_approved() {
            return Err(AppError::validation(format!(
                "Only pending users can be rejected; '{}' is approved",
                user.username
            )));
        }

        self.users.delete(id).await?;
        tracing::info!(user_id = id, rejected_by = admin.user_id, "User rejected");
        Ok(())
    }

    /// Change an approved user's role. The last approved admin cannot be
    /// demoted; pending sign-ups must be approved before their role changes.
    pub async fn change_role(&self, admin: &Principal, id: i64, role: UserRole) -> Result<User> {
        admin.require_admin()?;
        let user = self.find(id).await?;

        if !user.is_approved() {
            return Err(AppError::validation(format!(
                "User '{}' is pending approval; approve the account before changing its role",
                user.username
            )));
        }

        if user.is_admin()
            && role != UserRole::Admin
            && self.users.count_approved_admins().await? <= 1
        {
            return Err(AppError::validation("Cannot demote the last admin"));
        }

        self.users.set_role(id, role).await?;
        tracing::info!(user_id = id, role = %role, changed_by = admin.user_id, "User role changed");

        self.find(id).await
    }

    /// Set a user's password without knowing the old one. The user's open
    /// sessions are ended so the new password takes effect everywhere.
    pub async fn reset_password(
        &self,
        admin: &Principal,
        id: i64,
        request: SetPasswordRequest,
    ) -> Result<()> {
        admin.require_admin()?;
        let user = self.find(id).await?;
        validate_password(&request.new_password)?;

        self.users
            .set_password_hash(user.id, &hash_password(&request.new_password)?)
            .await?;
        let ended = self.sessions.delete_for_user(user.id).await?;

        tracing::info!(
            user_id = user.id,
            reset_by = admin.user_id,
            sessions_ended = ended,
            "Password reset by admin"
        );
        Ok(())
    }

    /// Create an account that can log in immediately
    pub async fn create_user(&self, admin: &Principal, request: CreateUserRequest) -> Result<User> {
        admin.require_admin()?;

        let username = request.username.trim().to_string();
        validate_username(&username)?;
        validate_password(&request.password)?;

        let full_name = request.full_name.trim().to_string();
        if full_name.is_empty() {
            return Err(AppError::validation("Full name cannot be empty"));
        }

        let (email, phone) = normalize_contact(request.email, request.phone)?;

        let user = self
            .users
            .create(&NewUser {
                username,
                password_hash: hash_password(&request.password)?,
                full_name,
                email,
                phone,
                role: request.role,
                status: UserStatus::Approved,
                approved_by: Some(admin.user_id),
            })
            .await?;

        tracing::info!(user_id = user.id, created_by = admin.user_id, "User created by admin");
        Ok(user)
    }

    async fn find(&self, id: i64) -> Result<User> {
        self.users
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("User {} not found", id)))
    }
}
