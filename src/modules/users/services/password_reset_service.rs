use std::sync::Arc;

use chrono::Utc;

use crate::core::{AppError, Result};
use crate::modules::users::models::{
    validate_password, NewPasswordResetRequest, PasswordResetRequest, Principal, ResetLookup,
    ResolveResetRequest, User,
};
use crate::modules::users::repositories::{PasswordResetRepository, UserRepository};
use crate::modules::users::services::password::hash_password;

/// Forgotten password/username requests filed at login and closed by an admin
pub struct PasswordResetService {
    users: Arc<dyn UserRepository>,
    resets: Arc<dyn PasswordResetRepository>,
}

impl PasswordResetService {
    pub fn new(users: Arc<dyn UserRepository>, resets: Arc<dyn PasswordResetRepository>) -> Self {
        Self { users, resets }
    }

    /// File a request for the account matching the username, else the email,
    /// else the phone. Returns `None` when no account matches.
    pub async fn submit(&self, lookup: ResetLookup) -> Result<Option<PasswordResetRequest>> {
        let lookup = lookup.normalized()?;

        let Some(user) = self.find_user(&lookup).await? else {
            tracing::info!("Password reset requested for an unknown account");
            return Ok(None);
        };

        let request = self
            .resets
            .create(
                &NewPasswordResetRequest {
                    user_id: user.id,
                    email: lookup.email.or(user.email),
                    phone: lookup.phone.or(user.phone),
                    username: user.username,
                    request_type: lookup.request_type,
                },
                Utc::now(),
            )
            .await?;

        tracing::info!(
            request_id = request.id,
            user_id = request.user_id,
            request_type = %request.request_type,
            "Password reset requested"
        );
        Ok(Some(request))
    }

    pub async fn list_pending(&self, admin: &Principal) -> Result<Vec<PasswordResetRequest>> {
        admin.require_admin()?;
        self.resets.list_pending().await
    }

    /// Close a pending request. Password requests need `new_password`;
    /// username-only requests must not carry one.
    pub async fn resolve(
        &self,
        admin: &Principal,
        id: i64,
        resolution: ResolveResetRequest,
    ) -> Result<PasswordResetRequest> {
        admin.require_admin()?;
        let request = self.find_pending(id).await?;

        let password_hash = match (request.request_type.needs_password(), resolution.new_password) {
            (true, Some(password)) => {
                validate_password(&password)?;
                Some(hash_password(&password)?)
            }
            (true, None) => {
                return Err(AppError::validation(format!(
                    "Request {} asks for a new password; supply new_password",
                    id
                )))
            }
            (false, Some(_)) => {
                return Err(AppError::validation(format!(
                    "Request {} only asks for the username; it does not set a password",
                    id
                )))
            }
            (false, None) => None,
        };

        if !self
            .resets
            .resolve(id, admin.user_id, password_hash.as_deref(), Utc::now())
            .await?
        {
            return Err(already_closed(id));
        }

        tracing::info!(
            request_id = id,
            user_id = request.user_id,
            resolved_by = admin.user_id,
            password_set = password_hash.is_some(),
            "Password reset request resolved"
        );

        self.find(id).await
    }

    pub async fn reject(&self, admin: &Principal, id: i64) -> Result<PasswordResetRequest> {
        admin.require_admin()?;
        self.find_pending(id).await?;

        if !self.resets.reject(id, admin.user_id, Utc::now()).await? {
            return Err(already_closed(id));
        }

        tracing::info!(request_id = id, rejected_by = admin.user_id, "Password reset request rejected");
        self.find(id).await
    }

    async fn find_user(&self, lookup: &ResetLookup) -> Result<Option<User>> {
        if let Some(username) = &lookup.username {
            if let Some(credentials) = self.users.find_credentials(username).await? {
                return Ok(Some(credentials.user));
            }
        }

        self.users
            .find_by_contact(lookup.email.as_deref(), lookup.phone.as_deref())
            .await
    }

    async fn find(&self, id: i64) -> Result<PasswordResetRequest> {
        self.resets
            .find(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Password reset request {} not found", id)))
    }

    async fn find_pending(&self, id: i64) -> Result<PasswordResetRequest> {
        let request = self.find(id).await?;
        if !request.is_pending() {
            return Err(already_closed(id));
        }
        Ok(request)
    }
}

fn already_closed(id: i64) -> AppError {
    AppError::validation(format!("Password reset request {} is no longer pending", id))
}
