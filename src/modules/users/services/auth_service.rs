use std::sync::Arc;

use chrono::{Duration, Utc};

use crate::config::SecurityConfig;
use crate::core::{AppError, Result};
use crate::modules::users::models::{
    normalize_contact, validate_password, validate_username, ChangePasswordRequest, LoginRequest,
    LoginResponse, NewUser, Principal, SignupRequest, UpdateProfileRequest, User, UserRole,
    UserStatus,
};
use crate::modules::users::repositories::{SessionRepository, UserRepository};
use crate::modules::users::services::password::{
    generate_session_token, hash_password, hash_session_token, verify_password, verify_unknown_user,
};

const BOOTSTRAP_ADMIN_USERNAME: &str = "admin";

/// Sign-up, login and bearer-token sessions
pub struct AuthService {
    users: Arc<dyn UserRepository>,
    sessions: Arc<dyn SessionRepository>,
    idle_timeout: Duration,
}

impl AuthService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        sessions: Arc<dyn SessionRepository>,
        security: &SecurityConfig,
    ) -> Self {
        Self {
            users,
            sessions,
            idle_timeout: Duration::hours(security.session_timeout_hours),
        }
    }

    /// Register a user awaiting admin approval
    pub async fn signup(&self, request: SignupRequest) -> Result<User> {
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
                role: UserRole::User,
                status: UserStatus::Pending,
                approved_by: None,
            })
            .await?;

        tracing::info!(user_id = user.id, username = %user.username, "User signed up, pending approval");
        Ok(user)
    }

    /// Check credentials and open a session
    pub async fn login(&self, request: LoginRequest) -> Result<LoginResponse> {
        let invalid = || AppError::unauthorized("invalid username or password");

        let Some(credentials) = self.users.find_credentials(request.username.trim()).await? else {
            verify_unknown_user(&request.password);
            return Err(invalid());
        };

        if !verify_password(&request.password, &credentials.password_hash)? {
            tracing::warn!(username = %credentials.user.username, "Failed login attempt");
            return Err(invalid());
        }

        if !credentials.user.is_approved() {
            return Err(AppError::unauthorized("account pending approval"));
        }

        let now = Utc::now();
        let purged = self.sessions.delete_idle_before(now - self.idle_timeout).await?;
        if purged > 0 {
            tracing::debug!(purged, "Removed idle sessions");
        }

        let token = generate_session_token();
        self.sessions
            .create(&hash_session_token(&token), credentials.user.id, now)
            .await?;

        tracing::info!(user_id = credentials.user.id, "User logged in");

        Ok(LoginResponse {
            token,
            user: credentials.user,
            idle_timeout_hours: self.idle_timeout.num_hours(),
        })
    }

    /// Resolve a bearer token to its user, refreshing the session's idle timer.
    ///
    /// A session idle for longer than the timeout is deleted and rejected.
    pub async fn authenticate(&self, token: &str) -> Result<Principal> {
        let token_hash = hash_session_token(token);
        let session = self
            .sessions
            .find(&token_hash)
            .await?
            .ok_or_else(|| AppError::unauthorized("invalid or expired session"))?;

        let now = Utc::now();
        if now - session.last_seen_at > self.idle_timeout {
            self.sessions.delete(&token_hash).await?;
            return Err(AppError::unauthorized("session expired, please log in again"));
        }

        let user = self
            .users
            .find_by_id(session.user_id)
            .await?
            .filter(User::is_approved)
            .ok_or_else(|| AppError::unauthorized("invalid or expired session"))?;

        self.sessions.touch(&token_hash, now).await?;

        Ok(Principal {
            user_id: user.id,
            username: user.username,
            role: user.role,
        })
    }

    pub async fn logout(&self, token: &str) -> Result<()> {
        self.sessions.delete(&hash_session_token(token)).await?;
        Ok(())
    }

    pub async fn current_user(&self, principal: &Principal) -> Result<User> {
        self.users
            .find_by_id(principal.user_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("User {} not found", principal.user_id)))
    }

    pub async fn change_password(
        &self,
        principal: &Principal,
        request: ChangePasswordRequest,
    ) -> Result<()> {
        let credentials = self
            .users
            .find_credentials_by_id(principal.user_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("User {} not found", principal.user_id)))?;

        if !verify_password(&request.current_password, &credentials.password_hash)? {
            return Err(AppError::unauthorized("current password is incorrect"));
        }

        validate_password(&request.new_password)?;
        self.users
            .set_password_hash(principal.user_id, &hash_password(&request.new_password)?)
            .await?;

        tracing::info!(user_id = principal.user_id, "Password changed");
        Ok(())
    }

    pub async fn update_profile(
        &self,
        principal: &Principal,
        request: UpdateProfileRequest,
    ) -> Result<User> {
        let (email, phone) = normalize_contact(request.email, request.phone)?;

        self.users
            .update_contact(principal.user_id, email.as_deref(), phone.as_deref())
            .await?;

        self.current_user(principal).await
    }

    /// Create the `admin` account when no admin exists yet
    pub async fn bootstrap_admin(&self, password: &str) -> Result<Option<User>> {
        if self.users.count_approved_admins().await? > 0 {
            return Ok(None);
        }

        validate_password(password)?;
        let admin = self
            .users
            .create(&NewUser {
                username: BOOTSTRAP_ADMIN_USERNAME.to_string(),
                password_hash: hash_password(password)?,
                full_name: "Administrator".to_string(),
                email: None,
                phone: None,
                role: UserRole::Admin,
                status: UserStatus::Approved,
                approved_by: None,
            })
            .await?;

        tracing::warn!(
            username = BOOTSTRAP_ADMIN_USERNAME,
            "Created bootstrap admin account; change its password"
        );
        Ok(Some(admin))
    }
}
