// Forgotten password/username requests.
//
// Anyone can file one from the login screen by naming a username, email or
// phone. An admin then resolves it (setting a new password when one was
// asked for) or rejects it.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::{AppError, Result};
use crate::modules::customers::models::validate_phone;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResetRequestType {
    #[default]
    Password,
    Username,
    Both,
}

impl ResetRequestType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResetRequestType::Password => "password",
            ResetRequestType::Username => "username",
            ResetRequestType::Both => "both",
        }
    }

    /// Whether resolving the request sets a new password
    pub fn needs_password(&self) -> bool {
        matches!(self, ResetRequestType::Password | ResetRequestType::Both)
    }
}

impl FromStr for ResetRequestType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "password" => Ok(ResetRequestType::Password),
            "username" => Ok(ResetRequestType::Username),
            "both" => Ok(ResetRequestType::Both),
            other => Err(AppError::validation(format!("Unknown request type '{}'", other))),
        }
    }
}

impl fmt::Display for ResetRequestType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResetRequestStatus {
    Pending,
    Resolved,
    Rejected,
}

impl ResetRequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResetRequestStatus::Pending => "pending",
            ResetRequestStatus::Resolved => "resolved",
            ResetRequestStatus::Rejected => "rejected",
        }
    }
}

impl FromStr for ResetRequestStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "pending" => Ok(ResetRequestStatus::Pending),
            "resolved" => Ok(ResetRequestStatus::Resolved),
            "rejected" => Ok(ResetRequestStatus::Rejected),
            other => Err(AppError::validation(format!(
                "Unknown reset request status '{}'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PasswordResetRequest {
    pub id: i64,
    pub user_id: i64,
    pub username: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub request_type: ResetRequestType,
    pub status: ResetRequestStatus,
    pub requested_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
    pub resolved_by: Option<i64>,
}

impl PasswordResetRequest {
    pub fn is_pending(&self) -> bool {
        self.status == ResetRequestStatus::Pending
    }
}

/// Body of `POST /auth/password-reset`; at least one identifier is required
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResetLookup {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub request_type: ResetRequestType,
}

impl ResetLookup {
    /// Trim the identifiers, dropping blank ones
    pub fn normalized(self) -> Result<Self> {
        let clean = |value: Option<String>| {
            value
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let lookup = Self {
            username: clean(self.username),
            email: clean(self.email),
            phone: clean(self.phone),
            request_type: self.request_type,
        };

        if lookup.username.is_none() && lookup.email.is_none() && lookup.phone.is_none() {
            return Err(AppError::validation(
                "Provide a username, email or phone number",
            ));
        }

        if let Some(phone) = &lookup.phone {
            validate_phone(phone)?;
        }

        Ok(lookup)
    }
}

/// A request ready to be stored, after the user was found
#[derive(Debug, Clone)]
pub struct NewPasswordResetRequest {
    pub user_id: i64,
    pub username: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub request_type: ResetRequestType,
}

/// Admin resolution of a request
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResolveResetRequest {
    #[serde(default)]
    pub new_password: Option<String>,
}

/// Admin-set password for a user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetPasswordRequest {
    pub new_password: String,
}
