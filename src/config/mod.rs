use crate::core::{AppError, Result};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::env;
use std::str::FromStr;

pub mod database;
pub mod server;

pub use database::DatabaseConfig;
pub use server::ServerConfig;

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub app: AppConfig,
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub billing: BillingConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub env: String,
    pub log_level: String,
}

/// Defaults applied when composing invoices
#[derive(Debug, Clone, Deserialize)]
pub struct BillingConfig {
    pub default_cgst_percent: Decimal,
    pub default_sgst_percent: Decimal,
    pub invoice_number_attempts: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SecurityConfig {
    pub session_timeout_hours: i64,
    pub admin_bootstrap_password: String,
    pub login_rate_limit_per_minute: u32,
}

impl Default for BillingConfig {
    fn default() -> Self {
        Self {
            default_cgst_percent: Decimal::new(15, 1),
            default_sgst_percent: Decimal::new(15, 1),
            invoice_number_attempts: 5,
        }
    }
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            session_timeout_hours: 4,
            admin_bootstrap_password: "admin123".to_string(),
            login_rate_limit_per_minute: 30,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present
        dotenvy::dotenv().ok();

        let config = Config {
            app: AppConfig {
                env: env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
                log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            },
            database: DatabaseConfig::from_env()?,
            server: ServerConfig::from_env()?,
            billing: BillingConfig {
                default_cgst_percent: parse_var("DEFAULT_CGST_PERCENT", "1.5")?,
                default_sgst_percent: parse_var("DEFAULT_SGST_PERCENT", "1.5")?,
                invoice_number_attempts: parse_var("INVOICE_NUMBER_ATTEMPTS", "5")?,
            },
            security: SecurityConfig {
                session_timeout_hours: parse_var("SESSION_TIMEOUT_HOURS", "4")?,
                admin_bootstrap_password: env::var("ADMIN_BOOTSTRAP_PASSWORD")
                    .unwrap_or_else(|_| "admin123".to_string()),
                login_rate_limit_per_minute: parse_var("LOGIN_RATE_LIMIT_PER_MINUTE", "30")?,
            },
        };

        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.billing.default_cgst_percent < Decimal::ZERO
            || self.billing.default_sgst_percent < Decimal::ZERO
        {
            return Err(AppError::Configuration(
                "Default GST percentages cannot be negative".to_string(),
            ));
        }

        if self.billing.invoice_number_attempts == 0 {
            return Err(AppError::Configuration(
                "Invoice number attempts must be greater than 0".to_string(),
            ));
        }

        if self.security.session_timeout_hours <= 0 {
            return Err(AppError::Configuration(
                "Session timeout must be greater than 0".to_string(),
            ));
        }

        if self.security.admin_bootstrap_password.len() < 6 {
            return Err(AppError::Configuration(
                "ADMIN_BOOTSTRAP_PASSWORD must be at least 6 characters".to_string(),
            ));
        }

        if self.is_production() && self.security.admin_bootstrap_password == "admin123" {
            return Err(AppError::Configuration(
                "ADMIN_BOOTSTRAP_PASSWORD must be set in production".to_string(),
            ));
        }

        if self.security.login_rate_limit_per_minute == 0 {
            return Err(AppError::Configuration(
                "Login rate limit must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    pub fn is_production(&self) -> bool {
        self.app.env == "production"
    }
}

fn parse_var<T: FromStr>(name: &str, default: &str) -> Result<T> {
    env::var(name)
        .unwrap_or_else(|_| default.to_string())
        .parse()
        .map_err(|_| AppError::Configuration(format!("Invalid {}", name)))
}
