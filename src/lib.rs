//! JewelCalc jewellery-shop billing service
//!
//! Prices jewellery line items from weight, metal rate, wastage and making
//! charges, aggregates them into GST invoices, persists customers and invoices
//! in SQLite, renders A4 and thermal PDF receipts, and
//! exports or restores whole-database backups.

pub mod config;
pub mod core;
pub mod middleware;
pub mod modules;

use std::sync::Arc;

use actix_web::web;
use sqlx::SqlitePool;

use crate::config::Config;
use crate::middleware::{configure_extractors, RateLimiter};
use crate::modules::backup::BackupService;
use crate::modules::customers::{CustomerService, SqliteCustomerRepository};
use crate::modules::invoices::services::InvoiceNumberGenerator;
use crate::modules::invoices::{InvoiceService, SqliteInvoiceRepository};
use crate::modules::reports::ReportService;
use crate::modules::settings::{SettingsService, SqliteSettingsRepository};
use crate::modules::users::repositories::{
    SqlitePasswordResetRepository, SqliteSessionRepository, SqliteUserRepository,
};
use crate::modules::users::{AuthService, PasswordResetService, UserService};

// Re-export commonly used types
pub use crate::core::{AppError, Result};
pub use modules::customers;
pub use modules::invoices;

/// Shared services behind the HTTP handlers
#[derive(Clone)]
pub struct AppServices {
    pub pool: SqlitePool,
    pub auth: Arc<AuthService>,
    pub users: Arc<UserService>,
    pub password_resets: Arc<PasswordResetService>,
    pub customers: Arc<CustomerService>,
    pub invoices: Arc<InvoiceService>,
    pub settings: Arc<SettingsService>,
    pub reports: Arc<ReportService>,
    pub backup: Arc<BackupService>,
    pub login_limiter: RateLimiter,
}

impl AppServices {
    /// Wire SQLite repositories into the services
    pub fn new(pool: SqlitePool, config: &Config) -> Self {
        let user_repo = Arc::new(SqliteUserRepository::new(pool.clone()));
        let session_repo = Arc::new(SqliteSessionRepository::new(pool.clone()));
        let reset_repo = Arc::new(SqlitePasswordResetRepository::new(pool.clone()));
        let customer_repo = Arc::new(SqliteCustomerRepository::new(pool.clone()));
        let invoice_repo = Arc::new(SqliteInvoiceRepository::new(pool.clone()));
        let settings_repo = Arc::new(SqliteSettingsRepository::new(pool.clone()));

        let settings = Arc::new(SettingsService::new(settings_repo, config.billing.clone()));

        Self {
            auth: Arc::new(AuthService::new(
                user_repo.clone(),
                session_repo.clone(),
                &config.security,
            )),
            users: Arc::new(UserService::new(user_repo.clone(), session_repo)),
            password_resets: Arc::new(PasswordResetService::new(user_repo, reset_repo)),
            customers: Arc::new(CustomerService::new(customer_repo.clone())),
            invoices: Arc::new(InvoiceService::new(
                invoice_repo.clone(),
                customer_repo.clone(),
                settings.clone(),
                InvoiceNumberGenerator::new(config.billing.invoice_number_attempts),
            )),
            reports: Arc::new(ReportService::new(invoice_repo, customer_repo)),
            settings,
            backup: Arc::new(BackupService::new(pool.clone())),
            login_limiter: RateLimiter::new(config.security.login_rate_limit_per_minute),
            pool,
        }
    }

    /// Register app data and every route.
    ///
    /// Session middleware is applied by the caller with
    /// `SessionAuth::new(services.auth.clone())`.
    pub fn configure(&self, cfg: &mut web::ServiceConfig) {
        cfg.app_data(web::Data::new(self.pool.clone()))
            .app_data(web::Data::new(self.auth.clone()))
            .app_data(web::Data::new(self.users.clone()))
            .app_data(web::Data::new(self.password_resets.clone()))
            .app_data(web::Data::new(self.customers.clone()))
            .app_data(web::Data::new(self.invoices.clone()))
            .app_data(web::Data::new(self.settings.clone()))
            .app_data(web::Data::new(self.reports.clone()))
            .app_data(web::Data::new(self.backup.clone()));

        configure_extractors(cfg);

        modules::health::controllers::configure(cfg);
        modules::users::controllers::auth_controller::configure(cfg, self.login_limiter.clone());
        modules::users::controllers::admin_controller::configure(cfg);
        modules::customers::controllers::configure(cfg);
        modules::invoices::controllers::configure(cfg);
        modules::settings::controllers::configure(cfg);
        modules::reports::controllers::configure(cfg);
        modules::backup::controllers::configure(cfg);
    }
}
