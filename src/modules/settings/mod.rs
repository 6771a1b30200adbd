// Shop settings: metal rate table and default GST

pub mod controllers;
pub mod models;
pub mod repositories;
pub mod services;

pub use models::{MetalRate, ShopSettings};
pub use repositories::{SettingsRepository, SqliteSettingsRepository};
pub use services::SettingsService;
