// Database backup download and restore

pub mod controllers;
pub mod services;

pub use services::{BackupService, RestoreReport};
