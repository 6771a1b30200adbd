pub mod backup_service;

pub use backup_service::{BackupService, RestoreReport};
