pub mod password_reset_repository;
pub mod session_repository;
pub mod user_repository;

pub use password_reset_repository::{PasswordResetRepository, SqlitePasswordResetRepository};
pub use session_repository::{SessionRecord, SessionRepository, SqliteSessionRepository};
pub use user_repository::{SqliteUserRepository, UserCredentials, UserRepository};
