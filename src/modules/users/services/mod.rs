pub mod auth_service;
pub mod password;
pub mod password_reset_service;
pub mod user_service;

pub use auth_service::AuthService;
pub use password_reset_service::PasswordResetService;
pub use user_service::UserService;
