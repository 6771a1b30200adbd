// Users, sessions and admin account management

pub mod controllers;
pub mod models;
pub mod repositories;
pub mod services;

pub use models::{Principal, User, UserRole, UserStatus};
pub use services::{AuthService, PasswordResetService, UserService};
