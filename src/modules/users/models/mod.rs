mod password_reset;
mod user;

pub use password_reset::{
    NewPasswordResetRequest, PasswordResetRequest, ResetLookup, ResetRequestStatus,
    ResetRequestType, ResolveResetRequest, SetPasswordRequest,
};
pub use user::{
    normalize_contact, validate_password, validate_username, ChangePasswordRequest,
    ChangeRoleRequest, CreateUserRequest, LoginRequest, LoginResponse, NewUser, Principal,
    SignupRequest, UpdateProfileRequest, User, UserRole, UserStatus, MIN_PASSWORD_LENGTH,
};
