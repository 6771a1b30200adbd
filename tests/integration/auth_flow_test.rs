// Integration tests for sign-up, approval, sessions and admin operations.

#[path = "../helpers/mod.rs"]
mod helpers;

use chrono::{Duration, Utc};
use helpers::*;
use jewelcalc::core::timezone::to_storage;
use jewelcalc::modules::users::models::{
    ChangePasswordRequest, CreateUserRequest, LoginRequest, Principal, SetPasswordRequest,
    SignupRequest, UserRole, UserStatus,
};
use jewelcalc::modules::users::services::password::hash_session_token;
use jewelcalc::AppError;

fn signup(username: &str) -> SignupRequest {
    SignupRequest {
        username: username.to_string(),
        password: "secret1".to_string(),
        full_name: "Shop Assistant".to_string(),
        email: None,
        phone: Some("9876543210".to_string()),
    }
}

fn credentials(username: &str, password: &str) -> LoginRequest {
    LoginRequest {
        username: username.to_string(),
        password: password.to_string(),
    }
}

async fn admin_principal(services: &jewelcalc::AppServices) -> Principal {
    let login = services
        .auth
        .login(credentials("admin", ADMIN_PASSWORD))
        .await
        .unwrap();
    services.auth.authenticate(&login.token).await.unwrap()
}

#[tokio::test]
async fn test_bootstrap_admin_runs_once() {
    let services = test_services().await;

    let again = services.auth.bootstrap_admin(ADMIN_PASSWORD).await.unwrap();
    assert!(again.is_none());

    let admin = admin_principal(&services).await;
    assert_eq!(admin.username, "admin");
    assert_eq!(admin.role, UserRole::Admin);
}

#[tokio::test]
async fn test_signup_requires_approval() {
    let services = test_services().await;
    let user = services.auth.signup(signup("ravi")).await.unwrap();
    assert_eq!(user.status, UserStatus::Pending);

    let err = services
        .auth
        .login(credentials("ravi", "secret1"))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("account pending approval"));

    let admin = admin_principal(&services).await;
    let pending = services.users.list_pending(&admin).await.unwrap();
    assert_eq!(pending.len(), 1);

    let approved = services.users.approve_user(&admin, user.id).await.unwrap();
    assert_eq!(approved.status, UserStatus::Approved);
    assert_eq!(approved.approved_by, Some(admin.user_id));
    assert!(approved.approved_at.is_some());

    assert!(services.auth.login(credentials("ravi", "secret1")).await.is_ok());
}

#[tokio::test]
async fn test_duplicate_username_is_a_conflict() {
    let services = test_services().await;
    services.auth.signup(signup("meera")).await.unwrap();

    let result = services.auth.signup(signup("meera")).await;
    assert!(matches!(result, Err(AppError::Conflict(_))));
}

#[tokio::test]
async fn test_bad_credentials_share_one_message() {
    let services = test_services().await;

    let unknown = services
        .auth
        .login(credentials("nobody", "whatever"))
        .await
        .unwrap_err();
    let wrong = services
        .auth
        .login(credentials("admin", "not-the-password"))
        .await
        .unwrap_err();

    assert_eq!(unknown.to_string(), wrong.to_string());
    assert!(wrong.to_string().contains("invalid username or password"));
}

#[tokio::test]
async fn test_session_token_stored_hashed() {
    let services = test_services().await;
    let login = services
        .auth
        .login(credentials("admin", ADMIN_PASSWORD))
        .await
        .unwrap();

    let stored: String = sqlx::query_scalar("SELECT token_hash FROM sessions")
        .fetch_one(&services.pool)
        .await
        .unwrap();

    assert_ne!(stored, login.token);
    assert_eq!(stored, hash_session_token(&login.token));
}

#[tokio::test]
async fn test_idle_session_expires() {
    let services = test_services().await;
    let login = services
        .auth
        .login(credentials("admin", ADMIN_PASSWORD))
        .await
        .unwrap();

    let stale = to_storage(Utc::now() - Duration::hours(5));
    sqlx::query("UPDATE sessions SET last_seen_at = ?")
        .bind(stale)
        .execute(&services.pool)
        .await
        .unwrap();

    let err = services.auth.authenticate(&login.token).await.unwrap_err();
    assert!(err.to_string().contains("session expired"));
    assert_eq!(count_rows(&services.pool, "sessions").await, 0);
}

#[tokio::test]
async fn test_logout_ends_session() {
    let services = test_services().await;
    let login = services
        .auth
        .login(credentials("admin", ADMIN_PASSWORD))
        .await
        .unwrap();

    services.auth.logout(&login.token).await.unwrap();

    assert!(matches!(
        services.auth.authenticate(&login.token).await,
        Err(AppError::Unauthorized(_))
    ));
}

#[tokio::test]
async fn test_change_password_checks_current() {
    let services = test_services().await;
    let admin = admin_principal(&services).await;

    let err = services
        .auth
        .change_password(
            &admin,
            ChangePasswordRequest {
                current_password: "wrong".to_string(),
                new_password: "newsecret".to_string(),
            },
        )
        .await
        .unwrap_err();
    assert!(err.to_string().contains("current password is incorrect"));

    services
        .auth
        .change_password(
            &admin,
            ChangePasswordRequest {
                current_password: ADMIN_PASSWORD.to_string(),
                new_password: "newsecret".to_string(),
            },
        )
        .await
        .unwrap();

    assert!(services.auth.login(credentials("admin", "newsecret")).await.is_ok());
    assert!(services.auth.login(credentials("admin", ADMIN_PASSWORD)).await.is_err());
}

#[tokio::test]
async fn test_last_admin_cannot_be_demoted() {
    let services = test_services().await;
    let admin = admin_principal(&services).await;

    let err = services
        .users
        .change_role(&admin, admin.user_id, UserRole::User)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    let second = services
        .users
        .create_user(
            &admin,
            CreateUserRequest {
                username: "owner".to_string(),
                password: "secret1".to_string(),
                full_name: "Shop Owner".to_string(),
                email: None,
                phone: None,
                role: UserRole::Admin,
            },
        )
        .await
        .unwrap();
    assert_eq!(second.status, UserStatus::Approved);

    let demoted = services
        .users
        .change_role(&admin, admin.user_id, UserRole::User)
        .await
        .unwrap();
    assert_eq!(demoted.role, UserRole::User);
}

#[tokio::test]
async fn test_pending_user_cannot_be_promoted() {
    let services = test_services().await;
    let admin = admin_principal(&services).await;
    let ghost = services.auth.signup(signup("ghost")).await.unwrap();

    let err = services
        .users
        .change_role(&admin, ghost.id, UserRole::Admin)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
    assert!(err.to_string().contains("pending approval"));

    // A pending account never counts towards the approved admins
    let err = services
        .users
        .change_role(&admin, admin.user_id, UserRole::User)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("Cannot demote the last admin"));

    let approved_admins: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM users WHERE role = 'admin' AND status = 'approved'",
    )
    .fetch_one(&services.pool)
    .await
    .unwrap();
    assert_eq!(approved_admins, 1);
    assert!(services.auth.login(credentials("admin", ADMIN_PASSWORD)).await.is_ok());
}

#[tokio::test]
async fn test_admin_resets_password_and_ends_sessions() {
    let services = test_services().await;
    let admin = admin_principal(&services).await;
    let user = services.auth.signup(signup("kiran")).await.unwrap();
    services.users.approve_user(&admin, user.id).await.unwrap();

    let login = services
        .auth
        .login(credentials("kiran", "secret1"))
        .await
        .unwrap();

    let too_short = services
        .users
        .reset_password(
            &admin,
            user.id,
            SetPasswordRequest {
                new_password: "abc".to_string(),
            },
        )
        .await;
    assert!(matches!(too_short, Err(AppError::Validation(_))));

    services
        .users
        .reset_password(
            &admin,
            user.id,
            SetPasswordRequest {
                new_password: "fresh-secret".to_string(),
            },
        )
        .await
        .unwrap();

    assert!(matches!(
        services.auth.authenticate(&login.token).await,
        Err(AppError::Unauthorized(_))
    ));
    assert!(services.auth.login(credentials("kiran", "secret1")).await.is_err());
    assert!(services.auth.login(credentials("kiran", "fresh-secret")).await.is_ok());

    let missing = services
        .users
        .reset_password(
            &admin,
            9999,
            SetPasswordRequest {
                new_password: "fresh-secret".to_string(),
            },
        )
        .await;
    assert!(matches!(missing, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn test_only_admins_reset_passwords() {
    let services = test_services().await;
    let admin = admin_principal(&services).await;
    let user = services.auth.signup(signup("clerk")).await.unwrap();
    services.users.approve_user(&admin, user.id).await.unwrap();
    let login = services
        .auth
        .login(credentials("clerk", "secret1"))
        .await
        .unwrap();
    let clerk = services.auth.authenticate(&login.token).await.unwrap();

    let result = services
        .users
        .reset_password(
            &clerk,
            admin.user_id,
            SetPasswordRequest {
                new_password: "taken-over".to_string(),
            },
        )
        .await;
    assert!(matches!(result, Err(AppError::Forbidden(_))));
}

#[tokio::test]
async fn test_admin_operations_require_admin() {
    let services = test_services().await;
    let admin = admin_principal(&services).await;
    let user = services.auth.signup(signup("clerk")).await.unwrap();
    services.users.approve_user(&admin, user.id).await.unwrap();

    let login = services
        .auth
        .login(credentials("clerk", "secret1"))
        .await
        .unwrap();
    let clerk = services.auth.authenticate(&login.token).await.unwrap();

    assert!(matches!(
        services.users.list_users(&clerk).await,
        Err(AppError::Forbidden(_))
    ));
}

#[tokio::test]
async fn test_reject_only_pending_users() {
    let services = test_services().await;
    let admin = admin_principal(&services).await;
    let user = services.auth.signup(signup("temp")).await.unwrap();

    services.users.reject_user(&admin, user.id).await.unwrap();
    assert!(services.users.list_pending(&admin).await.unwrap().is_empty());

    assert!(matches!(
        services.users.reject_user(&admin, admin.user_id).await,
        Err(AppError::Validation(_))
    ));
}
