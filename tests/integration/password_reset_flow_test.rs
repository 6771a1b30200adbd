// Integration tests for forgotten-password requests and their admin review.

#[path = "../helpers/mod.rs"]
mod helpers;

use helpers::*;
use jewelcalc::modules::users::models::{
    LoginRequest, Principal, ResetLookup, ResetRequestStatus, ResetRequestType,
    ResolveResetRequest, SignupRequest,
};
use jewelcalc::AppError;

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

/// Approved user `deepa` with an email and phone on file
async fn approved_user(services: &jewelcalc::AppServices, admin: &Principal) -> i64 {
    let user = services
        .auth
        .signup(SignupRequest {
            username: "deepa".to_string(),
            password: "secret1".to_string(),
            full_name: "Deepa Nair".to_string(),
            email: Some("deepa@example.com".to_string()),
            phone: Some("9123456780".to_string()),
        })
        .await
        .unwrap();
    services.users.approve_user(admin, user.id).await.unwrap();
    user.id
}

fn by_username(username: &str) -> ResetLookup {
    ResetLookup {
        username: Some(username.to_string()),
        ..ResetLookup::default()
    }
}

#[tokio::test]
async fn test_request_found_by_any_identifier() {
    let services = test_services().await;
    let admin = admin_principal(&services).await;
    let user_id = approved_user(&services, &admin).await;

    let lookups = [
        by_username("deepa"),
        ResetLookup {
            email: Some("DEEPA@example.com".to_string()),
            ..ResetLookup::default()
        },
        ResetLookup {
            phone: Some("9123456780".to_string()),
            request_type: ResetRequestType::Username,
            ..ResetLookup::default()
        },
    ];

    for lookup in lookups {
        let request = services
            .password_resets
            .submit(lookup)
            .await
            .unwrap()
            .expect("request for a known account");
        assert_eq!(request.user_id, user_id);
        assert_eq!(request.username, "deepa");
        assert_eq!(request.status, ResetRequestStatus::Pending);
    }

    let pending = services.password_resets.list_pending(&admin).await.unwrap();
    assert_eq!(pending.len(), 3);
    assert!(pending[0].id > pending[2].id);
}

#[tokio::test]
async fn test_unknown_account_files_nothing() {
    let services = test_services().await;

    let request = services
        .password_resets
        .submit(by_username("nobody"))
        .await
        .unwrap();

    assert!(request.is_none());
    assert_eq!(count_rows(&services.pool, "password_reset_requests").await, 0);

    let blank = services.password_resets.submit(ResetLookup::default()).await;
    assert!(matches!(blank, Err(AppError::Validation(_))));
}

#[tokio::test]
async fn test_resolving_sets_password_and_ends_sessions() {
    let services = test_services().await;
    let admin = admin_principal(&services).await;
    approved_user(&services, &admin).await;
    let login = services
        .auth
        .login(credentials("deepa", "secret1"))
        .await
        .unwrap();

    let request = services
        .password_resets
        .submit(by_username("deepa"))
        .await
        .unwrap()
        .unwrap();

    let missing = services
        .password_resets
        .resolve(&admin, request.id, ResolveResetRequest::default())
        .await;
    assert!(matches!(missing, Err(AppError::Validation(_))));

    let resolved = services
        .password_resets
        .resolve(
            &admin,
            request.id,
            ResolveResetRequest {
                new_password: Some("restored1".to_string()),
            },
        )
        .await
        .unwrap();

    assert_eq!(resolved.status, ResetRequestStatus::Resolved);
    assert_eq!(resolved.resolved_by, Some(admin.user_id));
    assert!(resolved.resolved_at.is_some());
    assert!(matches!(
        services.auth.authenticate(&login.token).await,
        Err(AppError::Unauthorized(_))
    ));
    assert!(services.auth.login(credentials("deepa", "secret1")).await.is_err());
    assert!(services.auth.login(credentials("deepa", "restored1")).await.is_ok());
    assert!(services.password_resets.list_pending(&admin).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_username_request_does_not_take_a_password() {
    let services = test_services().await;
    let admin = admin_principal(&services).await;
    approved_user(&services, &admin).await;

    let request = services
        .password_resets
        .submit(ResetLookup {
            email: Some("deepa@example.com".to_string()),
            request_type: ResetRequestType::Username,
            ..ResetLookup::default()
        })
        .await
        .unwrap()
        .unwrap();

    let with_password = services
        .password_resets
        .resolve(
            &admin,
            request.id,
            ResolveResetRequest {
                new_password: Some("restored1".to_string()),
            },
        )
        .await;
    assert!(matches!(with_password, Err(AppError::Validation(_))));

    let resolved = services
        .password_resets
        .resolve(&admin, request.id, ResolveResetRequest::default())
        .await
        .unwrap();
    assert_eq!(resolved.status, ResetRequestStatus::Resolved);
    assert!(services.auth.login(credentials("deepa", "secret1")).await.is_ok());
}

#[tokio::test]
async fn test_closed_requests_stay_closed() {
    let services = test_services().await;
    let admin = admin_principal(&services).await;
    approved_user(&services, &admin).await;

    let request = services
        .password_resets
        .submit(by_username("deepa"))
        .await
        .unwrap()
        .unwrap();

    let rejected = services
        .password_resets
        .reject(&admin, request.id)
        .await
        .unwrap();
    assert_eq!(rejected.status, ResetRequestStatus::Rejected);

    let err = services
        .password_resets
        .resolve(
            &admin,
            request.id,
            ResolveResetRequest {
                new_password: Some("restored1".to_string()),
            },
        )
        .await
        .unwrap_err();
    assert!(err.to_string().contains("no longer pending"));
    assert!(services.password_resets.reject(&admin, request.id).await.is_err());
    assert!(services.auth.login(credentials("deepa", "secret1")).await.is_ok());

    assert!(matches!(
        services.password_resets.reject(&admin, 9999).await,
        Err(AppError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_review_requires_admin() {
    let services = test_services().await;
    let admin = admin_principal(&services).await;
    approved_user(&services, &admin).await;
    let login = services
        .auth
        .login(credentials("deepa", "secret1"))
        .await
        .unwrap();
    let deepa = services.auth.authenticate(&login.token).await.unwrap();

    assert!(matches!(
        services.password_resets.list_pending(&deepa).await,
        Err(AppError::Forbidden(_))
    ));
}
