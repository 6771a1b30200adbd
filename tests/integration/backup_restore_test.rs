// Integration tests for database backup and restore.

#[path = "../helpers/mod.rs"]
mod helpers;

use helpers::*;
use jewelcalc::modules::users::models::{LoginRequest, Principal, SignupRequest, UserRole};
use jewelcalc::AppError;

async fn admin_principal(services: &jewelcalc::AppServices) -> Principal {
    let login = services
        .auth
        .login(LoginRequest {
            username: "admin".to_string(),
            password: ADMIN_PASSWORD.to_string(),
        })
        .await
        .unwrap();
    services.auth.authenticate(&login.token).await.unwrap()
}

#[tokio::test]
async fn test_backup_is_a_sqlite_file() {
    let services = test_services().await;
    let admin = admin_principal(&services).await;

    let bytes = services.backup.export(&admin).await.unwrap();

    assert!(bytes.starts_with(b"SQLite format 3\0"));
}

#[tokio::test]
async fn test_restore_brings_back_shop_data() {
    let services = test_services().await;
    let admin = admin_principal(&services).await;
    let customer = services
        .customers
        .create_customer(TestDataFactory::customer_request(1))
        .await
        .unwrap();
    let invoice = services
        .invoices
        .create_invoice(TestDataFactory::invoice_request(
            customer.id,
            vec![TestDataFactory::gold_item(), TestDataFactory::gold_item()],
        ))
        .await
        .unwrap();

    let backup = services.backup.export(&admin).await.unwrap();

    services.customers.delete_customer(customer.id).await.unwrap();
    services
        .customers
        .create_customer(TestDataFactory::customer_request(2))
        .await
        .unwrap();

    let report = services.backup.restore(&admin, &backup).await.unwrap();

    assert_eq!(report.customers, 1);
    assert_eq!(report.invoices, 1);
    assert_eq!(report.invoice_items, 2);
    assert_eq!(count_rows(&services.pool, "customers").await, 1);

    let restored = services
        .invoices
        .get_invoice(invoice.invoice.invoice_no.as_str())
        .await
        .unwrap();
    assert_eq!(restored.invoice.totals().total, invoice.invoice.totals().total);
    assert_eq!(restored.customer.map(|c| c.id), Some(customer.id));
}

#[tokio::test]
async fn test_restore_keeps_accounts_and_sessions() {
    let services = test_services().await;
    let admin = admin_principal(&services).await;
    let backup = services.backup.export(&admin).await.unwrap();

    services
        .auth
        .signup(SignupRequest {
            username: "later".to_string(),
            password: "secret1".to_string(),
            full_name: "Joined After Backup".to_string(),
            email: None,
            phone: None,
        })
        .await
        .unwrap();
    let sessions_before = count_rows(&services.pool, "sessions").await;

    services.backup.restore(&admin, &backup).await.unwrap();

    assert_eq!(count_rows(&services.pool, "users").await, 2);
    assert_eq!(count_rows(&services.pool, "sessions").await, sessions_before);
    assert_eq!(services.users.list_pending(&admin).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_restore_rejects_other_files() {
    let services = test_services().await;
    let admin = admin_principal(&services).await;
    services
        .customers
        .create_customer(TestDataFactory::customer_request(1))
        .await
        .unwrap();

    let err = services
        .backup
        .restore(&admin, b"name,phone\nAsha,9876543210\n")
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Validation(_)));
    assert_eq!(count_rows(&services.pool, "customers").await, 1);
}

#[tokio::test]
async fn test_backup_requires_admin() {
    let services = test_services().await;
    let clerk = Principal {
        user_id: 42,
        username: "clerk".to_string(),
        role: UserRole::User,
    };

    assert!(matches!(
        services.backup.export(&clerk).await,
        Err(AppError::Forbidden(_))
    ));
    assert!(matches!(
        services.backup.restore(&clerk, b"SQLite format 3\0").await,
        Err(AppError::Forbidden(_))
    ));
}
