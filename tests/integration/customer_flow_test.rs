// Integration tests for customer records, cascade delete and CSV exchange.

#[path = "../helpers/mod.rs"]
mod helpers;

use helpers::*;
use jewelcalc::customers::models::{CreateCustomerRequest, UpdateCustomerRequest};
use jewelcalc::AppError;

#[tokio::test]
async fn test_account_numbers_are_sequential() {
    let services = test_services().await;

    let first = services
        .customers
        .create_customer(TestDataFactory::customer_request(1))
        .await
        .unwrap();
    let second = services
        .customers
        .create_customer(TestDataFactory::customer_request(2))
        .await
        .unwrap();

    assert_eq!(first.account_no.as_deref(), Some("CUS-00001"));
    assert_eq!(second.account_no.as_deref(), Some("CUS-00002"));
}

#[tokio::test]
async fn test_explicit_account_number_is_kept() {
    let services = test_services().await;
    let mut request = TestDataFactory::customer_request(1);
    request.account_no = Some("CUS-00040".to_string());

    services.customers.create_customer(request).await.unwrap();
    let next = services
        .customers
        .create_customer(TestDataFactory::customer_request(2))
        .await
        .unwrap();

    assert_eq!(next.account_no.as_deref(), Some("CUS-00041"));
}

#[tokio::test]
async fn test_duplicate_phone_is_a_conflict() {
    let services = test_services().await;
    services
        .customers
        .create_customer(TestDataFactory::customer_request(1))
        .await
        .unwrap();

    let mut again = TestDataFactory::customer_request(1);
    again.name = "Someone Else".to_string();
    let err = services.customers.create_customer(again).await.unwrap_err();

    assert!(matches!(err, AppError::Conflict(_)));
    assert!(err.to_string().contains("phone number already registered"));
}

#[tokio::test]
async fn test_invalid_phone_rejected() {
    let services = test_services().await;
    let request = CreateCustomerRequest {
        account_no: None,
        name: "Asha".to_string(),
        phone: "12345".to_string(),
        address: None,
    };

    let result = services.customers.create_customer(request).await;
    assert!(matches!(result, Err(AppError::Validation(_))));
}

#[tokio::test]
async fn test_update_keeps_account_number() {
    let services = test_services().await;
    let created = services
        .customers
        .create_customer(TestDataFactory::customer_request(1))
        .await
        .unwrap();

    let updated = services
        .customers
        .update_customer(
            created.id,
            UpdateCustomerRequest {
                account_no: None,
                name: "Asha Rao".to_string(),
                phone: TestDataFactory::phone(11),
                address: Some("Brigade Road".to_string()),
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.account_no, created.account_no);
    assert_eq!(updated.name, "Asha Rao");
    assert_eq!(updated.phone, TestDataFactory::phone(11));
}

#[tokio::test]
async fn test_update_changes_account_number() {
    let services = test_services().await;
    let first = services
        .customers
        .create_customer(TestDataFactory::customer_request(1))
        .await
        .unwrap();
    let second = services
        .customers
        .create_customer(TestDataFactory::customer_request(2))
        .await
        .unwrap();

    let renumbered = services
        .customers
        .update_customer(
            first.id,
            UpdateCustomerRequest {
                account_no: Some(" CUS-00077 ".to_string()),
                name: first.name.clone(),
                phone: first.phone.clone(),
                address: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(renumbered.account_no.as_deref(), Some("CUS-00077"));

    let err = services
        .customers
        .update_customer(
            second.id,
            UpdateCustomerRequest {
                account_no: Some("CUS-00077".to_string()),
                name: second.name.clone(),
                phone: second.phone.clone(),
                address: None,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));
    assert!(err.to_string().contains("account number already exists"));
}

#[tokio::test]
async fn test_delete_cascades_to_invoices() {
    let services = test_services().await;
    let customer = services
        .customers
        .create_customer(TestDataFactory::customer_request(1))
        .await
        .unwrap();
    for _ in 0..2 {
        services
            .invoices
            .create_invoice(TestDataFactory::invoice_request(
                customer.id,
                vec![TestDataFactory::gold_item()],
            ))
            .await
            .unwrap();
    }
    assert_eq!(count_rows(&services.pool, "invoice_items").await, 2);

    services.customers.delete_customer(customer.id).await.unwrap();

    assert_eq!(count_rows(&services.pool, "customers").await, 0);
    assert_eq!(count_rows(&services.pool, "invoices").await, 0);
    assert_eq!(count_rows(&services.pool, "invoice_items").await, 0);
    assert!(matches!(
        services.customers.delete_customer(customer.id).await,
        Err(AppError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_csv_export_lists_customers_by_id() {
    let services = test_services().await;
    for n in 1..=2 {
        services
            .customers
            .create_customer(TestDataFactory::customer_request(n))
            .await
            .unwrap();
    }

    let csv = services.customers.export_csv().await.unwrap();
    let lines: Vec<&str> = csv.lines().collect();

    assert_eq!(lines[0], "id,account_no,name,phone,address");
    assert_eq!(lines[1], "1,CUS-00001,Customer 1,9800000001,1 MG Road");
    assert_eq!(lines.len(), 3);
}

#[tokio::test]
async fn test_csv_import_collects_row_errors() {
    let services = test_services().await;
    let csv = "\
id,account_no,name,phone,address
,,Asha,9876543210,MG Road
,,Ravi,12345,Brigade Road
,CUS-00009,Meera,9876543211,
,,Dup,9876543210,Elsewhere
";

    let report = services.customers.import_csv(csv).await.unwrap();

    assert_eq!(report.imported, 2);
    assert_eq!(report.errors.len(), 2);
    assert!(report.errors[0].starts_with("Row 2:"));
    assert!(report.errors[1].starts_with("Row 4:"));

    let customers = services.customers.list_customers().await.unwrap();
    let meera = customers.iter().find(|c| c.name == "Meera").unwrap();
    assert_eq!(meera.account_no.as_deref(), Some("CUS-00009"));
    let asha = customers.iter().find(|c| c.name == "Asha").unwrap();
    assert_eq!(asha.account_no.as_deref(), Some("CUS-00001"));
}

#[tokio::test]
async fn test_csv_round_trip_into_fresh_database() {
    let source = test_services().await;
    for n in 1..=3 {
        source
            .customers
            .create_customer(TestDataFactory::customer_request(n))
            .await
            .unwrap();
    }
    let csv = source.customers.export_csv().await.unwrap();

    let target = test_services().await;
    let report = target.customers.import_csv(&csv).await.unwrap();

    assert_eq!(report.imported, 3);
    assert!(report.errors.is_empty());
    assert_eq!(target.customers.export_csv().await.unwrap(), csv);
}
