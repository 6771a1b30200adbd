// Integration tests for sales, customer and category reports.
//
// Invoices are loaded through the JSON import so their dates are fixed.

#[path = "../helpers/mod.rs"]
mod helpers;

use chrono::NaiveDate;
use helpers::*;
use jewelcalc::modules::reports::models::DateRangeQuery;
use jewelcalc::{AppError, AppServices};
use rust_decimal_macros::dec;
use serde_json::json;

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, d).unwrap()
}

/// Two customers; three invoices on 1, 10 and 20 October 2026 (IST noon)
async fn seeded() -> AppServices {
    let services = test_services().await;
    for n in 1..=3 {
        services
            .customers
            .create_customer(TestDataFactory::customer_request(n))
            .await
            .unwrap();
    }

    let invoices = json!([
        {
            "invoice_no": "AAAA-000001",
            "customer_id": 1,
            "date": "2026-10-01T06:30:00Z",
            "cgst_percent": "1.5",
            "sgst_percent": "1.5",
            "items": [
                { "metal": "Gold 24K", "weight": "10.5", "rate": "6500.0",
                  "wastage_percent": "5.0", "making_percent": "10.0" }
            ]
        },
        {
            "invoice_no": "BBBB-000002",
            "customer_id": 2,
            "date": "2026-10-10T06:30:00Z",
            "discount_percent": "10",
            "cgst_percent": "1.5",
            "sgst_percent": "1.5",
            "items": [
                { "metal": "Gold 24K", "weight": "11.5", "rate": "6500",
                  "wastage_percent": "0", "making_percent": "0" }
            ]
        },
        {
            "invoice_no": "CCCC-000003",
            "customer_id": 1,
            "date": "2026-10-20T06:30:00Z",
            "cgst_percent": "0",
            "sgst_percent": "0",
            "items": [
                { "metal": "Silver", "weight": "100", "rate": "70",
                  "wastage_percent": "0", "making_percent": "0" },
                { "metal": "Silver", "weight": "50", "rate": "80",
                  "wastage_percent": "0", "making_percent": "0" }
            ]
        }
    ]);

    let report = services
        .invoices
        .import_json(&invoices.to_string())
        .await
        .unwrap();
    assert_eq!(report.imported, 3, "seed errors: {:?}", report.errors);

    services
}

#[tokio::test]
async fn test_sales_report_without_range() {
    let services = seeded().await;

    let report = services
        .reports
        .sales_report(DateRangeQuery::default())
        .await
        .unwrap();

    let numbers: Vec<&str> = report.rows.iter().map(|r| r.invoice_no.as_str()).collect();
    assert_eq!(numbers, ["CCCC-000003", "BBBB-000002", "AAAA-000001"]);
    assert_eq!(report.totals.invoice_count, 3);
    assert_eq!(report.totals.total, dec!(80842.125) + dec!(69293.25) + dec!(11000));
    assert_eq!(report.rows[1].customer_name.as_deref(), Some("Customer 2"));
}

#[tokio::test]
async fn test_sales_report_end_is_exclusive() {
    let services = seeded().await;

    let report = services
        .reports
        .sales_report(DateRangeQuery {
            start_date: Some(day(1)),
            end_date: Some(day(20)),
        })
        .await
        .unwrap();

    let numbers: Vec<&str> = report.rows.iter().map(|r| r.invoice_no.as_str()).collect();
    assert_eq!(numbers, ["BBBB-000002", "AAAA-000001"]);
    assert_eq!(report.totals.discount_amount, dec!(7475.0));
}

#[tokio::test]
async fn test_sales_report_open_start() {
    let services = seeded().await;

    let report = services
        .reports
        .sales_report(DateRangeQuery {
            start_date: Some(day(10)),
            end_date: None,
        })
        .await
        .unwrap();

    assert_eq!(report.rows.len(), 2);
}

#[tokio::test]
async fn test_sales_report_rejects_inverted_range() {
    let services = seeded().await;

    let result = services
        .reports
        .sales_report(DateRangeQuery {
            start_date: Some(day(20)),
            end_date: Some(day(1)),
        })
        .await;

    assert!(matches!(result, Err(AppError::Validation(_))));
}

#[tokio::test]
async fn test_customer_analysis() {
    let services = seeded().await;

    let analysis = services.reports.customer_analysis(None).await.unwrap();

    assert_eq!(analysis.len(), 3);
    assert_eq!(analysis[0].customer_id, 1);
    assert_eq!(analysis[0].invoice_count, 2);
    assert_eq!(analysis[0].total_amount, dec!(91842.125));
    assert_eq!(
        analysis[0].first_purchase.unwrap().date_naive(),
        day(1)
    );
    assert_eq!(analysis[2].invoice_count, 0);

    let single = services.reports.customer_analysis(Some(2)).await.unwrap();
    assert_eq!(single.len(), 1);
    assert_eq!(single[0].total_discount, dec!(7475.0));

    assert!(matches!(
        services.reports.customer_analysis(Some(99)).await,
        Err(AppError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_category_report() {
    let services = seeded().await;

    let report = services.reports.category_report().await.unwrap();
    assert_eq!(report.len(), 2);

    let gold = &report[0];
    assert_eq!(gold.metal, "Gold 24K");
    assert_eq!(gold.invoice_count, 2);
    assert_eq!(gold.total_weight, dec!(22.0));
    assert_eq!(gold.average_rate, dec!(6500));
    assert_eq!(gold.total_item_value, dec!(68250) + dec!(74750));
    assert_eq!(gold.total_wastage, dec!(3412.5));

    let silver = &report[1];
    assert_eq!(silver.invoice_count, 1);
    assert_eq!(silver.item_count, 2);
    assert_eq!(silver.average_rate, dec!(75));
    assert_eq!(silver.total_amount, dec!(11000));
}
