// Request payloads and domain values shared across tests.

use jewelcalc::customers::models::CreateCustomerRequest;
use jewelcalc::invoices::models::{CreateInvoiceRequest, LineItemInput};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::{json, Value};

pub struct TestDataFactory;

impl TestDataFactory {
    /// Customer with a phone derived from `n`, so each `n` is unique
    pub fn customer_request(n: u32) -> CreateCustomerRequest {
        CreateCustomerRequest {
            account_no: None,
            name: format!("Customer {}", n),
            phone: Self::phone(n),
            address: Some(format!("{} MG Road", n)),
        }
    }

    pub fn phone(n: u32) -> String {
        format!("98{:08}", n)
    }

    pub fn item(metal: &str, weight: Decimal, rate: Decimal, wastage: Decimal, making: Decimal) -> LineItemInput {
        LineItemInput {
            metal: metal.to_string(),
            weight,
            rate: Some(rate),
            wastage_percent: Some(wastage),
            making_percent: Some(making),
        }
    }

    /// 10.5 g of 24K gold at 6500 with 5% wastage and 10% making
    pub fn gold_item() -> LineItemInput {
        Self::item("Gold 24K", dec!(10.5), dec!(6500.0), dec!(5.0), dec!(10.0))
    }

    pub fn invoice_request(customer_id: i64, items: Vec<LineItemInput>) -> CreateInvoiceRequest {
        CreateInvoiceRequest {
            customer_id,
            items,
            discount_percent: None,
            cgst_percent: Some(dec!(1.5)),
            sgst_percent: Some(dec!(1.5)),
        }
    }

    pub fn customer_payload(n: u32) -> Value {
        json!({
            "name": format!("Customer {}", n),
            "phone": Self::phone(n),
            "address": "Jewellers Street"
        })
    }

    pub fn invoice_payload(customer_id: i64) -> Value {
        json!({
            "customer_id": customer_id,
            "items": [
                {
                    "metal": "Gold 24K",
                    "weight": "10.5",
                    "rate": "6500.0",
                    "wastage_percent": "5.0",
                    "making_percent": "10.0"
                }
            ],
            "cgst_percent": "1.5",
            "sgst_percent": "1.5"
        })
    }
}
