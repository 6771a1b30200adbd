use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Date range filter shared by report endpoints. `end_date` is exclusive.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct DateRangeQuery {
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
}

/// One invoice in the sales report
#[derive(Debug, Clone, Serialize)]
pub struct SalesRow {
    pub invoice_no: String,
    pub date: DateTime<Utc>,
    pub customer_name: Option<String>,
    pub account_no: Option<String>,
    pub subtotal: Decimal,
    pub discount_amount: Decimal,
    pub cgst_amount: Decimal,
    pub sgst_amount: Decimal,
    pub total: Decimal,
}

/// Column sums of a sales report
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SalesTotals {
    pub invoice_count: usize,
    pub subtotal: Decimal,
    pub discount_amount: Decimal,
    pub cgst_amount: Decimal,
    pub sgst_amount: Decimal,
    pub total: Decimal,
}

/// Invoices dated in `[start_date, end_date)`, newest first
#[derive(Debug, Clone, Serialize)]
pub struct SalesReport {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub rows: Vec<SalesRow>,
    pub totals: SalesTotals,
}

/// Purchase history of one customer
#[derive(Debug, Clone, Serialize)]
pub struct CustomerPurchase {
    pub customer_id: i64,
    pub account_no: Option<String>,
    pub name: String,
    pub phone: String,
    pub invoice_count: usize,
    pub total_subtotal: Decimal,
    pub total_discount: Decimal,
    pub total_amount: Decimal,
    pub first_purchase: Option<DateTime<Utc>>,
    pub last_purchase: Option<DateTime<Utc>>,
}

/// Sales of one metal across all invoices
#[derive(Debug, Clone, Serialize)]
pub struct CategoryBreakdown {
    pub metal: String,
    pub invoice_count: usize,
    pub item_count: usize,
    pub total_weight: Decimal,
    pub average_rate: Decimal,
    pub total_item_value: Decimal,
    pub total_wastage: Decimal,
    pub total_making: Decimal,
    pub total_amount: Decimal,
}
