// Invoice model and request/response types.
//
// An invoice is a customer reference, a date and an InvoiceRevision: the item
// list, the discount/GST rates and the totals derived from them. Revisions are
// only built through `InvoiceRevision::new`, which runs the aggregator, so a
// stored invoice is always replaced as a whole and never patched field by field.

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::line_item::LineItem;
use crate::core::{AppError, Result};
use crate::modules::customers::models::Customer;
use crate::modules::invoices::services::invoice_aggregator::compute_invoice_totals;

static INVOICE_NUMBER_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z]{4}-[0-9]{6}$").expect("invoice number pattern is valid"));

/// Human-readable invoice identifier, `LLLL-NNNNNN`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct InvoiceNumber(String);

impl InvoiceNumber {
    /// Wrap a candidate built by the generator, which only emits valid shapes
    pub(crate) fn from_generated(candidate: String) -> Self {
        debug_assert!(INVOICE_NUMBER_PATTERN.is_match(&candidate));
        Self(candidate)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for InvoiceNumber {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        if !INVOICE_NUMBER_PATTERN.is_match(s) {
            return Err(AppError::validation(format!(
                "Invalid invoice number '{}', expected format ABCD-123456",
                s
            )));
        }

        Ok(Self(s.to_string()))
    }
}

impl TryFrom<String> for InvoiceNumber {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<InvoiceNumber> for String {
    fn from(number: InvoiceNumber) -> Self {
        number.0
    }
}

impl fmt::Display for InvoiceNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Invoice-level discount and GST rates, all percentages
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceCharges {
    pub discount_percent: Decimal,
    pub cgst_percent: Decimal,
    pub sgst_percent: Decimal,
}

/// Totals derived from an item list and its charges
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct InvoiceTotals {
    pub subtotal: Decimal,
    pub discount_amount: Decimal,
    pub taxable_amount: Decimal,
    pub cgst_amount: Decimal,
    pub sgst_amount: Decimal,
    pub total: Decimal,
}

/// A complete, persistable set of items with charges and derived totals
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InvoiceRevision {
    items: Vec<LineItem>,
    #[serde(flatten)]
    charges: InvoiceCharges,
    #[serde(flatten)]
    totals: InvoiceTotals,
}

impl InvoiceRevision {
    /// Validate the item list and derive totals
    ///
    /// Requires at least one item, and at least one item with a positive
    /// line total.
    pub fn new(items: Vec<LineItem>, charges: InvoiceCharges) -> Result<Self> {
        let totals = compute_invoice_totals(&items, &charges)?;

        if !items.iter().any(LineItem::is_billable) {
            return Err(AppError::validation(
                "Invoice must have at least one item with a positive total",
            ));
        }

        Ok(Self {
            items,
            charges,
            totals,
        })
    }

    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    pub fn charges(&self) -> &InvoiceCharges {
        &self.charges
    }

    pub fn totals(&self) -> &InvoiceTotals {
        &self.totals
    }

    pub fn into_parts(self) -> (Vec<LineItem>, InvoiceCharges) {
        (self.items, self.charges)
    }
}

/// A stored invoice
#[derive(Debug, Clone, Serialize)]
pub struct Invoice {
    pub id: i64,
    pub invoice_no: InvoiceNumber,
    pub customer_id: i64,
    pub date: DateTime<Utc>,
    #[serde(flatten)]
    pub revision: InvoiceRevision,
}

impl Invoice {
    pub fn items(&self) -> &[LineItem] {
        self.revision.items()
    }

    pub fn charges(&self) -> &InvoiceCharges {
        self.revision.charges()
    }

    pub fn totals(&self) -> &InvoiceTotals {
        self.revision.totals()
    }
}

/// An invoice ready to be inserted
#[derive(Debug, Clone)]
pub struct NewInvoice {
    pub invoice_no: InvoiceNumber,
    pub customer_id: i64,
    pub date: DateTime<Utc>,
    pub revision: InvoiceRevision,
}

/// One line of a create/update/preview request.
///
/// Rate, wastage and making fall back to the shop's metal settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineItemInput {
    pub metal: String,
    pub weight: Decimal,
    #[serde(default)]
    pub rate: Option<Decimal>,
    #[serde(default)]
    pub wastage_percent: Option<Decimal>,
    #[serde(default)]
    pub making_percent: Option<Decimal>,
}

/// Request to create an invoice
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateInvoiceRequest {
    pub customer_id: i64,
    pub items: Vec<LineItemInput>,
    #[serde(default)]
    pub discount_percent: Option<Decimal>,
    #[serde(default)]
    pub cgst_percent: Option<Decimal>,
    #[serde(default)]
    pub sgst_percent: Option<Decimal>,
}

/// Request carrying a complete replacement item list, used by update and preview
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviseInvoiceRequest {
    pub items: Vec<LineItemInput>,
    #[serde(default)]
    pub discount_percent: Option<Decimal>,
    #[serde(default)]
    pub cgst_percent: Option<Decimal>,
    #[serde(default)]
    pub sgst_percent: Option<Decimal>,
}

/// Invoice with its customer, as returned by the API
#[derive(Debug, Clone, Serialize)]
pub struct InvoiceResponse {
    #[serde(flatten)]
    pub invoice: Invoice,
    pub customer: Option<Customer>,
}

/// Totals of an unsaved item list
#[derive(Debug, Clone, Serialize)]
pub struct InvoicePreview {
    pub items: Vec<LineItem>,
    #[serde(flatten)]
    pub charges: InvoiceCharges,
    #[serde(flatten)]
    pub totals: InvoiceTotals,
}

/// Row of the invoice listing
#[derive(Debug, Clone, Serialize)]
pub struct InvoiceSummary {
    pub id: i64,
    pub invoice_no: String,
    pub date: DateTime<Utc>,
    pub total: Decimal,
    pub customer_name: Option<String>,
    pub customer_phone: Option<String>,
    pub account_no: Option<String>,
}

/// Invoice as read from a JSON export. Derived amounts in the file are
/// ignored and recomputed from the item inputs.
#[derive(Debug, Clone, Deserialize)]
pub struct ImportedInvoice {
    pub invoice_no: String,
    pub customer_id: i64,
    pub date: DateTime<Utc>,
    #[serde(default)]
    pub discount_percent: Decimal,
    pub cgst_percent: Decimal,
    pub sgst_percent: Decimal,
    #[serde(default)]
    pub items: Vec<ImportedLineItem>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ImportedLineItem {
    pub metal: String,
    pub weight: Decimal,
    pub rate: Decimal,
    pub wastage_percent: Decimal,
    pub making_percent: Decimal,
}

/// Result of a bulk import
#[derive(Debug, Clone, Default, Serialize)]
pub struct ImportReport {
    pub imported: usize,
    pub errors: Vec<String>,
}
