use rust_decimal::Decimal;

use crate::core::money::percent_of;
use crate::core::{AppError, Result};
use crate::modules::invoices::models::{InvoiceCharges, InvoiceTotals, LineItem};
use crate::modules::invoices::services::pricing_calculator::validate_non_negative;

/// Fold priced line items and invoice-level rates into invoice totals.
///
/// Discount applies to the pre-tax subtotal. CGST and SGST are each computed
/// on the same post-discount base and are not compounded on each other.
/// An empty item list is a validation failure, not a zero invoice. Discounts
/// above 100% are rejected so the taxable base never goes negative.
pub fn compute_invoice_totals(items: &[LineItem], charges: &InvoiceCharges) -> Result<InvoiceTotals> {
    if items.is_empty() {
        return Err(AppError::validation("Invoice must have at least one item"));
    }

    validate_non_negative("Discount percent", charges.discount_percent)?;
    validate_non_negative("CGST percent", charges.cgst_percent)?;
    validate_non_negative("SGST percent", charges.sgst_percent)?;

    if charges.discount_percent > Decimal::ONE_HUNDRED {
        return Err(AppError::validation(format!(
            "Discount percent cannot exceed 100, got: {}",
            charges.discount_percent
        )));
    }

    let subtotal = items
        .iter()
        .try_fold(Decimal::ZERO, |sum, item| sum.checked_add(item.line_total()))
        .ok_or_else(out_of_range)?;

    let discount_amount = percent_of(subtotal, charges.discount_percent).ok_or_else(out_of_range)?;
    let taxable_amount = subtotal - discount_amount;
    let cgst_amount = percent_of(taxable_amount, charges.cgst_percent).ok_or_else(out_of_range)?;
    let sgst_amount = percent_of(taxable_amount, charges.sgst_percent).ok_or_else(out_of_range)?;
    let total = taxable_amount
        .checked_add(cgst_amount)
        .and_then(|sum| sum.checked_add(sgst_amount))
        .ok_or_else(out_of_range)?;

    Ok(InvoiceTotals {
        subtotal,
        discount_amount,
        taxable_amount,
        cgst_amount,
        sgst_amount,
        total,
    })
}

fn out_of_range() -> AppError {
    AppError::validation("Invoice amount is out of range")
}
