use rust_decimal::Decimal;

use crate::core::money::percent_of;
use crate::core::{AppError, Result};
use crate::modules::invoices::models::LineAmounts;

/// Price one line item from its physical inputs.
///
/// Computed in fixed order with no rounding:
/// item_value = weight × rate, then wastage and making as percentages of
/// item_value, then line_total as their sum. Zero inputs give zero amounts;
/// negative inputs are rejected.
pub fn compute_line_item(
    weight: Decimal,
    rate: Decimal,
    wastage_percent: Decimal,
    making_percent: Decimal,
) -> Result<LineAmounts> {
    validate_non_negative("Weight", weight)?;
    validate_non_negative("Rate", rate)?;
    validate_non_negative("Wastage percent", wastage_percent)?;
    validate_non_negative("Making percent", making_percent)?;

    let item_value = weight.checked_mul(rate).ok_or_else(out_of_range)?;
    let wastage_amount = percent_of(item_value, wastage_percent).ok_or_else(out_of_range)?;
    let making_amount = percent_of(item_value, making_percent).ok_or_else(out_of_range)?;
    let line_total = item_value
        .checked_add(wastage_amount)
        .and_then(|sum| sum.checked_add(making_amount))
        .ok_or_else(out_of_range)?;

    Ok(LineAmounts {
        item_value,
        wastage_amount,
        making_amount,
        line_total,
    })
}

/// Reject negative quantities, rates and percentages
pub fn validate_non_negative(field: &str, value: Decimal) -> Result<()> {
    if value < Decimal::ZERO {
        return Err(AppError::validation(format!(
            "{} must be non-negative, got: {}",
            field, value
        )));
    }

    Ok(())
}

fn out_of_range() -> AppError {
    AppError::validation("Line item amount is out of range")
}
