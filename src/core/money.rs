use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;

use crate::core::{AppError, Result};

/// Display precision for rupee amounts
pub const DISPLAY_SCALE: u32 = 2;

/// `amount × percent ÷ 100`, multiplying first. `None` on overflow.
pub fn percent_of(amount: Decimal, percent: Decimal) -> Option<Decimal> {
    amount
        .checked_mul(percent)?
        .checked_div(Decimal::ONE_HUNDRED)
}

/// Formats an amount as rupees for screens and exports: `₹1,234.50`
pub fn format_inr(amount: Decimal) -> String {
    format!("₹{}", group_thousands(amount))
}

/// Formats an amount for receipts. The built-in PDF fonts have no rupee glyph.
pub fn format_rs(amount: Decimal) -> String {
    format!("Rs. {}", group_thousands(amount))
}

/// Two-decimal rendering without grouping, used in table columns.
/// Halves round away from zero.
pub fn format_plain(amount: Decimal) -> String {
    format!(
        "{:.2}",
        amount.round_dp_with_strategy(DISPLAY_SCALE, RoundingStrategy::MidpointAwayFromZero)
    )
}

fn group_thousands(amount: Decimal) -> String {
    let rounded = format_plain(amount);
    let (sign, digits) = match rounded.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", rounded.as_str()),
    };
    let (int_part, frac_part) = digits.split_once('.').unwrap_or((digits, "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    format!("{}{}.{}", sign, grouped, frac_part)
}

/// Parses a decimal stored as TEXT in SQLite
pub fn parse_stored(value: &str, column: &str) -> Result<Decimal> {
    Decimal::from_str(value)
        .map_err(|e| AppError::internal(format!("Invalid decimal in column {}: {}", column, e)))
}
