use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, SecondsFormat, TimeZone, Utc};

use crate::core::{AppError, Result};

/// Shop-local offset used on receipts and report date bounds (IST, UTC+5:30)
const SHOP_OFFSET_SECONDS: i32 = 5 * 3600 + 30 * 60;

fn shop_offset() -> FixedOffset {
    FixedOffset::east_opt(SHOP_OFFSET_SECONDS).expect("Valid offset")
}

/// Timestamps are stored as fixed-width RFC 3339 UTC text so that string
/// order in SQLite matches time order.
pub fn to_storage(time: DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Parse a timestamp column written by `to_storage`
pub fn parse_storage(value: &str, column: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|time| time.with_timezone(&Utc))
        .map_err(|e| AppError::internal(format!("Invalid timestamp in column {}: {}", column, e)))
}

/// Convert a UTC timestamp to shop-local time
pub fn to_shop_time(time: DateTime<Utc>) -> DateTime<FixedOffset> {
    time.with_timezone(&shop_offset())
}

/// Date and time as printed on receipts: `19-10-2026 14:05`
pub fn format_receipt_date(time: DateTime<Utc>) -> String {
    to_shop_time(time).format("%d-%m-%Y %H:%M").to_string()
}

/// Midnight at the start of a shop-local calendar day, in UTC
pub fn start_of_shop_day(date: NaiveDate) -> DateTime<Utc> {
    let midnight = date.and_time(NaiveTime::MIN);
    match shop_offset().from_local_datetime(&midnight).single() {
        Some(local) => local.with_timezone(&Utc),
        None => Utc.from_utc_datetime(&midnight),
    }
}
