use once_cell::sync::Lazy;
use regex::Regex;

static ACCOUNT_NUMBER_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^CUS-([0-9]+)").expect("account number pattern is valid"));

/// Next sequential account number, `CUS-NNNNN`.
///
/// Takes the largest numeric suffix among `existing` and adds one. Values
/// that do not start with `CUS-<digits>` are ignored, as are suffixes too
/// large to parse. Wider numbers are not truncated once past 99999.
pub fn generate_account_number<S: AsRef<str>>(existing: &[S]) -> String {
    let max_suffix = existing
        .iter()
        .filter_map(|value| {
            ACCOUNT_NUMBER_PREFIX
                .captures(value.as_ref())
                .and_then(|caps| caps.get(1))
                .and_then(|digits| digits.as_str().parse::<u64>().ok())
        })
        .max()
        .unwrap_or(0);

    format!("CUS-{:05}", max_suffix.saturating_add(1))
}
