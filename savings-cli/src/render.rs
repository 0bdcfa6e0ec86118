//! Terminal rendering helpers.
//!
//! Estimates are computed and stored at full precision; rounding to whole
//! dollars happens here, at the presentation boundary, and nowhere else.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use savings_core::calculations::common::round_to_whole;

/// Formats a dollar amount: rounded to whole dollars (half-up), thousands
/// grouped with commas, `$` prefix. Negative amounts keep the sign ahead of
/// the `$`, so `-1234.5` renders as `-$1,235`.
pub fn format_currency(amount: Decimal) -> String {
    let rounded = round_to_whole(amount);
    let grouped = group_thousands(&rounded.abs().to_string());
    if rounded.is_sign_negative() && !rounded.is_zero() {
        format!("-${}", grouped)
    } else {
        format!("${}", grouped)
    }
}

/// Formats a plain decimal with trailing zeros trimmed: `200.00` renders as
/// `200`, `0.6` stays `0.6`. No rounding.
pub fn format_number(value: Decimal) -> String {
    value.normalize().to_string()
}

/// Formats a timestamp for list output, minute precision.
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.format("%Y-%m-%d %H:%M").to_string()
}

/// Inserts `,` separators into a bare digit string.
fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    if len <= 3 {
        return digits.to_string();
    }

    let mut result = String::with_capacity(len + len / 3);
    let first_group = len % 3;
    if first_group > 0 {
        result.push_str(&digits[..first_group]);
        result.push(',');
    }
    for (i, ch) in digits[first_group..].chars().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(ch);
    }

    result
}
