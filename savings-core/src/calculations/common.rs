//! Common utility functions for savings calculations.
//!
//! This module provides shared functionality used across the estimation
//! engine and its presentation layers, including rounding and rate
//! conversions.

use rust_decimal::Decimal;

/// Rounds a decimal value to the nearest whole unit using half-up rounding.
///
/// Estimates are computed at full precision and only rounded when shown to
/// the reader. Values at exactly 0.5 are rounded up (away from zero).
///
/// # Arguments
///
/// * `value` - The decimal value to round
///
/// # Returns
///
/// The value rounded to zero decimal places.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use savings_core::calculations::common::round_to_whole;
///
/// assert_eq!(round_to_whole(dec!(359999.4)), dec!(359999));
/// assert_eq!(round_to_whole(dec!(359999.5)), dec!(360000));
/// assert_eq!(round_to_whole(dec!(359999.6)), dec!(360000));
/// assert_eq!(round_to_whole(dec!(-0.5)), dec!(-1)); // Away from zero
/// ```
pub fn round_to_whole(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(0, rust_decimal::RoundingStrategy::MidpointAwayFromZero)
}

/// Converts a percentage figure to its fractional multiplier.
///
/// Rates arrive as human-entered percentages (8 means 8%). No bounds are
/// applied, so values above 100 or below zero convert the same way.
///
/// # Arguments
///
/// * `percent` - The percentage value (e.g., 8 for 8%)
///
/// # Returns
///
/// The equivalent fraction (e.g., 0.08).
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use savings_core::calculations::common::percent_to_fraction;
///
/// assert_eq!(percent_to_fraction(dec!(8)), dec!(0.08));
/// assert_eq!(percent_to_fraction(dec!(12.5)), dec!(0.125));
/// assert_eq!(percent_to_fraction(dec!(250)), dec!(2.5));
/// ```
pub fn percent_to_fraction(percent: Decimal) -> Decimal {
    percent / Decimal::ONE_HUNDRED
}
