//! Raw calculator input and its lenient numeric reading.
//!
//! Calculator fields arrive as free text typed into a form or on a command
//! line. Every conversion here is total: blank text, text that does not
//! parse, and fields that were never provided all read as zero. Nothing in
//! this module returns an error or logs.

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A single field value as captured, before any numeric interpretation.
///
/// Values that were already numeric stay numeric; everything else is kept
/// as the text the user entered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    /// A value that was numeric at the point of capture.
    Number(Decimal),

    /// Text exactly as entered, not yet parsed.
    Text(String),
}

impl RawValue {
    /// Reads this value as a decimal.
    ///
    /// Text is trimmed and commas (thousands separators) are removed before
    /// parsing, so `"1,250"` reads as `1250`. Empty text and text that does
    /// not parse as a number both read as zero. Numbers pass through
    /// unchanged, including negative ones.
    pub fn to_decimal(&self) -> Decimal {
        match self {
            RawValue::Number(value) => *value,
            RawValue::Text(text) => {
                let normalized = text.trim().replace(',', "");
                if normalized.is_empty() {
                    return Decimal::ZERO;
                }
                normalized.parse().unwrap_or(Decimal::ZERO)
            }
        }
    }
}

impl From<Decimal> for RawValue {
    fn from(value: Decimal) -> Self {
        RawValue::Number(value)
    }
}

impl From<&str> for RawValue {
    fn from(value: &str) -> Self {
        RawValue::Text(value.to_string())
    }
}

impl From<String> for RawValue {
    fn from(value: String) -> Self {
        RawValue::Text(value)
    }
}

/// The full set of captured fields for one estimate, keyed by field name.
///
/// Field names are scenario vocabulary such as `num_doctors` or
/// `revenue_per_surgery`. Lookups never fail: a field that was never set
/// reads as zero, the same as a field left blank.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EstimationInput {
    /// Captured values by field name.
    pub fields: HashMap<String, RawValue>,
}

impl EstimationInput {
    /// Creates an empty input set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a field, replacing any earlier value under the same name.
    pub fn insert(
        &mut self,
        field: impl Into<String>,
        value: impl Into<RawValue>,
    ) {
        self.fields.insert(field.into(), value.into());
    }

    /// Returns the captured value for a field, if one was provided.
    pub fn get(&self, field: &str) -> Option<&RawValue> {
        self.fields.get(field)
    }

    /// Reads a field as a decimal, treating a missing field as zero.
    pub fn value(&self, field: &str) -> Decimal {
        self.fields
            .get(field)
            .map(RawValue::to_decimal)
            .unwrap_or(Decimal::ZERO)
    }
}
