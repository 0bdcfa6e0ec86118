use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::scenario::ScenarioCode;

/// Errors that can occur when validating scenario parameters.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScenarioParamsError {
    /// The preventable fraction must be between 0 and 1 when present.
    #[error("preventable fraction must be between 0 and 1, got {0}")]
    InvalidPreventableFraction(Decimal),

    /// A factor has an empty input field name.
    #[error("field name for {0} must not be empty")]
    EmptyFieldName(&'static str),

    /// A factor has an empty display label.
    #[error("label for {0} must not be empty")]
    EmptyLabel(&'static str),

    /// Two factors share the same input field name.
    #[error("field name '{0}' is used for more than one factor")]
    DuplicateFieldName(String),
}

/// Input vocabulary for one calculator scenario.
///
/// Each scenario names the four fields its calculator asks for, the labels
/// shown next to them, and optionally its own preventable fraction. Field
/// names are the keys an estimate's input map is expected to use.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioParams {
    pub scenario_code: ScenarioCode,
    pub dimension_a_field: String,
    pub dimension_a_label: String,
    pub dimension_b_field: String,
    pub dimension_b_label: String,
    pub affected_rate_field: String,
    pub affected_rate_label: String,
    pub value_per_event_field: String,
    pub value_per_event_label: String,
    pub preventable_fraction: Option<Decimal>,
}

impl ScenarioParams {
    /// Validates the parameters before they are stored.
    ///
    /// # Errors
    ///
    /// Returns [`ScenarioParamsError`] if:
    /// - The preventable fraction is present and outside [0, 1]
    /// - Any field name or label is empty
    /// - Two factors share the same field name
    pub fn validate(&self) -> Result<(), ScenarioParamsError> {
        if let Some(fraction) = self.preventable_fraction {
            if fraction < Decimal::ZERO || fraction > Decimal::ONE {
                return Err(ScenarioParamsError::InvalidPreventableFraction(fraction));
            }
        }

        let factors = [
            (
                "dimension A",
                &self.dimension_a_field,
                &self.dimension_a_label,
            ),
            (
                "dimension B",
                &self.dimension_b_field,
                &self.dimension_b_label,
            ),
            (
                "the affected rate",
                &self.affected_rate_field,
                &self.affected_rate_label,
            ),
            (
                "the value per event",
                &self.value_per_event_field,
                &self.value_per_event_label,
            ),
        ];

        for &(role, field, label) in &factors {
            if field.trim().is_empty() {
                return Err(ScenarioParamsError::EmptyFieldName(role));
            }
            if label.trim().is_empty() {
                return Err(ScenarioParamsError::EmptyLabel(role));
            }
        }

        for (i, &(_, field, _)) in factors.iter().enumerate() {
            if factors.iter().skip(i + 1).any(|&(_, other, _)| other == field) {
                return Err(ScenarioParamsError::DuplicateFieldName(field.clone()));
            }
        }

        Ok(())
    }
}
