//! Savings estimation engine shared by every outcome calculator.
//!
//! The calculator pages (cancelled surgeries, workers' comp claims, therapy
//! dropouts) all reduce to the same arithmetic over four captured numbers.
//! A scenario contributes only vocabulary: which input field plays which
//! factor, and optionally its own preventable fraction.
//!
//! # Estimate Structure
//!
//! Every estimate walks the same four steps:
//!
//! | Step | Result            | Formula                                |
//! |------|-------------------|----------------------------------------|
//! | 1    | Total events      | dimension A * dimension B              |
//! | 2    | Affected events   | total events * affected rate / 100     |
//! | 3    | Actionable events | affected events * preventable fraction |
//! | 4    | Savings           | actionable events * value per event    |
//!
//! All four results are carried at full precision. Rounding happens only at
//! the display boundary.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use savings_core::calculations::{EstimationEngine, EstimationInput, EstimationRule};
//!
//! let rule = EstimationRule {
//!     dimension_a_field: "num_doctors".to_string(),
//!     dimension_b_field: "surgeries_per_doctor".to_string(),
//!     affected_rate_field: "cancellation_rate".to_string(),
//!     value_per_event_field: "revenue_per_surgery".to_string(),
//!     preventable_fraction: dec!(0.6),
//! };
//!
//! let mut input = EstimationInput::new();
//! input.insert("num_doctors", "10");
//! input.insert("surgeries_per_doctor", "250");
//! input.insert("cancellation_rate", "8");
//! input.insert("revenue_per_surgery", "3000");
//!
//! let engine = EstimationEngine::new(&rule);
//! let breakdown = engine.estimate(&input);
//!
//! assert_eq!(breakdown.total_events, dec!(2500));
//! assert_eq!(breakdown.affected_events, dec!(200));
//! assert_eq!(breakdown.actionable_events, dec!(120));
//! assert_eq!(breakdown.savings, dec!(360000));
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ScenarioParams;
use crate::calculations::common::percent_to_fraction;
use crate::calculations::input::EstimationInput;

/// Fraction of affected events treated as preventable when a scenario does
/// not carry its own figure.
///
/// The value is 0.6.
pub const PREVENTABLE_FRACTION_DEFAULT: Decimal = Decimal::from_parts(6, 0, 0, false, 1);

/// Errors that can occur when validating an estimation rule.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EstimationRuleError {
    /// The preventable fraction is outside the closed range [0, 1].
    #[error("preventable fraction must be between 0 and 1, got {0}")]
    InvalidPreventableFraction(Decimal),

    /// A factor has no input field bound to it.
    #[error("no input field is bound for {0}")]
    MissingFieldBinding(&'static str),

    /// Two factors are bound to the same input field.
    #[error("input field '{0}' is bound to more than one factor")]
    DuplicateFieldBinding(String),
}

/// Binds scenario input fields to the four estimate factors.
///
/// A rule says which captured field plays which role, plus the preventable
/// fraction to apply. Rules usually come from stored scenario parameters via
/// [`EstimationRule::from_scenario_params`]; the [`Default`] rule binds the
/// generic factor names directly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EstimationRule {
    /// Input field read as the first volume dimension (e.g. `num_doctors`).
    pub dimension_a_field: String,

    /// Input field read as the second volume dimension
    /// (e.g. `surgeries_per_doctor`).
    pub dimension_b_field: String,

    /// Input field read as the affected rate, expressed as a percentage
    /// (8 means 8%).
    pub affected_rate_field: String,

    /// Input field read as the dollar value of a single event.
    pub value_per_event_field: String,

    /// Fraction of affected events counted as actionable.
    pub preventable_fraction: Decimal,
}

impl Default for EstimationRule {
    fn default() -> Self {
        Self {
            dimension_a_field: "dimension_a".to_string(),
            dimension_b_field: "dimension_b".to_string(),
            affected_rate_field: "affected_rate_percent".to_string(),
            value_per_event_field: "value_per_event".to_string(),
            preventable_fraction: PREVENTABLE_FRACTION_DEFAULT,
        }
    }
}

impl EstimationRule {
    /// Builds a rule from stored scenario parameters.
    ///
    /// A scenario without its own preventable fraction falls back to
    /// [`PREVENTABLE_FRACTION_DEFAULT`]; the fallback is logged because it
    /// usually means the scenario row was seeded incompletely.
    pub fn from_scenario_params(params: &ScenarioParams) -> Self {
        let preventable_fraction = match params.preventable_fraction {
            Some(fraction) => fraction,
            None => {
                tracing::warn!(
                    scenario = %params.scenario_code,
                    "scenario carries no preventable fraction, using default"
                );
                PREVENTABLE_FRACTION_DEFAULT
            }
        };

        Self {
            dimension_a_field: params.dimension_a_field.clone(),
            dimension_b_field: params.dimension_b_field.clone(),
            affected_rate_field: params.affected_rate_field.clone(),
            value_per_event_field: params.value_per_event_field.clone(),
            preventable_fraction,
        }
    }

    /// Validates the rule before it is stored or used for estimates.
    ///
    /// # Errors
    ///
    /// Returns [`EstimationRuleError`] if:
    /// - The preventable fraction is outside [0, 1]
    /// - Any factor is bound to an empty field name
    /// - Two factors are bound to the same field name
    pub fn validate(&self) -> Result<(), EstimationRuleError> {
        if self.preventable_fraction < Decimal::ZERO || self.preventable_fraction > Decimal::ONE {
            return Err(EstimationRuleError::InvalidPreventableFraction(
                self.preventable_fraction,
            ));
        }

        let bindings = [
            ("dimension A", &self.dimension_a_field),
            ("dimension B", &self.dimension_b_field),
            ("the affected rate", &self.affected_rate_field),
            ("the value per event", &self.value_per_event_field),
        ];

        for &(role, field) in &bindings {
            if field.trim().is_empty() {
                return Err(EstimationRuleError::MissingFieldBinding(role));
            }
        }

        for (i, &(_, field)) in bindings.iter().enumerate() {
            if bindings.iter().skip(i + 1).any(|&(_, other)| other == field) {
                return Err(EstimationRuleError::DuplicateFieldBinding(field.clone()));
            }
        }

        Ok(())
    }
}

/// One computed estimate, carried at full precision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EstimationBreakdown {
    /// Events across both volume dimensions (step 1).
    pub total_events: Decimal,

    /// Events hit by the problem the scenario describes (step 2).
    pub affected_events: Decimal,

    /// Affected events the product can act on (step 3).
    pub actionable_events: Decimal,

    /// Dollar value recovered by acting on those events (step 4).
    pub savings: Decimal,
}

/// Calculator for scenario savings estimates.
///
/// The engine borrows its rule, so one engine serves every estimate computed
/// under that rule.
#[derive(Debug, Clone)]
pub struct EstimationEngine<'a> {
    rule: &'a EstimationRule,
}

impl<'a> EstimationEngine<'a> {
    /// Creates a new estimation engine over the given rule.
    pub fn new(rule: &'a EstimationRule) -> Self {
        Self { rule }
    }

    /// Computes the full savings breakdown for one set of captured inputs.
    ///
    /// This never fails: fields that are missing, blank, or unparseable read
    /// as zero and simply zero out the terms they feed. The same input always
    /// produces the identical breakdown. Rates are applied as entered,
    /// including values above 100 percent; negative inputs flow through with
    /// their sign.
    pub fn estimate(
        &self,
        input: &EstimationInput,
    ) -> EstimationBreakdown {
        let total_events = self.total_events(input);
        let affected_events = self.affected_events(input, total_events);
        let actionable_events = self.actionable_events(affected_events);
        let savings = self.savings(input, actionable_events);

        EstimationBreakdown {
            total_events,
            affected_events,
            actionable_events,
            savings,
        }
    }

    /// Step 1: events across both volume dimensions.
    fn total_events(&self, input: &EstimationInput) -> Decimal {
        input.value(&self.rule.dimension_a_field) * input.value(&self.rule.dimension_b_field)
    }

    /// Step 2: the share of events hit by the problem.
    fn affected_events(
        &self,
        input: &EstimationInput,
        total_events: Decimal,
    ) -> Decimal {
        total_events * percent_to_fraction(input.value(&self.rule.affected_rate_field))
    }

    /// Step 3: the share of affected events the product can prevent.
    fn actionable_events(&self, affected_events: Decimal) -> Decimal {
        affected_events * self.rule.preventable_fraction
    }

    /// Step 4: the dollar value recovered by acting on those events.
    fn savings(
        &self,
        input: &EstimationInput,
        actionable_events: Decimal,
    ) -> Decimal {
        actionable_events * input.value(&self.rule.value_per_event_field)
    }
}
