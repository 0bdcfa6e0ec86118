//! Savings estimation modules for the outcome calculators.
//!
//! This module provides the calculation logic for estimated savings,
//! organized around a single estimation engine that every scenario shares.

pub mod common;
pub mod engine;
pub mod input;

pub use engine::{
    EstimationBreakdown, EstimationEngine, EstimationRule, EstimationRuleError,
    PREVENTABLE_FRACTION_DEFAULT,
};
pub use input::{EstimationInput, RawValue};
