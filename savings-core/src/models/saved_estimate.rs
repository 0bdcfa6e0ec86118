use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::scenario::ScenarioCode;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedEstimate {
    pub id: i64,
    pub scenario_code: ScenarioCode,
    pub label: Option<String>,

    // User-provided values, as read by the engine after lenient parsing
    pub dimension_a: Decimal,
    pub dimension_b: Decimal,
    pub affected_rate_percent: Decimal,
    pub value_per_event: Decimal,
    pub preventable_fraction: Decimal,

    // Calculated value
    pub savings: Option<Decimal>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// For creating new saved estimates (no id or timestamps)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewSavedEstimate {
    pub scenario_code: ScenarioCode,
    pub label: Option<String>,
    pub dimension_a: Decimal,
    pub dimension_b: Decimal,
    pub affected_rate_percent: Decimal,
    pub value_per_event: Decimal,
    pub preventable_fraction: Decimal,
    pub savings: Option<Decimal>,
}
