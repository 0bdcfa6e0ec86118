use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScenarioCode {
    SurgeryCancellation,
    WorkersComp,
    PtDropout,
}

impl ScenarioCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SurgeryCancellation => "surgery_cancellation",
            Self::WorkersComp => "workers_comp",
            Self::PtDropout => "pt_dropout",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "surgery_cancellation" => Some(Self::SurgeryCancellation),
            "workers_comp" => Some(Self::WorkersComp),
            "pt_dropout" => Some(Self::PtDropout),
            _ => None,
        }
    }

    /// All scenarios, in presentation order.
    pub fn all() -> [Self; 3] {
        [Self::SurgeryCancellation, Self::WorkersComp, Self::PtDropout]
    }
}

impl fmt::Display for ScenarioCode {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    pub id: i64,
    pub code: ScenarioCode,
    pub name: String,
}
