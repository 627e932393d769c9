use serde::{Deserialize, Serialize};

/// Interpreted value of one rate cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RateSpec {
    Fixed {
        value: f64,
    },
    /// `included_free` uses at no charge, then `additional_cost` per use.
    Conditional {
        included_free: u32,
        additional_cost: f64,
    },
    Unlimited {},
    /// Kept verbatim; never silently dropped.
    Unparsed {
        raw: String,
    },
}

impl RateSpec {
    pub fn is_unparsed(&self) -> bool {
        matches!(self, Self::Unparsed { .. })
    }
}
