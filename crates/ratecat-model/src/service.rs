use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::rate::RateSpec;

pub const UNKNOWN_FREQUENCY: &str = "unknown";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaxApplication {
    Yes,
    No,
    #[default]
    Unknown,
}

impl TaxApplication {
    pub fn as_bool(self) -> Option<bool> {
        match self {
            Self::Yes => Some(true),
            Self::No => Some(false),
            Self::Unknown => None,
        }
    }
}

impl From<Option<bool>> for TaxApplication {
    fn from(value: Option<bool>) -> Self {
        match value {
            Some(true) => Self::Yes,
            Some(false) => Self::No,
            None => Self::Unknown,
        }
    }
}

/// One priced service, built from a single data row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceRecord {
    pub service_id: String,
    pub description: String,
    pub rates: BTreeMap<String, RateSpec>,
    pub applies_tax: TaxApplication,
    pub frequency: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disclaimer: Option<String>,
    /// Zero-based row in the source sheet.
    pub source_row: usize,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, String>,
}

impl ServiceRecord {
    pub fn has_known_frequency(&self) -> bool {
        self.frequency != UNKNOWN_FREQUENCY
    }
}
