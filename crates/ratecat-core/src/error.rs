//! Fatal pipeline errors.
//!
//! Everything recoverable is reported as a
//! [`ValidationIssue`](ratecat_model::ValidationIssue) on the catalog. What
//! remains here stops the document: it names its category and the stage that
//! raised it.

use std::fmt;

use thiserror::Error;

use ratecat_config::ConfigError;
use ratecat_rules::RulesError;

/// Pipeline stage, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Stage {
    Configuration,
    Segmentation,
    HeaderNormalization,
    Classification,
    RowInterpretation,
    Validation,
}

impl Stage {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Configuration => "configuration",
            Self::Segmentation => "segmentation",
            Self::HeaderNormalization => "header_normalization",
            Self::Classification => "classification",
            Self::RowInterpretation => "row_interpretation",
            Self::Validation => "validation",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The document cannot be turned into a catalog at all.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StructuralError {
    #[error("no usable table found in {sheets} sheet(s)")]
    NoUsableTables { sheets: usize },

    #[error("table type {table_type} requires column {column:?}, which no header alias produces")]
    UnsatisfiableRequiredColumns { table_type: String, column: String },
}

#[derive(Error, Debug)]
#[non_exhaustive]
pub enum PipelineError {
    /// Bundle missing, malformed or internally inconsistent.
    #[error("configuration error for business line {business_line:?}: {source}")]
    Configuration {
        business_line: String,
        #[source]
        source: ConfigError,
    },

    #[error("structural error during {stage}: {reason}")]
    Structural {
        stage: Stage,
        #[source]
        reason: StructuralError,
    },
}

impl PipelineError {
    pub fn configuration(business_line: impl Into<String>, source: ConfigError) -> Self {
        Self::Configuration {
            business_line: business_line.into(),
            source,
        }
    }

    pub fn category(&self) -> &'static str {
        match self {
            Self::Configuration { .. } => "configuration",
            Self::Structural { .. } => "structural",
        }
    }

    pub fn stage(&self) -> Stage {
        match self {
            Self::Configuration { .. } => Stage::Configuration,
            Self::Structural { stage, .. } => *stage,
        }
    }

    /// Lifts a rule compilation error; unsatisfiable columns are structural.
    pub(crate) fn from_rules(business_line: &str, error: RulesError) -> Self {
        match error {
            RulesError::Config(source) => Self::configuration(business_line, source),
            RulesError::UnsatisfiableColumn { table_type, column } => Self::Structural {
                stage: Stage::Classification,
                reason: StructuralError::UnsatisfiableRequiredColumns { table_type, column },
            },
        }
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;
