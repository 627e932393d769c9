#![deny(unsafe_code)]

pub mod catalog;
pub mod error;
pub mod grid;
pub mod header;
pub mod issue;
pub mod rate;
pub mod region;
pub mod report;
pub mod service;

pub use catalog::{Catalog, CatalogTable, TableClassification, TableSource, TableType};
pub use error::{ModelError, Result};
pub use grid::{CellValue, RawGrid};
pub use header::{CanonicalHeader, HeaderColumn, HeaderMatch};
pub use issue::{IssueCode, IssueScope, Severity, ValidationIssue};
pub use rate::RateSpec;
pub use region::{RegionKind, SheetSegments, TableRegion};
pub use report::{ValidationReport, ValidationStatus};
pub use service::{ServiceRecord, TaxApplication, UNKNOWN_FREQUENCY};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issue_builder_carries_context() {
        let issue = ValidationIssue::new(
            IssueCode::UnparsedRate,
            IssueScope::Service,
            "rate could not be interpreted",
        )
        .with_sheet("Tarifas")
        .with_column("g_zero")
        .with_row(7);
        assert_eq!(issue.severity, Severity::Warning);
        assert_eq!(issue.sheet.as_deref(), Some("Tarifas"));
        assert_eq!(issue.column.as_deref(), Some("g_zero"));
        assert_eq!(issue.row, Some(7));
        assert!(!issue.is_error());
    }

    #[test]
    fn rate_spec_serializes_with_type_tag() {
        let json = serde_json::to_string(&RateSpec::Conditional {
            included_free: 3,
            additional_cost: 7510.0,
        })
        .expect("serialize rate");
        assert_eq!(
            json,
            r#"{"type":"conditional","included_free":3,"additional_cost":7510.0}"#
        );
        let unlimited = serde_json::to_string(&RateSpec::Unlimited {}).expect("serialize");
        assert_eq!(unlimited, r#"{"type":"unlimited"}"#);
    }
}
