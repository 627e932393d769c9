use serde::{Deserialize, Serialize};

use crate::issue::{Severity, ValidationIssue};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationStatus {
    Passed,
    PassedWithWarnings,
    Failed,
}

impl ValidationStatus {
    pub fn from_counts(errors: usize, warnings: usize) -> Self {
        if errors > 0 {
            Self::Failed
        } else if warnings > 0 {
            Self::PassedWithWarnings
        } else {
            Self::Passed
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Passed => "passed",
            Self::PassedWithWarnings => "passed_with_warnings",
            Self::Failed => "failed",
        }
    }
}

/// Issue listing split by severity, written next to the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub document_id: String,
    pub business_line: String,
    pub status: ValidationStatus,
    pub error_count: usize,
    pub warning_count: usize,
    pub errors: Vec<ValidationIssue>,
    pub warnings: Vec<ValidationIssue>,
}

impl ValidationReport {
    pub fn from_issues(document_id: &str, business_line: &str, issues: &[ValidationIssue]) -> Self {
        let (errors, warnings): (Vec<_>, Vec<_>) = issues
            .iter()
            .cloned()
            .partition(|issue| issue.severity == Severity::Error);
        Self {
            document_id: document_id.to_string(),
            business_line: business_line.to_string(),
            status: ValidationStatus::from_counts(errors.len(), warnings.len()),
            error_count: errors.len(),
            warning_count: warnings.len(),
            errors,
            warnings,
        }
    }

    pub fn has_errors(&self) -> bool {
        self.error_count > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::issue::{IssueCode, IssueScope};

    #[test]
    fn status_follows_counts() {
        assert_eq!(ValidationStatus::from_counts(0, 0), ValidationStatus::Passed);
        assert_eq!(
            ValidationStatus::from_counts(0, 2),
            ValidationStatus::PassedWithWarnings
        );
        assert_eq!(ValidationStatus::from_counts(1, 0), ValidationStatus::Failed);
    }

    #[test]
    fn report_partitions_by_severity() {
        let issues = vec![
            ValidationIssue::new(IssueCode::EmptyRate, IssueScope::Service, "empty"),
            ValidationIssue::new(IssueCode::EmptyCatalog, IssueScope::Document, "no services"),
        ];
        let report = ValidationReport::from_issues("abc", "accounts", &issues);
        assert_eq!(report.error_count, 1);
        assert_eq!(report.warning_count, 1);
        assert_eq!(report.status, ValidationStatus::Failed);
        assert!(report.has_errors());
    }
}
