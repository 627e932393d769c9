//! Catalog validation.
//!
//! Validation is a pure read of an assembled [`Catalog`]: it never edits
//! services, it only reports. Running it twice on the same catalog yields the
//! same issues in the same order.

#![deny(unsafe_code)]

mod checks;

use tracing::info;

use ratecat_config::{BusinessLineConfig, ValidationRules};
use ratecat_model::{Catalog, ValidationIssue};

/// Runs every check and returns the issues with configured severities applied.
pub fn validate_catalog(catalog: &Catalog, config: &BusinessLineConfig) -> Vec<ValidationIssue> {
    let mut issues = checks::run_all(catalog, config);
    apply_severities(&mut issues, &config.validation);
    info!(
        business_line = %catalog.business_line,
        services = catalog.service_count(),
        issues = issues.len(),
        errors = issues.iter().filter(|issue| issue.is_error()).count(),
        "catalog validated"
    );
    issues
}

/// Replaces each issue's severity with the one configured for its code.
pub fn apply_severities(issues: &mut [ValidationIssue], rules: &ValidationRules) {
    for issue in issues {
        issue.severity = rules.severity_for(issue.code);
    }
}
