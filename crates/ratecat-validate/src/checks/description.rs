use ratecat_config::ValidationRules;
use ratecat_model::{Catalog, IssueCode, ValidationIssue};

use super::service_issue;

pub fn check(catalog: &Catalog, rules: &ValidationRules) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();
    for (table_type, service) in catalog.services() {
        let length = service.description.trim().chars().count();
        if length == 0 {
            // Reported by the required-field check.
            continue;
        }
        if length < rules.min_description_length {
            issues.push(service_issue(
                IssueCode::DescriptionTooShort,
                table_type,
                service,
                format!(
                    "description has {length} characters, fewer than {}",
                    rules.min_description_length
                ),
            ));
        } else if length > rules.max_description_length {
            issues.push(service_issue(
                IssueCode::DescriptionTooLong,
                table_type,
                service,
                format!(
                    "description has {length} characters, more than {}",
                    rules.max_description_length
                ),
            ));
        }
    }
    issues
}
