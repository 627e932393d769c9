//! Required field presence.

use ratecat_model::{Catalog, IssueCode, ServiceRecord, TaxApplication, ValidationIssue};

use super::service_issue;

pub fn check(catalog: &Catalog, required_fields: &[String]) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();
    for (table_type, service) in catalog.services() {
        for field in required_fields {
            if !is_present(service, field) {
                issues.push(
                    service_issue(
                        IssueCode::MissingRequiredField,
                        table_type,
                        service,
                        format!("required field {field:?} is missing"),
                    )
                    .with_column(field.clone()),
                );
            }
        }
    }
    issues
}

/// `unknown` frequency is an enumerated value and counts as present.
fn is_present(service: &ServiceRecord, field: &str) -> bool {
    match field {
        "service_id" => !service.service_id.trim().is_empty(),
        "description" => !service.description.trim().is_empty(),
        "frequency" => !service.frequency.trim().is_empty(),
        "applies_tax" => service.applies_tax != TaxApplication::Unknown,
        "disclaimer" => service
            .disclaimer
            .as_deref()
            .is_some_and(|text| !text.trim().is_empty()),
        "rates" => !service.rates.is_empty(),
        other => service
            .extra
            .get(other)
            .is_some_and(|value| !value.trim().is_empty()),
    }
}
