//! Validation check modules.
//!
//! Each module performs one kind of check and returns its issues.

mod description;
mod document;
mod frequency;
mod rates;
mod required;
mod uniqueness;

use ratecat_config::BusinessLineConfig;
use ratecat_model::{Catalog, IssueCode, IssueScope, ServiceRecord, TableType, ValidationIssue};

/// Run all validation checks on a catalog.
pub fn run_all(catalog: &Catalog, config: &BusinessLineConfig) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    // 1. Document-level: a catalog without services
    issues.extend(document::check(catalog));

    // 2. Required fields per service
    issues.extend(required::check(catalog, &config.validation.required_fields));

    // 3. Frequency within the configured set
    issues.extend(frequency::check(catalog, &config.frequencies));

    // 4. Rates interpreted unless the column allows free text
    issues.extend(rates::check_interpreted(
        catalog,
        &config.rates.unparsed_allowed_columns,
    ));

    // 5. Every service carries exactly its table type's rate columns
    issues.extend(rates::check_columns(catalog, config));

    // 6. Description length bounds
    issues.extend(description::check(catalog, &config.validation));

    // 7. Service ids unique across the document
    issues.extend(uniqueness::check(catalog));

    issues
}

/// Issue scoped to one service of one table.
fn service_issue(
    code: IssueCode,
    table_type: &TableType,
    service: &ServiceRecord,
    message: String,
) -> ValidationIssue {
    ValidationIssue::new(code, IssueScope::Service, message)
        .with_table_type(table_type.as_str())
        .with_service(service.service_id.clone())
        .with_row(service.source_row)
}
