use ratecat_model::{Catalog, IssueCode, IssueScope, ValidationIssue};

pub fn check(catalog: &Catalog) -> Vec<ValidationIssue> {
    if catalog.service_count() > 0 {
        return Vec::new();
    }
    vec![ValidationIssue::new(
        IssueCode::EmptyCatalog,
        IssueScope::Document,
        "catalog contains no services",
    )]
}
