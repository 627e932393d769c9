//! Service id uniqueness across the whole document.

use std::collections::BTreeMap;

use ratecat_model::{Catalog, IssueCode, TableType, ValidationIssue};

use super::service_issue;

pub fn check(catalog: &Catalog) -> Vec<ValidationIssue> {
    let mut first_seen: BTreeMap<&str, &TableType> = BTreeMap::new();
    let mut issues = Vec::new();
    for (table_type, service) in catalog.services() {
        match first_seen.get(service.service_id.as_str()) {
            Some(first) => issues.push(service_issue(
                IssueCode::DuplicateServiceId,
                table_type,
                service,
                format!(
                    "service id {:?} is already used in table {first}",
                    service.service_id
                ),
            )),
            None => {
                first_seen.insert(&service.service_id, table_type);
            }
        }
    }
    issues
}
