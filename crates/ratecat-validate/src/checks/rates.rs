//! Rate interpretation and rate column shape.

use std::collections::BTreeSet;

use ratecat_config::BusinessLineConfig;
use ratecat_model::{Catalog, IssueCode, ValidationIssue};

use super::service_issue;

pub fn check_interpreted(catalog: &Catalog, allowed_columns: &[String]) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();
    for (table_type, service) in catalog.services() {
        for (column, rate) in &service.rates {
            if rate.is_unparsed() && !allowed_columns.iter().any(|allowed| allowed == column) {
                issues.push(
                    service_issue(
                        IssueCode::RateNotInterpreted,
                        table_type,
                        service,
                        format!("rate in column {column:?} was not interpreted"),
                    )
                    .with_column(column.clone()),
                );
            }
        }
    }
    issues
}

/// Only table types with configured rate columns have a fixed shape.
pub fn check_columns(catalog: &Catalog, config: &BusinessLineConfig) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();
    for (table_type, table) in &catalog.tables {
        let Some(rule) = config.rule_for(table_type.as_str()) else {
            continue;
        };
        if rule.rate_columns.is_empty() {
            continue;
        }
        let expected: BTreeSet<&str> = rule.rate_columns.iter().map(String::as_str).collect();
        for service in &table.services {
            let actual: BTreeSet<&str> = service.rates.keys().map(String::as_str).collect();
            for column in expected.difference(&actual) {
                issues.push(
                    service_issue(
                        IssueCode::MissingRateColumn,
                        table_type,
                        service,
                        format!("rate column {column:?} expected for {table_type} is missing"),
                    )
                    .with_column(*column),
                );
            }
            for column in actual.difference(&expected) {
                issues.push(
                    service_issue(
                        IssueCode::UnexpectedRateColumn,
                        table_type,
                        service,
                        format!("rate column {column:?} is not defined for {table_type}"),
                    )
                    .with_column(*column),
                );
            }
        }
    }
    issues
}
