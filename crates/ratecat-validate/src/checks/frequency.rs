use ratecat_config::FrequencyConfig;
use ratecat_model::{Catalog, IssueCode, ValidationIssue};

use super::service_issue;

pub fn check(catalog: &Catalog, frequencies: &FrequencyConfig) -> Vec<ValidationIssue> {
    catalog
        .services()
        .filter(|(_, service)| !frequencies.is_valid(&service.frequency))
        .map(|(table_type, service)| {
            service_issue(
                IssueCode::InvalidFrequency,
                table_type,
                service,
                format!(
                    "frequency {:?} is not one of: {}",
                    service.frequency,
                    frequencies.values.join(", ")
                ),
            )
            .with_column("frequency")
        })
        .collect()
}
