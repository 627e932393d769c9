use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};
use crate::issue::{Severity, ValidationIssue};
use crate::report::{ValidationReport, ValidationStatus};
use crate::service::ServiceRecord;

/// Catalog category name, drawn from business-line configuration.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TableType(String);

impl TableType {
    pub const UNCLASSIFIED: &'static str = "unclassified";

    pub fn new(value: impl Into<String>) -> Result<Self> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty()
            || !trimmed
                .chars()
                .all(|ch| ch.is_ascii_lowercase() || ch.is_ascii_digit() || ch == '_')
        {
            return Err(ModelError::InvalidTableType(value));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn unclassified() -> Self {
        Self(Self::UNCLASSIFIED.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_unclassified(&self) -> bool {
        self.0 == Self::UNCLASSIFIED
    }
}

impl fmt::Display for TableType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableClassification {
    pub table_type: TableType,
    /// Pattern or keyword that selected the rule, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matched_pattern: Option<String>,
    pub matched_columns: Vec<String>,
}

impl TableClassification {
    pub fn unclassified() -> Self {
        Self {
            table_type: TableType::unclassified(),
            matched_pattern: None,
            matched_columns: Vec::new(),
        }
    }
}

/// Where a catalog table's rows came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSource {
    pub sheet: String,
    pub region_index: usize,
    pub start_row: usize,
    pub end_row: usize,
    pub header_row: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub classification: TableClassification,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogTable {
    pub table_type: TableType,
    pub sources: Vec<TableSource>,
    pub services: Vec<ServiceRecord>,
}

impl CatalogTable {
    pub fn new(table_type: TableType) -> Self {
        Self {
            table_type,
            sources: Vec::new(),
            services: Vec::new(),
        }
    }
}

/// The final document: services grouped by table type plus every issue raised.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    pub document_id: String,
    pub business_line: String,
    pub document_type: String,
    pub document_version: String,
    pub generated_at: DateTime<Utc>,
    pub source_sheets: Vec<String>,
    pub tables: BTreeMap<TableType, CatalogTable>,
    pub issues: Vec<ValidationIssue>,
}

impl Catalog {
    pub fn services(&self) -> impl Iterator<Item = (&TableType, &ServiceRecord)> {
        self.tables
            .iter()
            .flat_map(|(table_type, table)| table.services.iter().map(move |s| (table_type, s)))
    }

    pub fn service_count(&self) -> usize {
        self.tables.values().map(|table| table.services.len()).sum()
    }

    pub fn error_count(&self) -> usize {
        self.issues.iter().filter(|issue| issue.is_error()).count()
    }

    pub fn warning_count(&self) -> usize {
        self.issues
            .iter()
            .filter(|issue| issue.severity == Severity::Warning)
            .count()
    }

    pub fn has_errors(&self) -> bool {
        self.issues.iter().any(ValidationIssue::is_error)
    }

    pub fn status(&self) -> ValidationStatus {
        ValidationStatus::from_counts(self.error_count(), self.warning_count())
    }

    pub fn report(&self) -> ValidationReport {
        ValidationReport::from_issues(&self.document_id, &self.business_line, &self.issues)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_type_rejects_non_identifiers() {
        assert!(TableType::new("transfers").is_ok());
        assert!(TableType::new(" mobile_plans ").is_ok());
        assert!(TableType::new("").is_err());
        assert!(TableType::new("Mobile Plans").is_err());
    }

    #[test]
    fn table_type_serializes_as_plain_string() {
        let mut map = BTreeMap::new();
        map.insert(TableType::unclassified(), 1);
        let json = serde_json::to_string(&map).expect("serialize map");
        assert_eq!(json, r#"{"unclassified":1}"#);
    }
}
