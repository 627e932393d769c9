//! Warnings and errors attached to a catalog.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

impl Severity {
    pub fn label(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warning => "warning",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueScope {
    Document,
    Table,
    Service,
}

/// Machine-readable issue kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueCode {
    // Segmentation
    NoHeaderDetected,
    StrayRows,
    UndersizedTable,
    // Header normalization
    DuplicateHeader,
    // Classification
    AmbiguousClassification,
    UnclassifiedTable,
    // Row interpretation
    RowWithoutDescription,
    UnrecognizedTaxValue,
    EmptyRate,
    UnparsedRate,
    ServiceIdCollision,
    // Catalog validation
    MissingRequiredField,
    InvalidFrequency,
    RateNotInterpreted,
    DescriptionTooShort,
    DescriptionTooLong,
    DuplicateServiceId,
    MissingRateColumn,
    UnexpectedRateColumn,
    EmptyCatalog,
}

impl IssueCode {
    pub const ALL: [IssueCode; 20] = [
        Self::NoHeaderDetected,
        Self::StrayRows,
        Self::UndersizedTable,
        Self::DuplicateHeader,
        Self::AmbiguousClassification,
        Self::UnclassifiedTable,
        Self::RowWithoutDescription,
        Self::UnrecognizedTaxValue,
        Self::EmptyRate,
        Self::UnparsedRate,
        Self::ServiceIdCollision,
        Self::MissingRequiredField,
        Self::InvalidFrequency,
        Self::RateNotInterpreted,
        Self::DescriptionTooShort,
        Self::DescriptionTooLong,
        Self::DuplicateServiceId,
        Self::MissingRateColumn,
        Self::UnexpectedRateColumn,
        Self::EmptyCatalog,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::NoHeaderDetected => "no_header_detected",
            Self::StrayRows => "stray_rows",
            Self::UndersizedTable => "undersized_table",
            Self::DuplicateHeader => "duplicate_header",
            Self::AmbiguousClassification => "ambiguous_classification",
            Self::UnclassifiedTable => "unclassified_table",
            Self::RowWithoutDescription => "row_without_description",
            Self::UnrecognizedTaxValue => "unrecognized_tax_value",
            Self::EmptyRate => "empty_rate",
            Self::UnparsedRate => "unparsed_rate",
            Self::ServiceIdCollision => "service_id_collision",
            Self::MissingRequiredField => "missing_required_field",
            Self::InvalidFrequency => "invalid_frequency",
            Self::RateNotInterpreted => "rate_not_interpreted",
            Self::DescriptionTooShort => "description_too_short",
            Self::DescriptionTooLong => "description_too_long",
            Self::DuplicateServiceId => "duplicate_service_id",
            Self::MissingRateColumn => "missing_rate_column",
            Self::UnexpectedRateColumn => "unexpected_rate_column",
            Self::EmptyCatalog => "empty_catalog",
        }
    }

    /// Severity used unless the business line overrides it.
    pub fn default_severity(self) -> Severity {
        match self {
            Self::MissingRequiredField
            | Self::InvalidFrequency
            | Self::DescriptionTooLong
            | Self::DuplicateServiceId
            | Self::EmptyCatalog => Severity::Error,
            _ => Severity::Warning,
        }
    }
}

impl fmt::Display for IssueCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single finding, located as precisely as the producing stage knows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub severity: Severity,
    pub scope: IssueScope,
    pub code: IssueCode,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sheet: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub row: Option<usize>,
}

impl ValidationIssue {
    pub fn new(code: IssueCode, scope: IssueScope, message: impl Into<String>) -> Self {
        Self {
            severity: code.default_severity(),
            scope,
            code,
            message: message.into(),
            sheet: None,
            table_type: None,
            service_id: None,
            column: None,
            row: None,
        }
    }

    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    pub fn with_sheet(mut self, sheet: impl Into<String>) -> Self {
        self.sheet = Some(sheet.into());
        self
    }

    pub fn with_table_type(mut self, table_type: impl Into<String>) -> Self {
        self.table_type = Some(table_type.into());
        self
    }

    pub fn with_service(mut self, service_id: impl Into<String>) -> Self {
        self.service_id = Some(service_id.into());
        self
    }

    pub fn with_column(mut self, column: impl Into<String>) -> Self {
        self.column = Some(column.into());
        self
    }

    pub fn with_row(mut self, row: usize) -> Self {
        self.row = Some(row);
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    /// Short location string for summaries, e.g. `Tarifas:12 [transfers/transfer]`.
    pub fn location(&self) -> String {
        let mut parts = Vec::new();
        match (&self.sheet, self.row) {
            (Some(sheet), Some(row)) => parts.push(format!("{sheet}:{}", row + 1)),
            (Some(sheet), None) => parts.push(sheet.clone()),
            (None, Some(row)) => parts.push(format!("row {}", row + 1)),
            (None, None) => {}
        }
        match (&self.table_type, &self.service_id) {
            (Some(table), Some(service)) => parts.push(format!("[{table}/{service}]")),
            (Some(table), None) => parts.push(format!("[{table}]")),
            (None, Some(service)) => parts.push(format!("[{service}]")),
            (None, None) => {}
        }
        if let Some(column) = &self.column {
            parts.push(format!("column {column}"));
        }
        parts.join(" ")
    }
}
