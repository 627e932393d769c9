//! Error types for grid ingestion.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while locating and reading input grids.
#[derive(Debug, Error)]
pub enum IngestError {
    /// Input path does not exist.
    #[error("input not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to read directory {path}: {source}")]
    DirectoryRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse CSV {path}: {source}")]
    CsvParse {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("failed to parse JSON workbook {path}: {source}")]
    JsonParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to read xlsx workbook {path}: {source}")]
    Workbook {
        path: PathBuf,
        #[source]
        source: calamine::XlsxError,
    },

    /// Extension is not `.csv`, `.json`, `.xlsx` or `.xlsm`.
    #[error("unsupported input format: {path} (expected .csv, .json or .xlsx)")]
    UnsupportedFormat { path: PathBuf },

    #[error("workbook has no sheets: {path}")]
    EmptyWorkbook { path: PathBuf },

    #[error("no .csv, .json or .xlsx inputs found")]
    NoInputs,
}

/// Result type for ingestion operations.
pub type Result<T> = std::result::Result<T, IngestError>;
