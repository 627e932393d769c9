//! Grid ingestion for the rate catalog engine.
//!
//! - **Readers**: CSV sheets, JSON workbooks and xlsx workbooks into [`RawGrid`](ratecat_model::RawGrid)s
//! - **Segmentation**: split a grid into table regions
//! - **Header normalization**: map raw header text to canonical column keys

#![deny(unsafe_code)]

mod error;
mod header;
mod reader;
mod segment;

// === Error Types ===
pub use error::{IngestError, Result};

// === Readers ===
pub use reader::{
    InputFormat, discover_inputs, read_csv_grid, read_grids, read_json_workbook, read_xlsx_grids,
};

// === Segmentation ===
pub use segment::{Segmentation, SegmentationRules, segment_grid};

// === Headers ===
pub use header::{HeaderAliases, NormalizedHeader, normalize_header};
