//! Rate catalog pipeline.
//!
//! Sequences segmentation, header normalization, classification, row
//! interpretation and validation over the sheets of one document. The crate
//! performs no I/O: callers hand in [`RawGrid`](ratecat_model::RawGrid)s and
//! receive a [`Catalog`](ratecat_model::Catalog) or a fatal [`PipelineError`].

#![deny(unsafe_code)]

pub mod context;
pub mod error;
pub mod pipeline;
mod rows;

pub use context::PipelineContext;
pub use error::{PipelineError, Result, Stage, StructuralError};
pub use pipeline::{DocumentOptions, DocumentOutput, document_id, process_document};
