//! Business rules applied to segmented tables.
//!
//! All rules are driven by a [`BusinessLineConfig`](ratecat_config::BusinessLineConfig);
//! nothing here knows about a particular product line.

#![deny(unsafe_code)]

pub mod classify;
pub mod error;
pub mod fields;
pub mod numeric;
pub mod rate;
pub mod service_id;

pub use classify::{ClassificationInput, ClassificationOutcome, Classifier};
pub use error::{Result, RulesError};
pub use fields::FieldNormalizer;
pub use numeric::{format_amount, parse_amount};
pub use rate::{ParsedRate, RateParser};
pub use service_id::{ServiceIdAllocator, ServiceIdGenerator, UNKNOWN_SERVICE};
