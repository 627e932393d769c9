//! Shared utilities for ratecat crates.
//!
//! Text folding here is the single definition of "case-insensitive,
//! accent-insensitive, whitespace-collapsed" used by header matching,
//! classification, rate vocabularies and identifier rules.

#![deny(unsafe_code)]

pub mod hash;
pub mod text;
pub mod unique;

pub use hash::sha256_hex;
pub use text::{contains_phrase, fold_text, normalize_label, slugify, words};
pub use unique::UniqueNames;
