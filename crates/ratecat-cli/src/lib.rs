//! CLI library components for the rate catalog tool.

pub mod artifacts;
pub mod logging;
