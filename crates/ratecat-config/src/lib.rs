//! Business-line configuration for the rate catalog engine.
//!
//! Everything that differs between product lines (header vocabulary,
//! classification rules, rate vocabulary and locale, identifier rules,
//! validation thresholds) lives in a TOML bundle. The core never branches on
//! the business line name.

#![deny(unsafe_code)]

pub mod bundle;
pub mod error;
pub mod registry;

pub use bundle::{
    BusinessLineConfig, ClassificationConfig, ClassificationRule, DetectionConfig, FieldConfig,
    FrequencyConfig, LocaleProfile, RateConfig, SegmentationConfig, ServiceIdConfig, ServiceIdRule, TaxConfig,
    ValidationRules,
};
pub use error::{ConfigError, Result};
pub use registry::{
    CONFIG_DIR_ENV_VAR, ConfigRegistry, DEFAULT_BUSINESS_LINE, default_config_dir,
};
