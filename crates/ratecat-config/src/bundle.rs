use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

use regex::Regex;
use serde::{Deserialize, Serialize};

use ratecat_common::normalize_label;
use ratecat_model::{IssueCode, Severity, TableType};

use crate::error::{ConfigError, Result};

fn default_document_type() -> String {
    "rates_and_fees".to_string()
}

/// Complete configuration for one business line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BusinessLineConfig {
    pub business_line: String,
    #[serde(default = "default_document_type")]
    pub document_type: String,
    #[serde(default)]
    pub detection: DetectionConfig,
    #[serde(default)]
    pub segmentation: SegmentationConfig,
    #[serde(default)]
    pub fields: FieldConfig,
    /// Canonical column key to raw header aliases.
    #[serde(default)]
    pub headers: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub classification: ClassificationConfig,
    #[serde(default)]
    pub rates: RateConfig,
    #[serde(default)]
    pub service_ids: ServiceIdConfig,
    #[serde(default)]
    pub frequencies: FrequencyConfig,
    #[serde(default)]
    pub tax: TaxConfig,
    #[serde(default)]
    pub validation: ValidationRules,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SegmentationConfig {
    pub min_header_cells: usize,
    /// Cells that must resolve to a canonical header key for a row to be a header.
    pub min_recognized_headers: usize,
    /// Share of a row's non-empty cells that must resolve to header keys.
    pub min_recognized_ratio: f64,
    /// Share of a seen header's cells a row must repeat to count as that header again.
    pub header_overlap_ratio: f64,
    /// Longest run of blank rows allowed inside one table.
    pub max_blank_gap: usize,
    /// Columns a row may gain or lose against its header before it closes the table.
    pub column_drift_tolerance: usize,
    pub min_data_rows: usize,
}

impl Default for SegmentationConfig {
    fn default() -> Self {
        Self {
            min_header_cells: 2,
            min_recognized_headers: 2,
            min_recognized_ratio: 0.5,
            header_overlap_ratio: 0.8,
            max_blank_gap: 1,
            column_drift_tolerance: 2,
            min_data_rows: 1,
        }
    }
}

/// Sheet and file name patterns that point at a business line.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DetectionConfig {
    /// Regexes matched against folded sheet names and the input file name.
    pub indicators: Vec<String>,
}

/// Canonical keys of the non-rate columns every service row may carry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FieldConfig {
    pub description: String,
    pub tax: Option<String>,
    pub frequency: Option<String>,
    pub disclaimer: Option<String>,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            description: "description".to_string(),
            tax: Some("applies_tax".to_string()),
            frequency: Some("frequency".to_string()),
            disclaimer: Some("disclaimer".to_string()),
        }
    }
}

impl FieldConfig {
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.description.as_str())
            .chain(self.tax.as_deref())
            .chain(self.frequency.as_deref())
            .chain(self.disclaimer.as_deref())
    }

    pub fn is_field(&self, key: &str) -> bool {
        self.keys().any(|field| field == key)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClassificationConfig {
    /// Number of leading descriptions added to the classification text.
    pub sample_rows: usize,
    /// Evaluated in order; order breaks score ties.
    pub rules: Vec<ClassificationRule>,
}

impl Default for ClassificationConfig {
    fn default() -> Self {
        Self {
            sample_rows: 3,
            rules: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClassificationRule {
    pub table_type: String,
    #[serde(default)]
    pub patterns: Vec<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub required_columns: Vec<String>,
    #[serde(default)]
    pub rate_columns: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LocaleProfile {
    pub thousands_separator: char,
    pub decimal_separator: char,
    #[serde(default)]
    pub currency_symbols: Vec<String>,
    /// Trailing units such as `%` or `E.A.`, stripped but never rendered.
    #[serde(default)]
    pub unit_suffixes: Vec<String>,
}

impl Default for LocaleProfile {
    fn default() -> Self {
        Self {
            thousands_separator: ',',
            decimal_separator: '.',
            currency_symbols: vec!["$".to_string()],
            unit_suffixes: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RateConfig {
    pub locale: LocaleProfile,
    pub unlimited_terms: Vec<String>,
    /// Whole-cell markers meaning "does not apply"; treated like an empty cell.
    pub not_applicable_terms: Vec<String>,
    pub unlimited_capable_columns: Vec<String>,
    /// Columns where free text is expected and `Unparsed` is not reported.
    pub unparsed_allowed_columns: Vec<String>,
    /// Regexes with named groups `included` and `cost`, tried in order.
    pub conditional_patterns: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServiceIdRule {
    pub pattern: String,
    pub fragment: String,
    /// Empty means the rule applies to every table type.
    #[serde(default)]
    pub table_types: Vec<String>,
}

impl ServiceIdRule {
    pub fn applies_to(&self, table_type: &str) -> bool {
        self.table_types.is_empty() || self.table_types.iter().any(|t| t == table_type)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServiceIdConfig {
    pub rules: Vec<ServiceIdRule>,
    /// Leading description words considered by the fallback.
    pub fallback_window: usize,
    pub fallback_words: usize,
    pub min_word_length: usize,
    pub max_length: usize,
}

impl Default for ServiceIdConfig {
    fn default() -> Self {
        Self {
            rules: Vec::new(),
            fallback_window: 3,
            fallback_words: 2,
            min_word_length: 3,
            max_length: 64,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FrequencyConfig {
    pub values: Vec<String>,
    /// Raw label to frequency value.
    pub aliases: BTreeMap<String, String>,
}

impl Default for FrequencyConfig {
    fn default() -> Self {
        Self {
            values: ["monthly", "per_transaction", "one_time", "yearly", "unknown"]
                .into_iter()
                .map(str::to_string)
                .collect(),
            aliases: BTreeMap::new(),
        }
    }
}

impl FrequencyConfig {
    pub fn is_valid(&self, value: &str) -> bool {
        self.values.iter().any(|known| known == value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TaxConfig {
    pub aliases: BTreeMap<String, bool>,
}

impl Default for TaxConfig {
    fn default() -> Self {
        let aliases = [("yes", true), ("no", false), ("si", true)]
            .into_iter()
            .map(|(label, value)| (label.to_string(), value))
            .collect();
        Self { aliases }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ValidationRules {
    pub required_fields: Vec<String>,
    pub min_description_length: usize,
    pub max_description_length: usize,
    pub severities: BTreeMap<IssueCode, Severity>,
}

impl Default for ValidationRules {
    fn default() -> Self {
        Self {
            required_fields: vec!["service_id".to_string(), "description".to_string()],
            min_description_length: 1,
            max_description_length: 200,
            severities: BTreeMap::new(),
        }
    }
}

impl ValidationRules {
    pub fn severity_for(&self, code: IssueCode) -> Severity {
        self.severities
            .get(&code)
            .copied()
            .unwrap_or_else(|| code.default_severity())
    }
}

impl BusinessLineConfig {
    /// Parses and validates a bundle. `origin` names the source in errors.
    pub fn from_toml_str(text: &str, origin: impl Into<PathBuf>) -> Result<Self> {
        let config: Self = toml::from_str(text).map_err(|source| ConfigError::Toml {
            path: origin.into(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn table_types(&self) -> impl Iterator<Item = &str> {
        self.classification
            .rules
            .iter()
            .map(|rule| rule.table_type.as_str())
    }

    pub fn rule_for(&self, table_type: &str) -> Option<&ClassificationRule> {
        self.classification
            .rules
            .iter()
            .find(|rule| rule.table_type == table_type)
    }

    /// Canonical keys the header normalizer can produce from configured aliases.
    pub fn header_keys(&self) -> BTreeSet<&str> {
        self.headers.keys().map(String::as_str).collect()
    }

    /// Checks internal consistency; every failure here is fatal before parsing starts.
    pub fn validate(&self) -> Result<()> {
        let line = self.business_line.as_str();
        if line.trim().is_empty() {
            return Err(ConfigError::invalid("<unnamed>", "business_line is empty"));
        }
        if self.fields.description.trim().is_empty() {
            return Err(ConfigError::invalid(line, "fields.description is empty"));
        }

        let segmentation = &self.segmentation;
        if !(0.0..=1.0).contains(&segmentation.header_overlap_ratio)
            || segmentation.header_overlap_ratio == 0.0
        {
            return Err(ConfigError::invalid(
                line,
                "segmentation.header_overlap_ratio must be in (0, 1]",
            ));
        }
        if segmentation.min_header_cells == 0 {
            return Err(ConfigError::invalid(
                line,
                "segmentation.min_header_cells must be at least 1",
            ));
        }
        if !(0.0..=1.0).contains(&segmentation.min_recognized_ratio) {
            return Err(ConfigError::invalid(
                line,
                "segmentation.min_recognized_ratio must be in [0, 1]",
            ));
        }

        for indicator in &self.detection.indicators {
            Regex::new(indicator).map_err(|source| ConfigError::InvalidPattern {
                business_line: line.to_string(),
                pattern: indicator.clone(),
                source: Box::new(source),
            })?;
        }

        for (key, aliases) in &self.headers {
            if normalize_label(key).is_empty() {
                return Err(ConfigError::invalid(line, "header key is empty"));
            }
            if aliases.iter().any(|alias| normalize_label(alias).is_empty()) {
                return Err(ConfigError::invalid(
                    line,
                    format!("header {key:?} has an empty alias"),
                ));
            }
        }

        let mut seen = BTreeSet::new();
        for rule in &self.classification.rules {
            if TableType::new(rule.table_type.as_str()).is_err() {
                return Err(ConfigError::invalid(
                    line,
                    format!("table type {:?} is not a lowercase identifier", rule.table_type),
                ));
            }
            if rule.table_type == TableType::UNCLASSIFIED {
                return Err(ConfigError::invalid(
                    line,
                    "table type \"unclassified\" is reserved",
                ));
            }
            if !seen.insert(rule.table_type.as_str()) {
                return Err(ConfigError::invalid(
                    line,
                    format!("table type {:?} has more than one rule", rule.table_type),
                ));
            }
        }

        self.validate_locale()?;
        for pattern in &self.rates.conditional_patterns {
            let regex = Regex::new(pattern).map_err(|source| ConfigError::InvalidPattern {
                business_line: line.to_string(),
                pattern: pattern.clone(),
                source: Box::new(source),
            })?;
            let names: BTreeSet<&str> = regex.capture_names().flatten().collect();
            if !names.contains("included") || !names.contains("cost") {
                return Err(ConfigError::invalid(
                    line,
                    format!("conditional pattern {pattern:?} needs groups `included` and `cost`"),
                ));
            }
        }

        for rule in &self.service_ids.rules {
            if ratecat_common::words(&rule.pattern).is_empty() {
                return Err(ConfigError::invalid(line, "service id rule has an empty pattern"));
            }
            if ratecat_common::slugify(&rule.fragment) != rule.fragment {
                return Err(ConfigError::invalid(
                    line,
                    format!("service id fragment {:?} is not a slug", rule.fragment),
                ));
            }
        }
        if self.service_ids.max_length == 0 {
            return Err(ConfigError::invalid(line, "service_ids.max_length must be positive"));
        }

        for (alias, value) in &self.frequencies.aliases {
            if !self.frequencies.is_valid(value) {
                return Err(ConfigError::invalid(
                    line,
                    format!("frequency alias {alias:?} maps to unknown value {value:?}"),
                ));
            }
        }

        let validation = &self.validation;
        if validation.min_description_length > validation.max_description_length {
            return Err(ConfigError::invalid(
                line,
                "validation.min_description_length exceeds max_description_length",
            ));
        }
        Ok(())
    }

    fn validate_locale(&self) -> Result<()> {
        let locale = &self.rates.locale;
        let fail = |message: String| ConfigError::InvalidLocale {
            business_line: self.business_line.clone(),
            message,
        };
        if locale.thousands_separator == locale.decimal_separator {
            return Err(fail(format!(
                "thousands and decimal separator are both {:?}",
                locale.decimal_separator
            )));
        }
        for separator in [locale.thousands_separator, locale.decimal_separator] {
            if separator.is_alphanumeric() {
                return Err(fail(format!("separator {separator:?} is alphanumeric")));
            }
        }
        for symbol in locale.currency_symbols.iter().chain(&locale.unit_suffixes) {
            if symbol.trim().is_empty() {
                return Err(fail("empty currency symbol or unit".to_string()));
            }
            if symbol.contains(locale.decimal_separator) || symbol.chars().any(|c| c.is_ascii_digit())
            {
                return Err(fail(format!("currency symbol {symbol:?} overlaps number syntax")));
            }
        }
        Ok(())
    }
}
