//! Tax and frequency normalization.

use std::collections::BTreeMap;

use ratecat_common::{normalize_label, slugify};
use ratecat_config::{FrequencyConfig, TaxConfig};
use ratecat_model::{TaxApplication, UNKNOWN_FREQUENCY};

#[derive(Debug, Clone)]
pub struct FieldNormalizer {
    tax: BTreeMap<String, bool>,
    frequency_aliases: BTreeMap<String, String>,
    frequency_values: Vec<String>,
}

impl FieldNormalizer {
    pub fn new(tax: &TaxConfig, frequencies: &FrequencyConfig) -> Self {
        Self {
            tax: tax
                .aliases
                .iter()
                .map(|(label, value)| (normalize_label(label), *value))
                .collect(),
            frequency_aliases: frequencies
                .aliases
                .iter()
                .map(|(label, value)| (normalize_label(label), value.clone()))
                .collect(),
            frequency_values: frequencies.values.clone(),
        }
    }

    /// `None` when the value is present but not a known tax label.
    pub fn tax(&self, raw: &str) -> Option<TaxApplication> {
        let label = normalize_label(raw);
        if label.is_empty() {
            return Some(TaxApplication::Unknown);
        }
        self.tax.get(&label).map(|value| TaxApplication::from(Some(*value)))
    }

    /// Maps a raw frequency to a configured value.
    ///
    /// Unknown labels fall back to their slug so the validator can report them.
    pub fn frequency(&self, raw: &str) -> String {
        let label = normalize_label(raw);
        if label.is_empty() {
            return UNKNOWN_FREQUENCY.to_string();
        }
        if let Some(value) = self.frequency_aliases.get(&label) {
            return value.clone();
        }
        let slug = slugify(raw);
        if slug.is_empty() {
            return UNKNOWN_FREQUENCY.to_string();
        }
        self.frequency_values
            .iter()
            .find(|value| **value == slug)
            .cloned()
            .unwrap_or(slug)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normalizer() -> FieldNormalizer {
        let mut tax = TaxConfig::default();
        tax.aliases.insert("No aplica".to_string(), false);
        let mut frequencies = FrequencyConfig::default();
        frequencies
            .aliases
            .insert("Por transacción".to_string(), "per_transaction".to_string());
        frequencies
            .aliases
            .insert("Mensual".to_string(), "monthly".to_string());
        FieldNormalizer::new(&tax, &frequencies)
    }

    #[test]
    fn tax_labels_are_tri_state() {
        let normalizer = normalizer();
        assert_eq!(normalizer.tax("Sí"), Some(TaxApplication::Yes));
        assert_eq!(normalizer.tax(" NO APLICA "), Some(TaxApplication::No));
        assert_eq!(normalizer.tax(""), Some(TaxApplication::Unknown));
        assert_eq!(normalizer.tax("Depende"), None);
    }

    #[test]
    fn frequencies_resolve_through_aliases() {
        let normalizer = normalizer();
        assert_eq!(normalizer.frequency("Por transaccion"), "per_transaction");
        assert_eq!(normalizer.frequency("MENSUAL"), "monthly");
        assert_eq!(normalizer.frequency("monthly"), "monthly");
        assert_eq!(normalizer.frequency(""), UNKNOWN_FREQUENCY);
        assert_eq!(normalizer.frequency("Cada semana"), "cada_semana");
    }
}
