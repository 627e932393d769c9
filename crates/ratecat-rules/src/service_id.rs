//! Stable service identifiers derived from description text.

use tracing::warn;

use ratecat_common::{UniqueNames, contains_phrase, words};
use ratecat_config::ServiceIdConfig;
use ratecat_model::{IssueCode, IssueScope, ValidationIssue};

pub const UNKNOWN_SERVICE: &str = "unknown_service";

#[derive(Debug, Clone)]
pub struct ServiceIdGenerator {
    config: ServiceIdConfig,
}

impl ServiceIdGenerator {
    pub fn new(config: &ServiceIdConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    /// Identifier before collision handling. Deterministic for a given description.
    ///
    /// Fragments of every matching rule are joined in rule order; without a
    /// match the first meaningful description words are used.
    pub fn base_id(&self, description: &str, table_type: &str) -> String {
        let description_words = words(description);
        let mut fragments: Vec<&str> = Vec::new();
        for rule in &self.config.rules {
            if !rule.applies_to(table_type) || fragments.contains(&rule.fragment.as_str()) {
                continue;
            }
            if contains_phrase(&description_words, &rule.pattern) {
                fragments.push(&rule.fragment);
            }
        }

        let id = if fragments.is_empty() {
            self.fallback(&description_words)
        } else {
            fragments.join("_")
        };
        self.truncate(id)
    }

    fn fallback(&self, description_words: &[String]) -> String {
        let meaningful: Vec<&str> = description_words
            .iter()
            .take(self.config.fallback_window)
            .filter(|word| word.chars().count() >= self.config.min_word_length)
            .take(self.config.fallback_words)
            .map(String::as_str)
            .collect();
        if meaningful.is_empty() {
            UNKNOWN_SERVICE.to_string()
        } else {
            meaningful.join("_")
        }
    }

    fn truncate(&self, id: String) -> String {
        if id.chars().count() <= self.config.max_length {
            return id;
        }
        let cut: String = id.chars().take(self.config.max_length).collect();
        cut.trim_end_matches('_').to_string()
    }
}

/// Keeps identifiers unique within one catalog table, in row order.
#[derive(Debug, Clone, Default)]
pub struct ServiceIdAllocator {
    names: UniqueNames,
}

impl ServiceIdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the final identifier and a warning when `base` was already taken.
    pub fn allocate(&mut self, base: &str) -> (String, Option<ValidationIssue>) {
        let (id, collided) = self.names.claim(base);
        if !collided {
            return (id, None);
        }
        warn!(base, renamed = %id, "service id collision");
        let issue = ValidationIssue::new(
            IssueCode::ServiceIdCollision,
            IssueScope::Service,
            format!("service id {base:?} already used in this table; renamed to {id:?}"),
        )
        .with_service(id.clone());
        (id, Some(issue))
    }
}
