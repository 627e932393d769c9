use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeaderMatch {
    /// Matched a configured alias.
    Recognized,
    /// Unknown label, key derived from its text.
    Synthetic,
    /// Blank cell, positional key.
    Blank,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderColumn {
    pub index: usize,
    pub raw: String,
    pub key: String,
    pub matched: HeaderMatch,
}

/// Ordered canonical column keys for one table; keys are unique.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalHeader {
    columns: Vec<HeaderColumn>,
}

impl CanonicalHeader {
    pub fn new(columns: Vec<HeaderColumn>) -> Self {
        Self { columns }
    }

    pub fn columns(&self) -> &[HeaderColumn] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn position(&self, key: &str) -> Option<usize> {
        self.columns.iter().position(|column| column.key == key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.position(key).is_some()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|column| column.key.as_str())
    }

    /// Raw header labels joined by spaces, blanks skipped.
    pub fn raw_text(&self) -> String {
        self.columns
            .iter()
            .map(|column| column.raw.trim())
            .filter(|raw| !raw.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}
