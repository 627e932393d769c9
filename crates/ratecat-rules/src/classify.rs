//! Table classification against configured rules.

use std::cmp::Ordering;

use tracing::{debug, warn};

use ratecat_common::{contains_phrase, words};
use ratecat_config::{BusinessLineConfig, ConfigError, FieldConfig};
use ratecat_model::{
    CanonicalHeader, HeaderMatch, IssueCode, IssueScope, TableClassification, TableType,
    ValidationIssue,
};

use crate::error::{Result, RulesError};

#[derive(Debug, Clone)]
struct CompiledRule {
    table_type: TableType,
    patterns: Vec<String>,
    keywords: Vec<String>,
    required_columns: Vec<String>,
    rate_columns: Vec<String>,
}

/// Text a table is classified on.
#[derive(Debug, Clone, Copy)]
pub struct ClassificationInput<'a> {
    pub title: Option<&'a str>,
    pub header: &'a CanonicalHeader,
    /// Leading descriptions of the table, in row order.
    pub descriptions: &'a [String],
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassificationOutcome {
    pub classification: TableClassification,
    /// Header keys interpreted as rates for this table.
    pub rate_columns: Vec<String>,
    pub issues: Vec<ValidationIssue>,
}

/// A matching rule. Candidates rank by `required` alone; equal ranks fall
/// back to rule order and are reported.
struct Candidate<'r> {
    rule: &'r CompiledRule,
    required: usize,
    matched: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Classifier {
    rules: Vec<CompiledRule>,
    fields: FieldConfig,
    sample_rows: usize,
}

impl Classifier {
    /// Compiles the rules and rejects required columns that can never appear.
    pub fn new(config: &BusinessLineConfig) -> Result<Self> {
        let header_keys = config.header_keys();
        let mut rules = Vec::with_capacity(config.classification.rules.len());
        for rule in &config.classification.rules {
            for column in &rule.required_columns {
                if !header_keys.contains(column.as_str()) && !config.fields.is_field(column) {
                    return Err(RulesError::UnsatisfiableColumn {
                        table_type: rule.table_type.clone(),
                        column: column.clone(),
                    });
                }
            }
            let table_type = TableType::new(rule.table_type.as_str()).map_err(|_| {
                RulesError::Config(ConfigError::Invalid {
                    business_line: config.business_line.clone(),
                    message: format!("invalid table type {:?}", rule.table_type),
                })
            })?;
            rules.push(CompiledRule {
                table_type,
                patterns: rule.patterns.clone(),
                keywords: rule.keywords.clone(),
                required_columns: rule.required_columns.clone(),
                rate_columns: rule.rate_columns.clone(),
            });
        }
        Ok(Self {
            rules,
            fields: config.fields.clone(),
            sample_rows: config.classification.sample_rows,
        })
    }

    pub fn sample_rows(&self) -> usize {
        self.sample_rows
    }

    pub fn classify(&self, input: ClassificationInput<'_>) -> ClassificationOutcome {
        let text = classification_words(&input, self.sample_rows);

        let mut best: Option<Candidate<'_>> = None;
        let mut tied = Vec::new();
        for rule in &self.rules {
            let Some(candidate) = evaluate(rule, input.header, &text) else {
                continue;
            };
            debug!(
                table_type = %rule.table_type,
                required = candidate.required,
                "rule matched"
            );
            match best.as_ref().map(|b| candidate.required.cmp(&b.required)) {
                None | Some(Ordering::Greater) => {
                    tied.clear();
                    best = Some(candidate);
                }
                Some(Ordering::Equal) => tied.push(candidate.rule.table_type.to_string()),
                Some(Ordering::Less) => {}
            }
        }

        let Some(best) = best else {
            return self.unclassified(input.header);
        };

        let mut issues = Vec::new();
        if !tied.is_empty() {
            warn!(chosen = %best.rule.table_type, also = ?tied, "ambiguous classification");
            issues.push(
                ValidationIssue::new(
                    IssueCode::AmbiguousClassification,
                    IssueScope::Table,
                    format!(
                        "table also matches {}; using {} by rule order",
                        tied.join(", "),
                        best.rule.table_type
                    ),
                )
                .with_table_type(best.rule.table_type.to_string()),
            );
        }

        let rate_columns = if best.rule.rate_columns.is_empty() {
            self.open_rate_columns(input.header)
        } else {
            best.rule.rate_columns.clone()
        };
        ClassificationOutcome {
            classification: TableClassification {
                table_type: best.rule.table_type.clone(),
                matched_pattern: best.matched,
                matched_columns: best.rule.required_columns.clone(),
            },
            rate_columns,
            issues,
        }
    }

    fn unclassified(&self, header: &CanonicalHeader) -> ClassificationOutcome {
        warn!(columns = ?header.keys().collect::<Vec<_>>(), "table matches no rule");
        ClassificationOutcome {
            classification: TableClassification::unclassified(),
            rate_columns: self.open_rate_columns(header),
            issues: vec![
                ValidationIssue::new(
                    IssueCode::UnclassifiedTable,
                    IssueScope::Table,
                    "table matches no classification rule; kept as unclassified",
                )
                .with_table_type(TableType::UNCLASSIFIED),
            ],
        }
    }

    /// Every non-field column with a header of its own.
    fn open_rate_columns(&self, header: &CanonicalHeader) -> Vec<String> {
        header
            .columns()
            .iter()
            .filter(|column| column.matched != HeaderMatch::Blank)
            .filter(|column| !self.fields.is_field(&column.key))
            .map(|column| column.key.clone())
            .collect()
    }
}

fn classification_words(input: &ClassificationInput<'_>, sample_rows: usize) -> Vec<String> {
    let mut text = String::new();
    if let Some(title) = input.title {
        text.push_str(title);
        text.push(' ');
    }
    text.push_str(&input.header.raw_text());
    for description in input.descriptions.iter().take(sample_rows) {
        text.push(' ');
        text.push_str(description);
    }
    words(&text)
}

fn evaluate<'r>(
    rule: &'r CompiledRule,
    header: &CanonicalHeader,
    text: &[String],
) -> Option<Candidate<'r>> {
    if !rule.required_columns.iter().all(|column| header.contains(column)) {
        return None;
    }
    let mut matched = None;
    if !rule.patterns.is_empty() {
        let pattern = rule
            .patterns
            .iter()
            .find(|pattern| contains_phrase(text, pattern))?;
        matched = Some(pattern.clone());
    }
    if !rule.keywords.is_empty() {
        let keyword = rule
            .keywords
            .iter()
            .find(|keyword| contains_phrase(text, keyword))?;
        matched.get_or_insert_with(|| keyword.clone());
    }
    Some(Candidate {
        rule,
        required: rule.required_columns.len(),
        matched,
    })
}
