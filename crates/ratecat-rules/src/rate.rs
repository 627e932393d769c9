//! Rate cell interpretation.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;
use tracing::trace;

use ratecat_common::{contains_phrase, fold_text, words};
use ratecat_config::{ConfigError, LocaleProfile, RateConfig};
use ratecat_model::{CellValue, IssueCode, IssueScope, RateSpec, ValidationIssue};

use crate::numeric::parse_amount;

/// A run of digits with embedded separators, e.g. `7.510` or `8,50`.
static AMOUNT_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d(?:[\d.,]*\d)?").expect("Invalid amount token regex"));

/// A parsed rate plus the warning raised when the cell could not be interpreted.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedRate {
    pub rate: RateSpec,
    pub issue: Option<ValidationIssue>,
}

impl ParsedRate {
    fn clean(rate: RateSpec) -> Self {
        Self { rate, issue: None }
    }
}

/// Compiled rate vocabulary for one business line.
///
/// First match wins, in this order: empty or not-applicable marker,
/// unlimited keyword, conditional pattern, single amount, fallback.
#[derive(Debug, Clone)]
pub struct RateParser {
    locale: LocaleProfile,
    unlimited_terms: Vec<String>,
    not_applicable_terms: BTreeSet<String>,
    unlimited_capable: BTreeSet<String>,
    conditional: Vec<Regex>,
}

impl RateParser {
    pub fn from_config(config: &RateConfig, business_line: &str) -> Result<Self, ConfigError> {
        let conditional = config
            .conditional_patterns
            .iter()
            .map(|pattern| {
                Regex::new(pattern).map_err(|source| ConfigError::InvalidPattern {
                    business_line: business_line.to_string(),
                    pattern: pattern.clone(),
                    source: Box::new(source),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            locale: config.locale.clone(),
            unlimited_terms: config
                .unlimited_terms
                .iter()
                .map(|term| fold_text(term))
                .filter(|term| !term.is_empty())
                .collect(),
            not_applicable_terms: config
                .not_applicable_terms
                .iter()
                .map(|term| fold_text(term))
                .collect(),
            unlimited_capable: config.unlimited_capable_columns.iter().cloned().collect(),
            conditional,
        })
    }

    pub fn locale(&self) -> &LocaleProfile {
        &self.locale
    }

    pub fn parse_amount(&self, text: &str) -> Option<f64> {
        parse_amount(text, &self.locale)
    }

    /// Interprets one rate cell found under `column`.
    pub fn parse(&self, cell: &CellValue, column: &str) -> ParsedRate {
        if let CellValue::Number(value) = cell {
            return ParsedRate::clean(RateSpec::Fixed { value: *value });
        }
        let raw = cell.display_text();
        let folded = fold_text(&raw);

        if folded.is_empty() || self.not_applicable_terms.contains(&folded) {
            if self.unlimited_capable.contains(column) {
                return ParsedRate::clean(RateSpec::Unlimited {});
            }
            return ParsedRate {
                rate: RateSpec::Unparsed { raw: raw.clone() },
                issue: Some(
                    ValidationIssue::new(
                        IssueCode::EmptyRate,
                        IssueScope::Service,
                        if raw.is_empty() {
                            "rate cell is empty".to_string()
                        } else {
                            format!("rate cell {raw:?} marks the rate as not applicable")
                        },
                    )
                    .with_column(column),
                ),
            };
        }

        // Cells with amounts go on to the conditional step even if they say "incluidas".
        if !folded.chars().any(|ch| ch.is_ascii_digit()) {
            let cell_words = words(&folded);
            if self
                .unlimited_terms
                .iter()
                .any(|term| contains_phrase(&cell_words, term))
            {
                return ParsedRate::clean(RateSpec::Unlimited {});
            }
        }

        if let Some(rate) = self.match_conditional(&folded) {
            return ParsedRate::clean(rate);
        }

        if let Some(value) = self.single_amount(&folded) {
            return ParsedRate::clean(RateSpec::Fixed { value });
        }

        trace!(column, raw = %raw, "rate left unparsed");
        ParsedRate {
            rate: RateSpec::Unparsed { raw: raw.clone() },
            issue: Some(
                ValidationIssue::new(
                    IssueCode::UnparsedRate,
                    IssueScope::Service,
                    format!("rate {raw:?} could not be interpreted"),
                )
                .with_column(column),
            ),
        }
    }

    /// The cell's only amount, allowing words around it (`$7.510 por transacción`).
    fn single_amount(&self, folded: &str) -> Option<f64> {
        if let Some(value) = self.parse_amount(folded) {
            return Some(value);
        }
        let mut tokens = AMOUNT_TOKEN.find_iter(folded);
        let token = tokens.next()?;
        if tokens.next().is_some() {
            return None;
        }
        self.parse_amount(token.as_str())
    }

    fn match_conditional(&self, folded: &str) -> Option<RateSpec> {
        self.conditional.iter().find_map(|pattern| {
            let captures = pattern.captures(folded)?;
            let included_free = captures.name("included")?.as_str().parse::<u32>().ok()?;
            let additional_cost = self.parse_amount(captures.name("cost")?.as_str())?;
            Some(RateSpec::Conditional {
                included_free,
                additional_cost,
            })
        })
    }
}
