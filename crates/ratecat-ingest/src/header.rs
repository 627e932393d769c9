//! Header normalization: raw header cells to canonical column keys.

use std::collections::BTreeMap;

use tracing::{debug, warn};

use ratecat_common::{UniqueNames, normalize_label, slugify};
use ratecat_model::{
    CanonicalHeader, CellValue, HeaderColumn, HeaderMatch, IssueCode, IssueScope, ValidationIssue,
};

/// Folded alias lookup built once per business line.
///
/// Each canonical key is also an alias of itself, so `g_zero` in a sheet
/// resolves without being listed.
#[derive(Debug, Clone, Default)]
pub struct HeaderAliases {
    lookup: BTreeMap<String, String>,
}

impl HeaderAliases {
    pub fn new(headers: &BTreeMap<String, Vec<String>>) -> Self {
        let mut lookup = BTreeMap::new();
        for key in headers.keys() {
            lookup
                .entry(normalize_label(key))
                .or_insert_with(|| key.clone());
        }
        for (key, aliases) in headers {
            for alias in aliases {
                let folded = normalize_label(alias);
                if let Some(existing) = lookup.get(&folded)
                    && existing != key
                {
                    debug!(alias = %alias, kept = %existing, ignored = %key, "alias defined twice");
                    continue;
                }
                lookup.insert(folded, key.clone());
            }
        }
        Self { lookup }
    }

    pub fn resolve(&self, raw: &str) -> Option<&str> {
        self.lookup.get(&normalize_label(raw)).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.lookup.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lookup.is_empty()
    }
}

/// Canonical header plus the duplicate-key warnings raised while building it.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedHeader {
    pub header: CanonicalHeader,
    pub issues: Vec<ValidationIssue>,
}

/// Maps the first `width` cells of a header row to unique canonical keys.
///
/// `row` is the header's grid row and is only used to locate issues.
pub fn normalize_header(
    cells: &[CellValue],
    width: usize,
    aliases: &HeaderAliases,
    row: usize,
) -> NormalizedHeader {
    let mut names = UniqueNames::new();
    let mut columns = Vec::with_capacity(width);
    let mut issues = Vec::new();

    for index in 0..width {
        let raw = cells.get(index).map(CellValue::display_text).unwrap_or_default();
        let (base, matched) = if raw.is_empty() {
            (format!("column_{index}"), HeaderMatch::Blank)
        } else if let Some(key) = aliases.resolve(&raw) {
            (key.to_string(), HeaderMatch::Recognized)
        } else {
            let slug = slugify(&raw);
            if slug.is_empty() {
                (format!("column_{index}"), HeaderMatch::Synthetic)
            } else {
                (slug, HeaderMatch::Synthetic)
            }
        };

        let (key, collided) = names.claim(&base);
        if collided {
            warn!(row, column = index, key = %base, renamed = %key, "duplicate header");
            issues.push(
                ValidationIssue::new(
                    IssueCode::DuplicateHeader,
                    IssueScope::Table,
                    format!("header {raw:?} maps to {base:?} again; kept as {key:?}"),
                )
                .with_column(key.clone())
                .with_row(row),
            );
        }
        columns.push(HeaderColumn {
            index,
            raw,
            key,
            matched,
        });
    }

    NormalizedHeader {
        header: CanonicalHeader::new(columns),
        issues,
    }
}
