//! Grid segmentation: finding where one logical table ends and the next begins.
//!
//! A sheet is scanned top to bottom. A region boundary is opened by
//!
//! - a header row, either header-shaped or a repeat of a header already seen,
//! - the first non-empty row after more than `max_blank_gap` blank rows,
//! - a row whose width differs from the current header by more than
//!   `column_drift_tolerance` columns.
//!
//! A row is header-shaped when it carries no amount and enough of its cells
//! are known header aliases. Every row of the grid ends up in exactly one region.

use std::collections::BTreeSet;

use tracing::{debug, warn};

use ratecat_common::fold_text;
use ratecat_config::{LocaleProfile, SegmentationConfig};
use ratecat_model::{
    CellValue, IssueCode, IssueScope, RawGrid, RegionKind, SheetSegments, TableRegion,
    ValidationIssue,
};

use crate::header::HeaderAliases;

/// Business-line vocabulary the segmenter reads rows with.
#[derive(Debug, Clone, Copy)]
pub struct SegmentationRules<'a> {
    pub config: &'a SegmentationConfig,
    /// Header vocabulary; a row is a header when enough cells resolve here.
    pub aliases: &'a HeaderAliases,
    /// Currency symbols and separators that mark a cell as an amount.
    pub locale: &'a LocaleProfile,
}

/// Regions of one sheet plus the issues raised while finding them.
#[derive(Debug, Clone, PartialEq)]
pub struct Segmentation {
    pub segments: SheetSegments,
    pub issues: Vec<ValidationIssue>,
}

impl Segmentation {
    pub fn usable_tables(&self) -> impl Iterator<Item = &TableRegion> {
        self.segments.regions.iter().filter(|region| region.is_table())
    }
}

/// Splits `grid` into ordered, non-overlapping regions covering every row.
pub fn segment_grid(grid: &RawGrid, rules: SegmentationRules<'_>) -> Segmentation {
    let config = rules.config;
    let detector = HeaderDetector::new(rules);
    let row_count = grid.row_count();
    let mut starts = find_region_starts(grid, config, &detector);

    let mut issues = Vec::new();
    let mut regions = if starts.iter().all(|(_, header)| header.is_none()) {
        whole_sheet_region(grid, &mut issues)
    } else {
        let leading = starts.first().map_or(0, |(start, _)| *start);
        if leading > 0 {
            // Leading blank rows fold into the first region instead of forming an empty one.
            if (0..leading).all(|row| grid.is_blank_row(row)) {
                starts[0].0 = 0;
            } else {
                starts.insert(0, (0, None));
            }
        }
        build_regions(grid, &starts)
    };

    classify_regions(grid, config, &mut regions, &mut issues);

    debug!(
        sheet = %grid.sheet,
        rows = row_count,
        regions = regions.len(),
        tables = regions.iter().filter(|r| r.is_table()).count(),
        "segmented sheet"
    );

    Segmentation {
        segments: SheetSegments {
            sheet: grid.sheet.clone(),
            row_count,
            regions,
        },
        issues: issues
            .into_iter()
            .map(|issue| issue.with_sheet(grid.sheet.clone()))
            .collect(),
    }
}

/// First pass: the start row of every region and, for tables, its header row.
fn find_region_starts(
    grid: &RawGrid,
    config: &SegmentationConfig,
    detector: &HeaderDetector,
) -> Vec<(usize, Option<usize>)> {
    let mut starts: Vec<(usize, Option<usize>)> = Vec::new();
    let mut seen_headers: Vec<BTreeSet<String>> = Vec::new();
    let mut header_width: Option<usize> = None;
    let mut blank_run = 0usize;

    for row in 0..grid.row_count() {
        if grid.is_blank_row(row) {
            blank_run += 1;
            continue;
        }
        let after_gap = blank_run > config.max_blank_gap;
        blank_run = 0;

        let cells = grid.row(row);
        if detector.is_header_shaped(cells) || detector.repeats_header(cells, &seen_headers) {
            debug!(sheet = %grid.sheet, row, "header row");
            starts.push((row, Some(row)));
            seen_headers.push(header_signature(cells));
            header_width = Some(grid.occupied_span(row));
            continue;
        }

        match header_width {
            Some(width) => {
                let span = grid.occupied_span(row);
                let filled = cells.iter().filter(|cell| !cell.is_empty()).count();
                // Single-cell rows are captions or notes, never narrowing drift.
                let widened = span > width + config.column_drift_tolerance;
                let narrowed = filled > 1 && span + config.column_drift_tolerance < width;
                let drift = widened || narrowed;
                if after_gap || drift {
                    debug!(sheet = %grid.sheet, row, after_gap, drift, "table closed");
                    starts.push((row, None));
                    header_width = None;
                }
            }
            None => {
                if starts.is_empty() {
                    starts.push((row, None));
                }
            }
        }
    }
    starts
}

fn build_regions(grid: &RawGrid, starts: &[(usize, Option<usize>)]) -> Vec<TableRegion> {
    let row_count = grid.row_count();
    let mut regions: Vec<TableRegion> = starts
        .iter()
        .enumerate()
        .map(|(index, &(start_row, header_row))| {
            let end_row = starts.get(index + 1).map_or(row_count, |next| next.0);
            let column_count = match header_row {
                Some(header) => grid.occupied_span(header),
                None => (start_row..end_row)
                    .map(|row| grid.occupied_span(row))
                    .max()
                    .unwrap_or(0),
            };
            TableRegion {
                index,
                start_row,
                end_row,
                header_row,
                data_end: end_row,
                column_count,
                title: None,
                kind: if header_row.is_some() {
                    RegionKind::Table
                } else {
                    RegionKind::Stray
                },
            }
        })
        .collect();

    let mut claimed: Vec<Option<usize>> = vec![None; regions.len()];
    for index in 1..regions.len() {
        let Some(header) = regions[index].header_row else {
            continue;
        };
        let previous = &regions[index - 1];
        if let Some(title_row) = title_above(grid, previous, header) {
            regions[index].title = first_text(grid.row(title_row));
            claimed[index - 1] = Some(title_row);
        }
    }

    for (region, title_row) in regions.iter_mut().zip(claimed) {
        let content_start = region.header_row.map_or(region.start_row, |header| header + 1);
        let content_end = title_row.unwrap_or(region.end_row);
        region.data_end = (content_start..content_end)
            .rev()
            .find(|row| !grid.is_blank_row(*row))
            .map_or(content_start, |row| row + 1);
    }
    regions
}

/// The caption line directly above a header, separated from it only by blank rows.
fn title_above(grid: &RawGrid, previous: &TableRegion, header: usize) -> Option<usize> {
    let candidate = (previous.start_row..header)
        .rev()
        .find(|row| !grid.is_blank_row(*row))?;
    if previous.header_row == Some(candidate) {
        return None;
    }
    let cells = grid.row(candidate);
    let mut non_empty = cells.iter().filter(|cell| !cell.is_empty());
    match (non_empty.next(), non_empty.next()) {
        (Some(CellValue::Text(_)), None) => Some(candidate),
        _ => None,
    }
}

/// Fallback when no row looks like a header: one table headed by the first non-empty row.
fn whole_sheet_region(grid: &RawGrid, issues: &mut Vec<ValidationIssue>) -> Vec<TableRegion> {
    let row_count = grid.row_count();
    if row_count == 0 {
        return Vec::new();
    }
    let first = (0..row_count).find(|row| !grid.is_blank_row(*row));
    let Some(header) = first else {
        return vec![TableRegion {
            index: 0,
            start_row: 0,
            end_row: row_count,
            header_row: None,
            data_end: 0,
            column_count: 0,
            title: None,
            kind: RegionKind::Stray,
        }];
    };

    warn!(sheet = %grid.sheet, header, "no header detected, using first non-empty row");
    issues.push(
        ValidationIssue::new(
            IssueCode::NoHeaderDetected,
            IssueScope::Table,
            "no header row detected; the first non-empty row is used as header",
        )
        .with_row(header),
    );

    let data_end = (header + 1..row_count)
        .rev()
        .find(|row| !grid.is_blank_row(*row))
        .map_or(header + 1, |row| row + 1);
    let column_count = (0..row_count)
        .map(|row| grid.occupied_span(row))
        .max()
        .unwrap_or(0);
    vec![TableRegion {
        index: 0,
        start_row: 0,
        end_row: row_count,
        header_row: Some(header),
        data_end,
        column_count,
        title: None,
        kind: RegionKind::Table,
    }]
}

/// Marks undersized tables and reports stray content.
fn classify_regions(
    grid: &RawGrid,
    config: &SegmentationConfig,
    regions: &mut [TableRegion],
    issues: &mut Vec<ValidationIssue>,
) {
    for index in 0..regions.len() {
        let next_has_title = regions
            .get(index + 1)
            .is_some_and(|next| next.title.is_some());
        let region = &mut regions[index];
        match region.header_row {
            Some(header) => {
                let data_rows = region
                    .data_rows()
                    .filter(|row| !grid.is_blank_row(*row))
                    .count();
                if data_rows < config.min_data_rows {
                    region.kind = RegionKind::Undersized;
                    warn!(
                        sheet = %grid.sheet,
                        header,
                        data_rows,
                        min = config.min_data_rows,
                        "undersized table dropped"
                    );
                    issues.push(
                        ValidationIssue::new(
                            IssueCode::UndersizedTable,
                            IssueScope::Table,
                            format!(
                                "table at row {} has {data_rows} data row(s), fewer than {}",
                                header + 1,
                                config.min_data_rows
                            ),
                        )
                        .with_row(header),
                    );
                }
            }
            None => {
                let content_end = if next_has_title {
                    region.data_end
                } else {
                    region.end_row
                };
                let stray_rows = (region.start_row..content_end)
                    .filter(|row| !grid.is_blank_row(*row))
                    .count();
                if stray_rows > 0 {
                    warn!(
                        sheet = %grid.sheet,
                        start = region.start_row,
                        stray_rows,
                        "rows outside any table"
                    );
                    issues.push(
                        ValidationIssue::new(
                            IssueCode::StrayRows,
                            IssueScope::Table,
                            format!(
                                "{stray_rows} row(s) starting at row {} belong to no table",
                                region.start_row + 1
                            ),
                        )
                        .with_row(region.start_row),
                    );
                }
            }
        }
    }
}

fn first_text(cells: &[CellValue]) -> Option<String> {
    cells
        .iter()
        .find(|cell| !cell.is_empty())
        .map(CellValue::display_text)
}

/// Folded non-empty cells, used to recognise a repeated header.
fn header_signature(cells: &[CellValue]) -> BTreeSet<String> {
    cells
        .iter()
        .filter(|cell| !cell.is_empty())
        .map(|cell| fold_text(&cell.display_text()))
        .collect()
}

/// Locale-aware test for cells that hold or mention an amount.
struct AmountDetector {
    symbols: Vec<String>,
    separators: [char; 2],
}

impl AmountDetector {
    fn new(locale: &LocaleProfile) -> Self {
        let mut symbols: Vec<String> = locale
            .currency_symbols
            .iter()
            .chain(&locale.unit_suffixes)
            .map(|symbol| fold_text(symbol))
            .filter(|symbol| !symbol.is_empty())
            .collect();
        symbols.sort_by_key(|symbol| std::cmp::Reverse(symbol.len()));
        Self {
            symbols,
            separators: [locale.thousands_separator, locale.decimal_separator],
        }
    }

    /// True for numeric cells, bare amounts like `8.990 COP`, and text with a
    /// currency-decorated amount inside, like `hasta $2.000`.
    fn carries_amount(&self, cell: &CellValue) -> bool {
        let text = match cell {
            CellValue::Number(_) => return true,
            CellValue::Empty => return false,
            CellValue::Text(text) => fold_text(text),
        };
        self.is_bare_amount(&text) || self.has_decorated_amount(&text)
    }

    fn is_bare_amount(&self, text: &str) -> bool {
        let mut rest = text.to_string();
        for symbol in &self.symbols {
            rest = rest.replace(symbol.as_str(), " ");
        }
        rest.chars().any(|ch| ch.is_ascii_digit())
            && rest.chars().all(|ch| {
                ch.is_ascii_digit()
                    || ch.is_whitespace()
                    || "+-".contains(ch)
                    || self.separators.contains(&ch)
            })
    }

    fn has_decorated_amount(&self, text: &str) -> bool {
        self.symbols.iter().any(|symbol| {
            text.match_indices(symbol.as_str()).any(|(at, found)| {
                let after = text[at + found.len()..].trim_start().chars().next();
                let before = text[..at].trim_end().chars().next_back();
                after.is_some_and(|ch| ch.is_ascii_digit())
                    || before.is_some_and(|ch| ch.is_ascii_digit())
            })
        })
    }
}

struct HeaderDetector<'a> {
    config: &'a SegmentationConfig,
    aliases: &'a HeaderAliases,
    amounts: AmountDetector,
}

impl<'a> HeaderDetector<'a> {
    fn new(rules: SegmentationRules<'a>) -> Self {
        Self {
            config: rules.config,
            aliases: rules.aliases,
            amounts: AmountDetector::new(rules.locale),
        }
    }

    fn text_only(&self, cells: &[CellValue]) -> bool {
        let non_empty = cells.iter().filter(|cell| !cell.is_empty()).count();
        non_empty >= self.config.min_header_cells
            && !cells.iter().any(|cell| self.amounts.carries_amount(cell))
    }

    /// Text-only rows whose cells are mostly known header aliases.
    ///
    /// Free text that merely mentions header words ("Cambio de plan",
    /// "No aplica") resolves to nothing and stays data.
    fn is_header_shaped(&self, cells: &[CellValue]) -> bool {
        if !self.text_only(cells) {
            return false;
        }
        if self.aliases.is_empty() {
            return true;
        }
        let texts: Vec<String> = cells
            .iter()
            .filter(|cell| !cell.is_empty())
            .map(CellValue::display_text)
            .collect();
        let recognized = texts
            .iter()
            .filter(|text| self.aliases.resolve(text).is_some())
            .count();
        recognized >= self.config.min_recognized_headers
            && recognized as f64 >= self.config.min_recognized_ratio * texts.len() as f64
    }

    fn repeats_header(&self, cells: &[CellValue], seen: &[BTreeSet<String>]) -> bool {
        if seen.is_empty() || !self.text_only(cells) {
            return false;
        }
        let signature = header_signature(cells);
        seen.iter().any(|header| {
            let shared = header.intersection(&signature).count();
            !header.is_empty()
                && shared as f64 / header.len() as f64 >= self.config.header_overlap_ratio
        })
    }
}
