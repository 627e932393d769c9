use std::ops::Range;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegionKind {
    /// Header plus enough data rows to interpret.
    Table,
    /// Header found, but fewer data rows than the configured minimum.
    Undersized,
    /// Rows that belong to no header.
    Stray,
}

/// A contiguous band of rows in one sheet.
///
/// `start_row..end_row` is the full span the region owns. Data rows run from
/// the row after the header up to `data_end`; rows between `data_end` and
/// `end_row` hold the title of the next table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableRegion {
    pub index: usize,
    pub start_row: usize,
    pub end_row: usize,
    pub header_row: Option<usize>,
    pub data_end: usize,
    pub column_count: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub kind: RegionKind,
}

impl TableRegion {
    pub fn row_count(&self) -> usize {
        self.end_row.saturating_sub(self.start_row)
    }

    pub fn contains_row(&self, row: usize) -> bool {
        (self.start_row..self.end_row).contains(&row)
    }

    pub fn data_rows(&self) -> Range<usize> {
        match self.header_row {
            Some(header) => (header + 1)..self.data_end.max(header + 1),
            None => self.start_row..self.start_row,
        }
    }

    pub fn is_table(&self) -> bool {
        self.kind == RegionKind::Table
    }

    pub fn has_header(&self) -> bool {
        self.header_row.is_some()
    }
}

/// Segmentation result for one sheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SheetSegments {
    pub sheet: String,
    pub row_count: usize,
    pub regions: Vec<TableRegion>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_rows_skip_header_and_trailing_title() {
        let region = TableRegion {
            index: 0,
            start_row: 2,
            end_row: 10,
            header_row: Some(3),
            data_end: 8,
            column_count: 4,
            title: None,
            kind: RegionKind::Table,
        };
        assert_eq!(region.data_rows(), 4..8);
        assert_eq!(region.row_count(), 8);
        assert!(region.contains_row(9));
        assert!(!region.contains_row(10));
    }
}
