//! Raw sheet grids as handed over by the spreadsheet reader.

use serde::{Deserialize, Serialize};

static EMPTY_CELL: CellValue = CellValue::Empty;

/// One raw cell: text, number or empty.
///
/// Serialized untagged so JSON workbooks can use plain strings, numbers and `null`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Number(f64),
    Text(String),
    #[default]
    Empty,
}

impl CellValue {
    /// Builds a cell from reader text; blank text becomes `Empty`.
    pub fn from_text(value: &str) -> Self {
        let trimmed = value.trim().trim_matches('\u{feff}');
        if trimmed.is_empty() {
            Self::Empty
        } else {
            Self::Text(trimmed.to_string())
        }
    }

    /// True for `Empty` and for whitespace-only text.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::Text(text) => text.trim().is_empty(),
            Self::Number(_) => false,
        }
    }

    /// Text rendering used for headers, descriptions and unparsed rates.
    ///
    /// Integral numbers render without a fractional part.
    pub fn display_text(&self) -> String {
        match self {
            Self::Empty => String::new(),
            Self::Text(text) => text.trim().to_string(),
            Self::Number(value) => {
                if value.fract() == 0.0 && value.abs() < 1e15 {
                    format!("{}", *value as i64)
                } else {
                    value.to_string()
                }
            }
        }
    }
}

/// All rows of one sheet, in source order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawGrid {
    #[serde(alias = "name")]
    pub sheet: String,
    pub rows: Vec<Vec<CellValue>>,
}

impl RawGrid {
    pub fn new(sheet: impl Into<String>, rows: Vec<Vec<CellValue>>) -> Self {
        Self {
            sheet: sheet.into(),
            rows,
        }
    }

    /// Convenience constructor from text rows; blank strings become empty cells.
    pub fn from_text_rows<S: AsRef<str>>(sheet: impl Into<String>, rows: &[Vec<S>]) -> Self {
        let rows = rows
            .iter()
            .map(|row| row.iter().map(|cell| CellValue::from_text(cell.as_ref())).collect())
            .collect();
        Self::new(sheet, rows)
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.iter().all(|row| row.iter().all(CellValue::is_empty))
    }

    pub fn row(&self, index: usize) -> &[CellValue] {
        self.rows.get(index).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn cell(&self, row: usize, column: usize) -> &CellValue {
        self.row(row).get(column).unwrap_or(&EMPTY_CELL)
    }

    pub fn is_blank_row(&self, index: usize) -> bool {
        self.row(index).iter().all(CellValue::is_empty)
    }

    pub fn non_empty_count(&self, index: usize) -> usize {
        self.row(index).iter().filter(|cell| !cell.is_empty()).count()
    }

    /// One past the last non-empty column of the row, or 0 for blank rows.
    pub fn occupied_span(&self, index: usize) -> usize {
        self.row(index)
            .iter()
            .rposition(|cell| !cell.is_empty())
            .map_or(0, |position| position + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_text_is_empty() {
        assert!(CellValue::from_text("   ").is_empty());
        assert!(CellValue::Text(" \t".to_string()).is_empty());
        assert!(!CellValue::Number(0.0).is_empty());
    }

    #[test]
    fn integral_numbers_render_without_fraction() {
        assert_eq!(CellValue::Number(8990.0).display_text(), "8990");
        assert_eq!(CellValue::Number(8.5).display_text(), "8.5");
    }

    #[test]
    fn spans_and_lookups() {
        let grid = RawGrid::from_text_rows("S", &[vec!["a", "", "c", ""], vec!["", ""]]);
        assert_eq!(grid.occupied_span(0), 3);
        assert_eq!(grid.non_empty_count(0), 2);
        assert!(grid.is_blank_row(1));
        assert!(grid.is_blank_row(5));
        assert_eq!(grid.cell(9, 9), &CellValue::Empty);
    }

    #[test]
    fn cells_deserialize_untagged() {
        let row: Vec<CellValue> =
            serde_json::from_str(r#"["Descripción", 8990, null]"#).expect("parse row");
        assert_eq!(
            row,
            vec![
                CellValue::Text("Descripción".to_string()),
                CellValue::Number(8990.0),
                CellValue::Empty
            ]
        );
    }
}
