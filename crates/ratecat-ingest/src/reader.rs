//! Raw grid readers: one CSV file per sheet, a JSON workbook, or an xlsx workbook.

use std::path::{Path, PathBuf};

use calamine::{Data, Reader, Xlsx, open_workbook};
use csv::ReaderBuilder;
use serde::Deserialize;
use tracing::{debug, info};

use ratecat_model::{CellValue, RawGrid};

use crate::error::{IngestError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Csv,
    JsonWorkbook,
    Xlsx,
}

impl InputFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?;
        if ext.eq_ignore_ascii_case("csv") {
            Some(Self::Csv)
        } else if ext.eq_ignore_ascii_case("json") {
            Some(Self::JsonWorkbook)
        } else if ext.eq_ignore_ascii_case("xlsx") || ext.eq_ignore_ascii_case("xlsm") {
            Some(Self::Xlsx)
        } else {
            None
        }
    }
}

#[derive(Debug, Deserialize)]
struct Workbook {
    sheets: Vec<RawGrid>,
}

/// Expands directories (one level, sorted by file name) and keeps files as given.
pub fn discover_inputs(paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut inputs = Vec::new();
    for path in paths {
        if path.is_dir() {
            let entries = std::fs::read_dir(path).map_err(|e| IngestError::DirectoryRead {
                path: path.clone(),
                source: e,
            })?;
            let mut found = Vec::new();
            for entry in entries {
                let entry = entry.map_err(|e| IngestError::DirectoryRead {
                    path: path.clone(),
                    source: e,
                })?;
                let candidate = entry.path();
                if candidate.is_file() && InputFormat::from_path(&candidate).is_some() {
                    found.push(candidate);
                }
            }
            found.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
            debug!(dir = %path.display(), files = found.len(), "discovered inputs");
            inputs.extend(found);
        } else if path.is_file() {
            inputs.push(path.clone());
        } else {
            return Err(IngestError::FileNotFound { path: path.clone() });
        }
    }
    if inputs.is_empty() {
        return Err(IngestError::NoInputs);
    }
    Ok(inputs)
}

/// Reads every sheet stored in `path`.
pub fn read_grids(path: &Path) -> Result<Vec<RawGrid>> {
    match InputFormat::from_path(path) {
        Some(InputFormat::Csv) => Ok(vec![read_csv_grid(path)?]),
        Some(InputFormat::JsonWorkbook) => read_json_workbook(path),
        Some(InputFormat::Xlsx) => read_xlsx_grids(path),
        None => Err(IngestError::UnsupportedFormat {
            path: path.to_path_buf(),
        }),
    }
}

/// Reads a CSV file as one sheet named after the file stem.
///
/// Rows of empty fields (`,,,`) are kept: they are boundaries for segmentation.
pub fn read_csv_grid(path: &Path) -> Result<RawGrid> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .map_err(|source| IngestError::CsvParse {
            path: path.to_path_buf(),
            source,
        })?;
    let mut rows = Vec::new();
    for record in reader.byte_records() {
        let record = record.map_err(|source| IngestError::CsvParse {
            path: path.to_path_buf(),
            source,
        })?;
        let row: Vec<CellValue> = record
            .iter()
            .map(|field| CellValue::from_text(&String::from_utf8_lossy(field)))
            .collect();
        rows.push(row);
    }
    let sheet = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "sheet".to_string());
    info!(path = %path.display(), sheet = %sheet, rows = rows.len(), "read csv sheet");
    Ok(RawGrid::new(sheet, rows))
}

/// Reads `{"sheets": [{"name": .., "rows": [[..]]}]}`.
pub fn read_json_workbook(path: &Path) -> Result<Vec<RawGrid>> {
    let text = std::fs::read_to_string(path).map_err(|source| IngestError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    let workbook: Workbook =
        serde_json::from_str(&text).map_err(|source| IngestError::JsonParse {
            path: path.to_path_buf(),
            source,
        })?;
    if workbook.sheets.is_empty() {
        return Err(IngestError::EmptyWorkbook {
            path: path.to_path_buf(),
        });
    }
    let sheets: Vec<RawGrid> = workbook
        .sheets
        .into_iter()
        .map(|grid| {
            let rows = grid
                .rows
                .into_iter()
                .map(|row| row.into_iter().map(trim_cell).collect())
                .collect();
            RawGrid::new(grid.sheet, rows)
        })
        .collect();
    info!(path = %path.display(), sheets = sheets.len(), "read json workbook");
    Ok(sheets)
}

/// Reads every worksheet of an xlsx workbook, in workbook order.
///
/// Cells keep their sheet coordinates: rows and columns above and left of the
/// used range are padded with empty cells.
pub fn read_xlsx_grids(path: &Path) -> Result<Vec<RawGrid>> {
    let workbook_error = |source| IngestError::Workbook {
        path: path.to_path_buf(),
        source,
    };
    let mut workbook: Xlsx<_> = open_workbook(path).map_err(workbook_error)?;
    let mut sheets = Vec::new();
    for name in workbook.sheet_names() {
        let range = workbook.worksheet_range(&name).map_err(workbook_error)?;
        let (row_offset, column_offset) = range
            .start()
            .map_or((0, 0), |(row, column)| (row as usize, column as usize));
        let mut rows = vec![Vec::new(); row_offset];
        for source_row in range.rows() {
            let mut row = vec![CellValue::Empty; column_offset];
            row.extend(source_row.iter().map(xlsx_cell));
            rows.push(row);
        }
        debug!(sheet = %name, rows = rows.len(), "read xlsx sheet");
        sheets.push(RawGrid::new(name, rows));
    }
    if sheets.is_empty() {
        return Err(IngestError::EmptyWorkbook {
            path: path.to_path_buf(),
        });
    }
    info!(path = %path.display(), sheets = sheets.len(), "read xlsx workbook");
    Ok(sheets)
}

fn xlsx_cell(data: &Data) -> CellValue {
    match data {
        Data::Empty => CellValue::Empty,
        Data::Int(value) => CellValue::Number(*value as f64),
        Data::Float(value) => CellValue::Number(*value),
        Data::String(text) => CellValue::from_text(text),
        other => CellValue::from_text(&other.to_string()),
    }
}

fn trim_cell(cell: CellValue) -> CellValue {
    match cell {
        CellValue::Text(text) => CellValue::from_text(&text),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;
    use zip::write::SimpleFileOptions;

    const XLSX_PARTS: [(&str, &str); 4] = [
        (
            "[Content_Types].xml",
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/><Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/></Types>"#,
        ),
        (
            "_rels/.rels",
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/></Relationships>"#,
        ),
        (
            "xl/workbook.xml",
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets><sheet name="Tarifas" sheetId="1" r:id="rId1"/></sheets></workbook>"#,
        ),
        (
            "xl/_rels/workbook.xml.rels",
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/></Relationships>"#,
        ),
    ];

    const XLSX_SHEET: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData><row r="2"><c r="B2" t="inlineStr"><is><t>Descripción</t></is></c><c r="C2" t="inlineStr"><is><t>VALOR (Sin IVA)</t></is></c></row><row r="3"><c r="B3" t="inlineStr"><is><t> Talonario </t></is></c><c r="C3"><v>45000</v></c></row></sheetData></worksheet>"#;

    fn write_xlsx(path: &Path) {
        let file = std::fs::File::create(path).expect("create xlsx");
        let mut archive = zip::ZipWriter::new(file);
        let parts = XLSX_PARTS
            .iter()
            .copied()
            .chain([("xl/worksheets/sheet1.xml", XLSX_SHEET)]);
        for (name, body) in parts {
            archive
                .start_file(name, SimpleFileOptions::default())
                .expect("start part");
            archive.write_all(body.as_bytes()).expect("write part");
        }
        archive.finish().expect("finish xlsx");
    }

    #[test]
    fn csv_keeps_blank_lines_and_uses_file_stem() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("Tarifas.csv");
        std::fs::write(
            &path,
            "Descripción,Plan Plus\nCuota de manejo,\"$8.990\"\n,\nRetiro,No aplica\n",
        )
        .expect("write csv");

        let grid = read_csv_grid(&path).expect("read csv");
        assert_eq!(grid.sheet, "Tarifas");
        assert_eq!(grid.row_count(), 4);
        assert!(grid.is_blank_row(2));
        assert_eq!(grid.cell(1, 1), &CellValue::Text("$8.990".to_string()));
    }

    #[test]
    fn json_workbook_accepts_mixed_cells() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("book.json");
        std::fs::write(
            &path,
            r#"{"sheets":[{"name":"Cuentas","rows":[["Descripción"," Valor "],["Cuota",8990],[null,"  "]]}]}"#,
        )
        .expect("write json");

        let sheets = read_json_workbook(&path).expect("read json");
        assert_eq!(sheets.len(), 1);
        let grid = &sheets[0];
        assert_eq!(grid.sheet, "Cuentas");
        assert_eq!(grid.cell(0, 1), &CellValue::Text("Valor".to_string()));
        assert_eq!(grid.cell(1, 1), &CellValue::Number(8990.0));
        assert!(grid.is_blank_row(2));
    }

    #[test]
    fn empty_workbook_is_an_error() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("empty.json");
        std::fs::write(&path, r#"{"sheets":[]}"#).expect("write json");
        assert!(matches!(
            read_json_workbook(&path),
            Err(IngestError::EmptyWorkbook { .. })
        ));
    }

    #[test]
    fn discover_expands_directories_in_name_order() {
        let dir = TempDir::new().expect("tempdir");
        for name in ["b.csv", "a.json", "notes.txt"] {
            std::fs::write(dir.path().join(name), "x").expect("write");
        }
        let inputs = discover_inputs(&[dir.path().to_path_buf()]).expect("discover");
        let names: Vec<_> = inputs
            .iter()
            .filter_map(|p| p.file_name().and_then(|n| n.to_str()))
            .collect();
        assert_eq!(names, vec!["a.json", "b.csv"]);
    }

    #[test]
    fn xlsx_sheets_keep_their_coordinates() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("tarifas.xlsx");
        write_xlsx(&path);

        let sheets = read_grids(&path).expect("read xlsx");
        assert_eq!(sheets.len(), 1);
        let grid = &sheets[0];
        assert_eq!(grid.sheet, "Tarifas");
        assert_eq!(grid.row_count(), 3);
        assert!(grid.is_blank_row(0));
        assert_eq!(grid.cell(1, 0), &CellValue::Empty);
        assert_eq!(grid.cell(1, 1), &CellValue::Text("Descripción".to_string()));
        assert_eq!(grid.cell(2, 1), &CellValue::Text("Talonario".to_string()));
        assert_eq!(grid.cell(2, 2), &CellValue::Number(45000.0));
    }

    #[test]
    fn corrupt_xlsx_is_a_workbook_error() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("broken.xlsx");
        std::fs::write(&path, "not a zip archive").expect("write");
        assert!(matches!(
            read_xlsx_grids(&path),
            Err(IngestError::Workbook { .. })
        ));
    }

    #[test]
    fn unsupported_extension_is_rejected() {
        assert!(matches!(
            read_grids(Path::new("rates.ods")),
            Err(IngestError::UnsupportedFormat { .. })
        ));
    }

    #[test]
    fn missing_input_is_reported() {
        let missing = PathBuf::from("/definitely/not/here.csv");
        assert!(matches!(
            discover_inputs(&[missing]),
            Err(IngestError::FileNotFound { .. })
        ));
    }
}
