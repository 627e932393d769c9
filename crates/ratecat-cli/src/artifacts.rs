//! JSON artifacts written for each processed document.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use ratecat_core::DocumentOutput;
use ratecat_model::SheetSegments;

pub const SEGMENTS_FILE: &str = "01_segments.json";
pub const CATALOG_FILE: &str = "02_catalog.json";
pub const REPORT_FILE: &str = "03_validation_report.json";

/// Segmentation result of every sheet, as written to [`SEGMENTS_FILE`].
#[derive(Debug, Serialize)]
pub struct SegmentsArtifact<'a> {
    pub document_id: &'a str,
    pub business_line: &'a str,
    pub sheets: &'a [SheetSegments],
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub segments: Option<PathBuf>,
    pub catalog: Option<PathBuf>,
    pub report: Option<PathBuf>,
}

/// Writes the catalog and its report, plus the segments unless `intermediate` is off.
pub fn write_artifacts(
    output_dir: &Path,
    output: &DocumentOutput,
    intermediate: bool,
) -> Result<ArtifactPaths> {
    fs::create_dir_all(output_dir)
        .with_context(|| format!("create output directory {}", output_dir.display()))?;
    let catalog = &output.catalog;
    let mut paths = ArtifactPaths::default();

    if intermediate {
        let path = output_dir.join(SEGMENTS_FILE);
        write_json(
            &path,
            &SegmentsArtifact {
                document_id: &catalog.document_id,
                business_line: &catalog.business_line,
                sheets: &output.segments,
            },
        )?;
        paths.segments = Some(path);
    }

    let path = output_dir.join(CATALOG_FILE);
    write_json(&path, catalog)?;
    paths.catalog = Some(path);

    let path = output_dir.join(REPORT_FILE);
    write_json(&path, &catalog.report())?;
    paths.report = Some(path);

    info!(output_dir = %output_dir.display(), intermediate, "artifacts written");
    Ok(paths)
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let file = File::create(path).with_context(|| format!("create {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, value)
        .with_context(|| format!("serialize {}", path.display()))?;
    writer
        .write_all(b"\n")
        .and_then(|()| writer.flush())
        .with_context(|| format!("write {}", path.display()))?;
    Ok(())
}
