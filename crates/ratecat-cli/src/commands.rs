use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use chrono::Utc;
use comfy_table::Table;
use tracing::{info, info_span};

use ratecat_cli::artifacts::{ArtifactPaths, write_artifacts};
use ratecat_config::{ConfigRegistry, default_config_dir};
use ratecat_core::{DocumentOptions, PipelineContext, process_document};
use ratecat_ingest::{InputFormat, discover_inputs, read_grids};
use ratecat_model::RawGrid;

use crate::cli::ProcessArgs;
use crate::summary::apply_table_style;
use crate::types::{InputSummary, ProcessResult};

/// Built-in bundles plus `--config-dir`, falling back to `RATECAT_CONFIG_DIR`.
fn load_registry(config_dir: Option<&Path>) -> Result<ConfigRegistry> {
    let dir = config_dir.map(Path::to_path_buf).or_else(default_config_dir);
    ConfigRegistry::with_overrides(dir.as_deref()).context("load business-line configuration")
}

/// `--business-line` value that picks the bundle from the input itself.
pub const AUTO_BUSINESS_LINE: &str = "auto";

/// Resolves `auto` from sheet names and the first input's file name.
fn resolve_business_line(
    registry: &ConfigRegistry,
    requested: &str,
    grids: &[RawGrid],
    paths: &[PathBuf],
) -> Result<String> {
    if !requested.eq_ignore_ascii_case(AUTO_BUSINESS_LINE) {
        return Ok(requested.to_string());
    }
    let sheets: Vec<&str> = grids.iter().map(|grid| grid.sheet.as_str()).collect();
    let filename = paths
        .first()
        .and_then(|path| path.file_name())
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let detected = registry
        .detect(sheets.as_slice(), &filename)
        .context("no business-line bundles configured")?;
    info!(business_line = %detected, "using detected business line");
    Ok(detected.to_string())
}

pub fn run_business_lines(config_dir: Option<&Path>) -> Result<()> {
    let registry = load_registry(config_dir)?;
    let mut table = Table::new();
    table.set_header(vec!["Business line", "Document type", "Table types"]);
    apply_table_style(&mut table);
    for config in registry.bundles() {
        table.add_row(vec![
            config.business_line.clone(),
            config.document_type.clone(),
            config.table_types().collect::<Vec<_>>().join(", "),
        ]);
    }
    println!("{table}");
    Ok(())
}

pub fn run_process(args: &ProcessArgs, config_dir: Option<&Path>) -> Result<ProcessResult> {
    let run_span = info_span!("process", business_line = %args.business_line);
    let _run_guard = run_span.enter();

    // =========================================================================
    // Stage 0: Configuration
    // =========================================================================
    let registry = load_registry(config_dir)?;

    // =========================================================================
    // Stage 1: Ingest
    // =========================================================================
    let ingest_start = Instant::now();
    let paths = discover_inputs(&args.inputs).context("discover inputs")?;
    let mut grids = Vec::new();
    let mut inputs = Vec::with_capacity(paths.len());
    for path in paths.iter().cloned() {
        let sheets = read_grids(&path).with_context(|| format!("read {}", path.display()))?;
        inputs.push(InputSummary {
            format: InputFormat::from_path(&path).unwrap_or(InputFormat::Csv),
            sheets: sheets.len(),
            path,
        });
        grids.extend(sheets);
    }
    info!(
        files = inputs.len(),
        sheets = grids.len(),
        duration_ms = ingest_start.elapsed().as_millis(),
        "ingest complete"
    );

    let business_line = resolve_business_line(&registry, &args.business_line, &grids, &paths)?;
    run_span.record("business_line", business_line.as_str());
    let context = PipelineContext::from_registry(&registry, &business_line)?;

    // =========================================================================
    // Stage 2: Pipeline
    // =========================================================================
    let options = DocumentOptions::new(args.document_version.clone(), Utc::now());
    let output = process_document(&grids, &context, &options)?;

    // =========================================================================
    // Stage 3: Output
    // =========================================================================
    let (artifacts, output_dir) = if args.dry_run {
        info!("dry run, no artifacts written");
        (ArtifactPaths::default(), None)
    } else {
        let output_dir = args
            .output_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from("output"));
        let artifacts = info_span!("output", output_dir = %output_dir.display())
            .in_scope(|| write_artifacts(&output_dir, &output, !args.no_intermediate))?;
        (artifacts, Some(output_dir))
    };

    Ok(ProcessResult {
        output,
        inputs,
        artifacts,
        output_dir,
    })
}
