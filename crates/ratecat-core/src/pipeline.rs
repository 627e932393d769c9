//! Document pipeline: raw grids in, catalog out.

use std::collections::BTreeMap;
use std::time::Instant;

use chrono::{DateTime, Utc};
use tracing::{debug, info, info_span, warn};

use ratecat_common::sha256_hex;
use ratecat_ingest::{SegmentationRules, normalize_header, segment_grid};
use ratecat_model::{
    Catalog, CatalogTable, RawGrid, SheetSegments, TableRegion, TableSource, TableType,
    ValidationIssue,
};
use ratecat_rules::{ClassificationInput, ServiceIdAllocator};
use ratecat_validate::{apply_severities, validate_catalog};

use crate::context::PipelineContext;
use crate::error::{PipelineError, Result, Stage, StructuralError};
use crate::rows::{RowLayout, TableScope, interpret_row};

/// Hex characters kept from the content hash.
const DOCUMENT_ID_LEN: usize = 32;

/// Caller-supplied document metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentOptions {
    pub document_version: String,
    pub generated_at: DateTime<Utc>,
}

impl DocumentOptions {
    pub fn new(document_version: impl Into<String>, generated_at: DateTime<Utc>) -> Self {
        Self {
            document_version: document_version.into(),
            generated_at,
        }
    }
}

/// Pipeline result: the segmentation of every sheet plus the validated catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentOutput {
    pub segments: Vec<SheetSegments>,
    pub catalog: Catalog,
}

/// Catalog table under construction with its own identifier space.
struct TableBucket {
    table: CatalogTable,
    allocator: ServiceIdAllocator,
}

/// Runs every stage over the sheets of one document.
///
/// Stage issues get the configured severities; validator issues are appended
/// last. Only configuration and structural failures are returned as errors.
pub fn process_document(
    grids: &[RawGrid],
    context: &PipelineContext,
    options: &DocumentOptions,
) -> Result<DocumentOutput> {
    let business_line = context.business_line();
    let document_span = info_span!("document", business_line = %business_line);
    let _document_guard = document_span.enter();
    let start = Instant::now();

    let mut issues: Vec<ValidationIssue> = Vec::new();
    let mut segments = Vec::with_capacity(grids.len());
    let mut buckets: BTreeMap<TableType, TableBucket> = BTreeMap::new();
    let mut usable = 0usize;

    let rules = SegmentationRules {
        config: &context.config.segmentation,
        aliases: &context.aliases,
        locale: &context.config.rates.locale,
    };
    for grid in grids {
        let segmentation = info_span!("segmentation", sheet = %grid.sheet)
            .in_scope(|| segment_grid(grid, rules));
        issues.extend(segmentation.issues.iter().cloned());

        for region in segmentation.usable_tables() {
            usable += 1;
            process_table(grid, region, context, &mut buckets, &mut issues);
        }
        segments.push(segmentation.segments);
    }

    if usable == 0 {
        warn!(sheets = grids.len(), "no usable tables");
        return Err(PipelineError::Structural {
            stage: Stage::Segmentation,
            reason: StructuralError::NoUsableTables {
                sheets: grids.len(),
            },
        });
    }

    apply_severities(&mut issues, &context.config.validation);
    let mut catalog = Catalog {
        document_id: document_id(grids),
        business_line: business_line.to_string(),
        document_type: context.config.document_type.clone(),
        document_version: options.document_version.clone(),
        generated_at: options.generated_at,
        source_sheets: grids.iter().map(|grid| grid.sheet.clone()).collect(),
        tables: buckets
            .into_iter()
            .map(|(table_type, bucket)| (table_type, bucket.table))
            .collect(),
        issues,
    };

    let validation_issues = info_span!("validation")
        .in_scope(|| validate_catalog(&catalog, &context.config));
    catalog.issues.extend(validation_issues);

    info!(
        document_id = %catalog.document_id,
        tables = catalog.tables.len(),
        services = catalog.service_count(),
        errors = catalog.error_count(),
        warnings = catalog.warning_count(),
        duration_ms = start.elapsed().as_millis(),
        "document processed"
    );
    Ok(DocumentOutput { segments, catalog })
}

/// Header normalization, classification and row interpretation for one region.
fn process_table(
    grid: &RawGrid,
    region: &TableRegion,
    context: &PipelineContext,
    buckets: &mut BTreeMap<TableType, TableBucket>,
    issues: &mut Vec<ValidationIssue>,
) {
    let Some(header_row) = region.header_row else {
        return;
    };
    let table_span = info_span!("table", sheet = %grid.sheet, region = region.index);
    let _table_guard = table_span.enter();

    let width = region
        .data_rows()
        .map(|row| grid.occupied_span(row))
        .chain([region.column_count])
        .max()
        .unwrap_or(0);
    let normalized = info_span!("header_normalization").in_scope(|| {
        normalize_header(grid.row(header_row), width, &context.aliases, header_row)
    });
    let header = normalized.header;

    let outcome = info_span!("classification").in_scope(|| {
        let sampler = RowLayout::new(&header, &[], context);
        let descriptions: Vec<String> = region
            .data_rows()
            .map(|row| sampler.description(grid, row))
            .filter(|text| !text.is_empty())
            .take(context.classifier.sample_rows())
            .collect();
        context.classifier.classify(ClassificationInput {
            title: region.title.as_deref(),
            header: &header,
            descriptions: &descriptions,
        })
    });
    let table_type = outcome.classification.table_type.clone();
    debug!(
        table_type = %table_type,
        header_row,
        rate_columns = ?outcome.rate_columns,
        "table classified"
    );
    issues.extend(
        normalized
            .issues
            .into_iter()
            .chain(outcome.issues)
            .map(|issue| {
                issue
                    .with_sheet(grid.sheet.clone())
                    .with_table_type(table_type.as_str())
                    .with_row(header_row)
            }),
    );

    let bucket = buckets
        .entry(table_type.clone())
        .or_insert_with(|| TableBucket {
            table: CatalogTable::new(table_type.clone()),
            allocator: ServiceIdAllocator::new(),
        });
    bucket.table.sources.push(TableSource {
        sheet: grid.sheet.clone(),
        region_index: region.index,
        start_row: region.start_row,
        end_row: region.end_row,
        header_row,
        title: region.title.clone(),
        classification: outcome.classification,
    });

    let layout = RowLayout::new(&header, &outcome.rate_columns, context);
    let scope = TableScope {
        sheet: &grid.sheet,
        table_type: &table_type,
    };
    let before = bucket.table.services.len();
    info_span!("row_interpretation").in_scope(|| {
        for row in region.data_rows() {
            if let Some(service) =
                interpret_row(context, &layout, grid, row, scope, &mut bucket.allocator, issues)
            {
                bucket.table.services.push(service);
            }
        }
    });
    debug!(
        table_type = %table_type,
        services = bucket.table.services.len() - before,
        "rows interpreted"
    );
}

/// Content hash of every sheet name and cell, so identical input gives the same id.
pub fn document_id(grids: &[RawGrid]) -> String {
    let mut content = String::new();
    for grid in grids {
        content.push_str(&grid.sheet);
        content.push('\u{1e}');
        for row in &grid.rows {
            for cell in row {
                content.push_str(&cell.display_text());
                content.push('\u{1f}');
            }
            content.push('\n');
        }
    }
    let mut id = sha256_hex(content.as_bytes());
    id.truncate(DOCUMENT_ID_LEN);
    id
}
