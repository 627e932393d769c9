//! Turning data rows of a classified table into service records.

use std::collections::BTreeMap;

use tracing::{trace, warn};

use ratecat_model::{
    CanonicalHeader, CellValue, IssueCode, IssueScope, RawGrid, ServiceRecord, TableType,
    TaxApplication, UNKNOWN_FREQUENCY, ValidationIssue,
};
use ratecat_rules::ServiceIdAllocator;

use crate::context::PipelineContext;

/// Column positions of one table, resolved once from its header.
#[derive(Debug, Clone)]
pub(crate) struct RowLayout {
    description: usize,
    tax: Option<usize>,
    frequency: Option<usize>,
    disclaimer: Option<usize>,
    /// Rate key and its position, for rate columns present in the header.
    rates: Vec<(String, usize)>,
    extra: Vec<(String, usize)>,
}

impl RowLayout {
    pub(crate) fn new(
        header: &CanonicalHeader,
        rate_columns: &[String],
        context: &PipelineContext,
    ) -> Self {
        let fields = &context.config.fields;
        let lookup = |key: &Option<String>| key.as_deref().and_then(|k| header.position(k));
        // Without a recognized description column the first column is the best guess.
        let description = header.position(&fields.description).unwrap_or(0);
        let rates: Vec<(String, usize)> = rate_columns
            .iter()
            .filter_map(|key| header.position(key).map(|index| (key.clone(), index)))
            .collect();
        let extra = header
            .columns()
            .iter()
            .filter(|column| column.index != description)
            .filter(|column| !fields.is_field(&column.key))
            .filter(|column| !rate_columns.contains(&column.key))
            .map(|column| (column.key.clone(), column.index))
            .collect();
        Self {
            description,
            tax: lookup(&fields.tax),
            frequency: lookup(&fields.frequency),
            disclaimer: lookup(&fields.disclaimer),
            rates,
            extra,
        }
    }

    pub(crate) fn description(&self, grid: &RawGrid, row: usize) -> String {
        grid.cell(row, self.description).display_text()
    }
}

/// Location shared by every issue raised for one table.
#[derive(Debug, Clone, Copy)]
pub(crate) struct TableScope<'a> {
    pub sheet: &'a str,
    pub table_type: &'a TableType,
}

impl TableScope<'_> {
    fn locate(&self, issue: ValidationIssue, row: usize) -> ValidationIssue {
        issue
            .with_sheet(self.sheet)
            .with_table_type(self.table_type.as_str())
            .with_row(row)
    }
}

/// Builds the record for `row`, or `None` when the row has no description.
pub(crate) fn interpret_row(
    context: &PipelineContext,
    layout: &RowLayout,
    grid: &RawGrid,
    row: usize,
    scope: TableScope<'_>,
    allocator: &mut ServiceIdAllocator,
    issues: &mut Vec<ValidationIssue>,
) -> Option<ServiceRecord> {
    let description = layout.description(grid, row);
    if description.is_empty() {
        if !grid.is_blank_row(row) {
            warn!(sheet = scope.sheet, row, "row has data but no description");
            issues.push(scope.locate(
                ValidationIssue::new(
                    IssueCode::RowWithoutDescription,
                    IssueScope::Table,
                    "row has values but no description; skipped",
                ),
                row,
            ));
        }
        return None;
    }

    let base = context
        .service_ids
        .base_id(&description, scope.table_type.as_str());
    let (service_id, collision) = allocator.allocate(&base);
    let mut row_issues: Vec<ValidationIssue> = collision.into_iter().collect();

    let applies_tax = match layout.tax.map(|index| grid.cell(row, index).display_text()) {
        None => TaxApplication::Unknown,
        Some(raw) => context.fields.tax(&raw).unwrap_or_else(|| {
            row_issues.push(
                ValidationIssue::new(
                    IssueCode::UnrecognizedTaxValue,
                    IssueScope::Service,
                    format!("tax value {raw:?} is not a known label; kept as unknown"),
                )
                .with_column(context.config.fields.tax.clone().unwrap_or_default()),
            );
            TaxApplication::Unknown
        }),
    };

    let frequency = layout.frequency.map_or_else(
        || UNKNOWN_FREQUENCY.to_string(),
        |index| context.fields.frequency(&grid.cell(row, index).display_text()),
    );

    let disclaimer = layout
        .disclaimer
        .map(|index| grid.cell(row, index).display_text())
        .filter(|text| !text.is_empty());

    let mut rates = BTreeMap::new();
    for (key, index) in &layout.rates {
        let parsed = context.rates.parse(grid.cell(row, *index), key);
        row_issues.extend(parsed.issue);
        rates.insert(key.clone(), parsed.rate);
    }

    let extra = layout
        .extra
        .iter()
        .filter_map(|(key, index)| {
            let cell: &CellValue = grid.cell(row, *index);
            (!cell.is_empty()).then(|| (key.clone(), cell.display_text()))
        })
        .collect();

    trace!(sheet = scope.sheet, row, service_id = %service_id, "service interpreted");
    issues.extend(
        row_issues
            .into_iter()
            .map(|issue| scope.locate(issue, row).with_service(service_id.clone())),
    );

    Some(ServiceRecord {
        service_id,
        description,
        rates,
        applies_tax,
        frequency,
        disclaimer,
        source_row: row,
        extra,
    })
}
