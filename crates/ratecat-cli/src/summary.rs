use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{
    Attribute, Cell, CellAlignment, Color, ColumnConstraint, ContentArrangement, Table, Width,
};

use ratecat_ingest::InputFormat;
use ratecat_model::{Catalog, CatalogTable, Severity, ValidationIssue};

use crate::types::ProcessResult;

pub fn print_summary(result: &ProcessResult) {
    let catalog = &result.output.catalog;
    println!("Document: {}", catalog.document_id);
    println!("Business line: {}", catalog.business_line);
    for input in &result.inputs {
        let format = match input.format {
            InputFormat::Csv => "csv",
            InputFormat::JsonWorkbook => "json",
            InputFormat::Xlsx => "xlsx",
        };
        println!(
            "Input: {} ({format}, {} sheet(s))",
            input.path.display(),
            input.sheets
        );
    }
    if let Some(dir) = &result.output_dir {
        println!("Output: {}", dir.display());
    }
    for path in [
        &result.artifacts.segments,
        &result.artifacts.catalog,
        &result.artifacts.report,
    ]
    .into_iter()
    .flatten()
    {
        println!("  {}", path.display());
    }

    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Table type"),
        header_cell("Sources"),
        header_cell("Services"),
        header_cell("Unparsed"),
        header_cell("Errors"),
        header_cell("Warnings"),
    ]);
    apply_summary_table_style(&mut table);
    for index in 1..6 {
        align_column(&mut table, index, CellAlignment::Right);
    }

    let mut total_services = 0usize;
    let mut total_unparsed = 0usize;
    for (table_type, catalog_table) in &catalog.tables {
        let unparsed = unparsed_count(catalog_table);
        let (errors, warnings) = issue_counts(catalog, table_type.as_str());
        total_services += catalog_table.services.len();
        total_unparsed += unparsed;
        let type_cell = if table_type.is_unclassified() {
            Cell::new(table_type).fg(Color::DarkGrey)
        } else {
            Cell::new(table_type)
                .fg(Color::Blue)
                .add_attribute(Attribute::Bold)
        };
        table.add_row(vec![
            type_cell,
            Cell::new(catalog_table.sources.len()),
            Cell::new(catalog_table.services.len()),
            count_cell(unparsed, Color::Yellow),
            count_cell(errors, Color::Red),
            count_cell(warnings, Color::Yellow),
        ]);
    }
    table.add_row(vec![
        Cell::new("TOTAL")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        dim_cell("-"),
        Cell::new(total_services).add_attribute(Attribute::Bold),
        count_cell(total_unparsed, Color::Yellow).add_attribute(Attribute::Bold),
        count_cell(catalog.error_count(), Color::Red).add_attribute(Attribute::Bold),
        count_cell(catalog.warning_count(), Color::Yellow).add_attribute(Attribute::Bold),
    ]);
    println!("{table}");
    print_issue_table(&catalog.issues);
    println!("Status: {}", catalog.status().label());
}

fn print_issue_table(issues: &[ValidationIssue]) {
    if issues.is_empty() {
        return;
    }
    let mut ordered: Vec<&ValidationIssue> = issues.iter().collect();
    // Errors first; stable within a severity so pipeline order is kept.
    ordered.sort_by_key(|issue| issue.severity != Severity::Error);

    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Severity"),
        header_cell("Code"),
        header_cell("Location"),
        header_cell("Message"),
    ]);
    apply_issue_table_style(&mut table);
    align_column(&mut table, 0, CellAlignment::Center);
    for issue in ordered {
        let location = issue.location();
        table.add_row(vec![
            severity_cell(issue.severity),
            Cell::new(issue.code.as_str()),
            if location.is_empty() {
                dim_cell("-")
            } else {
                Cell::new(location)
            },
            Cell::new(&issue.message),
        ]);
    }
    println!();
    println!("Issues:");
    println!("{table}");
}

fn unparsed_count(table: &CatalogTable) -> usize {
    table
        .services
        .iter()
        .flat_map(|service| service.rates.values())
        .filter(|rate| rate.is_unparsed())
        .count()
}

fn issue_counts(catalog: &Catalog, table_type: &str) -> (usize, usize) {
    catalog
        .issues
        .iter()
        .filter(|issue| issue.table_type.as_deref() == Some(table_type))
        .fold((0, 0), |(errors, warnings), issue| match issue.severity {
            Severity::Error => (errors + 1, warnings),
            Severity::Warning => (errors, warnings + 1),
        })
}

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::DynamicFullWidth)
        .set_width(120);
}

fn apply_issue_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::DynamicFullWidth)
        .set_width(160);
    if table.column_count() >= 4 {
        table.set_constraints(vec![
            ColumnConstraint::UpperBoundary(Width::Fixed(9)),
            ColumnConstraint::UpperBoundary(Width::Fixed(26)),
            ColumnConstraint::UpperBoundary(Width::Percentage(35)),
            ColumnConstraint::UpperBoundary(Width::Percentage(50)),
        ]);
    }
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn severity_cell(severity: Severity) -> Cell {
    match severity {
        Severity::Error => Cell::new("ERROR")
            .fg(Color::Red)
            .add_attribute(Attribute::Bold),
        Severity::Warning => Cell::new("WARN").fg(Color::Yellow),
    }
}

fn count_cell(count: usize, color: Color) -> Cell {
    if count > 0 {
        Cell::new(count).fg(color).add_attribute(Attribute::Bold)
    } else {
        dim_cell(count)
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
