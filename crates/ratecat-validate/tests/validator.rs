use std::collections::BTreeMap;

use chrono::{TimeZone, Utc};

use ratecat_config::{BusinessLineConfig, ConfigRegistry};
use ratecat_model::{
    Catalog, CatalogTable, IssueCode, IssueScope, RateSpec, ServiceRecord, Severity, TableType,
    TaxApplication, ValidationIssue,
};
use ratecat_validate::{apply_severities, validate_catalog};

fn accounts() -> BusinessLineConfig {
    ConfigRegistry::builtin()
        .expect("builtin bundles")
        .get("accounts")
        .expect("accounts bundle")
        .clone()
}

fn plan_rates() -> BTreeMap<String, RateSpec> {
    ["g_zero", "puls", "premier"]
        .into_iter()
        .map(|column| (column.to_string(), RateSpec::Fixed { value: 0.0 }))
        .collect()
}

fn service(id: &str, description: &str) -> ServiceRecord {
    ServiceRecord {
        service_id: id.to_string(),
        description: description.to_string(),
        rates: plan_rates(),
        applies_tax: TaxApplication::Yes,
        frequency: "monthly".to_string(),
        disclaimer: None,
        source_row: 3,
        extra: BTreeMap::new(),
    }
}

fn catalog(tables: Vec<(&str, Vec<ServiceRecord>)>) -> Catalog {
    let tables = tables
        .into_iter()
        .map(|(name, services)| {
            let table_type = TableType::new(name).expect("table type");
            let mut table = CatalogTable::new(table_type.clone());
            table.services = services;
            (table_type, table)
        })
        .collect();
    Catalog {
        document_id: "doc".to_string(),
        business_line: "accounts".to_string(),
        document_type: "rates_and_fees".to_string(),
        document_version: "v1".to_string(),
        generated_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        source_sheets: vec!["Tarifas".to_string()],
        tables,
        issues: Vec::new(),
    }
}

fn codes(issues: &[ValidationIssue]) -> Vec<IssueCode> {
    issues.iter().map(|issue| issue.code).collect()
}

#[test]
fn clean_catalog_has_no_issues() {
    let catalog = catalog(vec![(
        "mobile_plans",
        vec![service("app_opening", "Apertura por app")],
    )]);
    assert!(validate_catalog(&catalog, &accounts()).is_empty());
}

#[test]
fn validation_is_pure_and_repeatable() {
    let catalog = catalog(vec![(
        "mobile_plans",
        vec![service("a", "x"), service("a", "")],
    )]);
    let before = catalog.clone();
    let first = validate_catalog(&catalog, &accounts());
    let second = validate_catalog(&catalog, &accounts());
    assert_eq!(first, second);
    assert_eq!(catalog, before);
}

#[test]
fn empty_catalog_is_an_error() {
    let issues = validate_catalog(&catalog(Vec::new()), &accounts());
    assert_eq!(codes(&issues), vec![IssueCode::EmptyCatalog]);
    assert_eq!(issues[0].scope, IssueScope::Document);
    assert_eq!(issues[0].severity, Severity::Error);
}

#[test]
fn missing_required_fields_are_errors() {
    let mut record = service("", "Apertura por app");
    record.frequency = String::new();
    let issues = validate_catalog(&catalog(vec![("mobile_plans", vec![record])]), &accounts());
    let missing: Vec<&str> = issues
        .iter()
        .filter(|issue| issue.code == IssueCode::MissingRequiredField)
        .filter_map(|issue| issue.column.as_deref())
        .collect();
    assert_eq!(missing, vec!["service_id", "frequency"]);
    assert!(issues.iter().all(ValidationIssue::is_error));
}

#[test]
fn unknown_frequency_counts_as_present() {
    let mut record = service("app_opening", "Apertura por app");
    record.frequency = "unknown".to_string();
    let issues = validate_catalog(&catalog(vec![("mobile_plans", vec![record])]), &accounts());
    assert!(issues.is_empty());
}

#[test]
fn frequency_outside_configured_values_is_invalid() {
    let mut record = service("app_opening", "Apertura por app");
    record.frequency = "cada_luna_llena".to_string();
    let issues = validate_catalog(&catalog(vec![("mobile_plans", vec![record])]), &accounts());
    assert_eq!(codes(&issues), vec![IssueCode::InvalidFrequency]);
    assert_eq!(issues[0].service_id.as_deref(), Some("app_opening"));
    assert_eq!(issues[0].table_type.as_deref(), Some("mobile_plans"));
}

#[test]
fn unparsed_rates_and_rate_column_shape() {
    let mut record = service("withdrawal_atm", "Retiro en cajero");
    record.rates.insert(
        "premier".to_string(),
        RateSpec::Unparsed {
            raw: "Según convenio".to_string(),
        },
    );
    record.rates.remove("puls");
    record
        .rates
        .insert("observaciones".to_string(), RateSpec::Fixed { value: 1.0 });
    let issues = validate_catalog(&catalog(vec![("withdrawals", vec![record])]), &accounts());
    assert_eq!(
        codes(&issues),
        vec![
            IssueCode::RateNotInterpreted,
            IssueCode::MissingRateColumn,
            IssueCode::UnexpectedRateColumn,
        ]
    );
    assert_eq!(issues[1].column.as_deref(), Some("puls"));
    assert_eq!(issues[2].column.as_deref(), Some("observaciones"));
}

#[test]
fn unclassified_tables_have_no_fixed_rate_shape() {
    let mut record = service("misc", "Servicio varios");
    record.rates = BTreeMap::from([("valor".to_string(), RateSpec::Fixed { value: 10.0 })]);
    let issues = validate_catalog(&catalog(vec![("unclassified", vec![record])]), &accounts());
    assert!(issues.is_empty());
}

#[test]
fn description_length_bounds() {
    let short = service("ab", "ab");
    let long = service("long", &"x".repeat(201));
    let issues = validate_catalog(
        &catalog(vec![("mobile_plans", vec![short, long])]),
        &accounts(),
    );
    assert_eq!(
        codes(&issues),
        vec![IssueCode::DescriptionTooShort, IssueCode::DescriptionTooLong]
    );
    assert_eq!(issues[0].severity, Severity::Warning);
    assert_eq!(issues[1].severity, Severity::Error);
}

#[test]
fn duplicate_ids_across_tables_use_configured_severity() {
    let catalog = catalog(vec![
        ("mobile_plans", vec![service("transfer", "Transferencia desde app")]),
        ("transfers", vec![service("transfer", "Transferencia a otros bancos")]),
    ]);
    let issues = validate_catalog(&catalog, &accounts());
    assert_eq!(codes(&issues), vec![IssueCode::DuplicateServiceId]);
    assert_eq!(issues[0].table_type.as_deref(), Some("transfers"));
    // accounts downgrades duplicates to warnings
    assert_eq!(issues[0].severity, Severity::Warning);

    let strict = BusinessLineConfig {
        validation: Default::default(),
        ..accounts()
    };
    let issues = validate_catalog(&catalog, &strict);
    assert_eq!(issues[0].severity, Severity::Error);
}

#[test]
fn severities_apply_to_stage_issues() {
    let mut config = accounts();
    config
        .validation
        .severities
        .insert(IssueCode::UnparsedRate, Severity::Error);
    let mut issues = vec![ValidationIssue::new(
        IssueCode::UnparsedRate,
        IssueScope::Service,
        "rate could not be interpreted",
    )];
    apply_severities(&mut issues, &config.validation);
    assert!(issues[0].is_error());
}
