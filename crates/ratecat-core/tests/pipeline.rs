use chrono::{TimeZone, Utc};

use ratecat_config::{BusinessLineConfig, ConfigRegistry};
use ratecat_core::{
    DocumentOptions, PipelineContext, PipelineError, Stage, StructuralError, document_id,
    process_document,
};
use ratecat_model::{
    IssueCode, RateSpec, RawGrid, ServiceRecord, TableType, TaxApplication, ValidationStatus,
};

const PLAN_HEADER: &[&str] = &[
    "Descripción",
    "PLAN G - ZERO PARA CUENTA MOVIL",
    "PLAN PLUS PARA CUENTA MOVIL",
    "PLAN PREMIER PARA CUENTA MÓVIL",
    "Aplica IVA",
    "Frecuencia",
];

fn accounts() -> BusinessLineConfig {
    ConfigRegistry::builtin()
        .expect("builtin bundles")
        .get("accounts")
        .expect("accounts bundle")
        .clone()
}

fn context() -> PipelineContext {
    PipelineContext::new(accounts()).expect("accounts context")
}

fn options() -> DocumentOptions {
    DocumentOptions::new("v1", Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap())
}

fn grid(sheet: &str, rows: &[&[&str]]) -> RawGrid {
    let rows: Vec<Vec<&str>> = rows.iter().map(|row| row.to_vec()).collect();
    RawGrid::from_text_rows(sheet, &rows)
}

fn rates_sheet() -> RawGrid {
    grid(
        "Tarifas",
        &[
            &["Planes cuenta móvil"],
            &[],
            PLAN_HEADER,
            &["Apertura por app", "$0", "$0", "$0", "No", "Única vez"],
            &["Tarjeta débito digital", "$0", "$0", "$0", "No", "Única vez"],
            &["Cuota de manejo", "$0", "$8.990", "$14.990", "Sí", "Mensual"],
            &[],
            &["Transferencias"],
            PLAN_HEADER,
            &[
                "Transferencia a otros bancos ACH",
                "$7.510",
                "3 incluidas gratis, $7.510 adicional",
                "Ilimitadas",
                "Sí",
                "Por transacción",
            ],
            &["Transfiya", "$0", "$0", "$0", "No", "Por transacción"],
            &["Envío de dinero con llaves", "$0", "$0", "$0", "No", "Por transacción"],
            &[],
            &["Retiros"],
            PLAN_HEADER,
            &[
                "Retiro en cajero con tarjeta débito",
                "$2.100",
                "$2.100",
                "Ilimitados",
                "Sí",
                "Por transacción",
            ],
            &["Retiro en oficina", "$5.000", "$5.000", "$5.000", "Sí", "Por transacción"],
            &["Retiro en cajero", "$2.100", "", "Según convenio", "Sí", "Por transacción"],
            &[],
            &["Servicios tradicionales"],
            &["Descripción", "VALOR (Sin IVA)", "Aplica IVA", "Frecuencia"],
            &["Talonario de 30 hojas", "$45.000", "Sí", "Por evento"],
            &["Cheque de gerencia", "$12.500", "Sí", "Por evento"],
            &["Constancia bancaria", "$9.800", "Sí", "A demanda"],
        ],
    )
}

fn table_type(name: &str) -> TableType {
    TableType::new(name).expect("table type")
}

fn services<'a>(output: &'a ratecat_core::DocumentOutput, name: &str) -> &'a [ServiceRecord] {
    &output.catalog.tables[&table_type(name)].services
}

fn ids(services: &[ServiceRecord]) -> Vec<&str> {
    services.iter().map(|s| s.service_id.as_str()).collect()
}

#[test]
fn stacked_tables_become_typed_catalog_tables() {
    let output = process_document(&[rates_sheet()], &context(), &options()).expect("catalog");
    let catalog = &output.catalog;

    assert_eq!(
        catalog.tables.keys().map(TableType::as_str).collect::<Vec<_>>(),
        vec!["mobile_plans", "traditional_services", "transfers", "withdrawals"]
    );
    assert_eq!(catalog.business_line, "accounts");
    assert_eq!(catalog.document_type, "rates_and_fees");
    assert_eq!(catalog.document_version, "v1");
    assert_eq!(catalog.source_sheets, vec!["Tarifas".to_string()]);
    assert_eq!(catalog.service_count(), 12);

    assert_eq!(
        ids(services(&output, "mobile_plans")),
        vec!["app_opening", "digital_debit_card", "cuota_manejo"]
    );
    assert_eq!(
        ids(services(&output, "transfers")),
        vec!["transfer_ach", "transfiya", "keys"]
    );
    assert_eq!(
        ids(services(&output, "withdrawals")),
        vec!["withdrawal_atm", "withdrawal_branch", "withdrawal_atm_2"]
    );
    assert_eq!(
        ids(services(&output, "traditional_services")),
        vec!["checkbook", "cashier_check", "constancia_bancaria"]
    );

    let sources = &catalog.tables[&table_type("transfers")].sources;
    assert_eq!(sources.len(), 1);
    assert_eq!(sources[0].title.as_deref(), Some("Transferencias"));
    assert_eq!(sources[0].header_row, 8);
    assert_eq!(
        sources[0].classification.matched_pattern.as_deref(),
        Some("transferencia")
    );
}

#[test]
fn rows_carry_parsed_rates_and_normalized_fields() {
    let output = process_document(&[rates_sheet()], &context(), &options()).expect("catalog");

    let fee = &services(&output, "mobile_plans")[2];
    assert_eq!(fee.description, "Cuota de manejo");
    assert_eq!(fee.applies_tax, TaxApplication::Yes);
    assert_eq!(fee.frequency, "monthly");
    assert_eq!(fee.source_row, 5);
    assert_eq!(fee.rates["puls"], RateSpec::Fixed { value: 8990.0 });
    assert_eq!(fee.rates["premier"], RateSpec::Fixed { value: 14990.0 });

    let ach = &services(&output, "transfers")[0];
    assert_eq!(
        ach.rates["puls"],
        RateSpec::Conditional {
            included_free: 3,
            additional_cost: 7510.0
        }
    );
    assert_eq!(ach.rates["premier"], RateSpec::Unlimited {});
    assert_eq!(ach.frequency, "per_transaction");

    let certificate = &services(&output, "traditional_services")[2];
    assert_eq!(certificate.frequency, "on_demand");
    assert_eq!(
        certificate.rates.keys().collect::<Vec<_>>(),
        vec!["standard_rate"]
    );
    assert_eq!(
        certificate.rates["standard_rate"],
        RateSpec::Fixed { value: 9800.0 }
    );
}

#[test]
fn recoverable_problems_become_located_warnings() {
    let output = process_document(&[rates_sheet()], &context(), &options()).expect("catalog");
    let catalog = &output.catalog;

    let codes: Vec<IssueCode> = catalog.issues.iter().map(|issue| issue.code).collect();
    assert_eq!(
        codes,
        vec![
            IssueCode::AmbiguousClassification,
            IssueCode::AmbiguousClassification,
            IssueCode::ServiceIdCollision,
            IssueCode::EmptyRate,
            IssueCode::UnparsedRate,
            IssueCode::RateNotInterpreted,
            IssueCode::RateNotInterpreted,
        ]
    );
    // Topic tables share the plan columns with mobile_plans; rule order picks the topic.
    assert_eq!(catalog.issues[0].row, Some(8));
    assert_eq!(catalog.issues[0].table_type.as_deref(), Some("transfers"));
    assert!(catalog.issues[0].message.contains("mobile_plans"));
    assert_eq!(catalog.issues[1].row, Some(14));
    assert_eq!(catalog.issues[1].table_type.as_deref(), Some("withdrawals"));
    assert!(catalog.issues[2..].iter().all(|issue| {
        issue.row == Some(17)
            && issue.table_type.as_deref() == Some("withdrawals")
            && issue.service_id.as_deref() == Some("withdrawal_atm_2")
    }));
    // Stage issues know their sheet; validator issues are located by service.
    assert!(
        catalog.issues[..5]
            .iter()
            .all(|issue| issue.sheet.as_deref() == Some("Tarifas"))
    );
    assert_eq!(catalog.issues[3].column.as_deref(), Some("puls"));
    assert_eq!(catalog.status(), ValidationStatus::PassedWithWarnings);

    let empty = &services(&output, "withdrawals")[2];
    assert_eq!(empty.rates["puls"], RateSpec::Unparsed { raw: String::new() });
}

#[test]
fn segments_are_reported_per_sheet() {
    let output = process_document(&[rates_sheet()], &context(), &options()).expect("catalog");
    assert_eq!(output.segments.len(), 1);
    let headers: Vec<Option<usize>> = output.segments[0]
        .regions
        .iter()
        .map(|region| region.header_row)
        .collect();
    assert_eq!(headers, vec![None, Some(2), Some(8), Some(14), Some(20)]);
}

#[test]
fn text_only_data_rows_stay_inside_their_table() {
    let sheet = grid(
        "Planes",
        &[
            PLAN_HEADER,
            &["Cuota de manejo", "$0", "$8.990", "$14.990", "Sí", "Mensual"],
            &["Cambio de plan", "Gratis", "Gratis", "Gratis", "No aplica", "A demanda"],
            &["Apertura por app", "$0", "$0", "$0", "No", "Única vez"],
            &["Tarjeta débito digital", "$0", "$0", "$0", "No", "Única vez"],
            &["Extracto físico", "$3.500", "$3.500", "$0", "Sí", "Mensual"],
        ],
    );
    let output = process_document(&[sheet], &context(), &options()).expect("catalog");

    let headers: Vec<Option<usize>> = output.segments[0]
        .regions
        .iter()
        .map(|region| region.header_row)
        .collect();
    assert_eq!(headers, vec![Some(0)]);

    let plans = services(&output, "mobile_plans");
    let descriptions: Vec<&str> = plans.iter().map(|s| s.description.as_str()).collect();
    assert_eq!(
        descriptions,
        vec![
            "Cuota de manejo",
            "Cambio de plan",
            "Apertura por app",
            "Tarjeta débito digital",
            "Extracto físico",
        ]
    );
    assert_eq!(plans[0].service_id, "cuota_manejo");
    assert_eq!(plans[1].frequency, "on_demand");
    assert!(
        !output
            .catalog
            .issues
            .iter()
            .any(|issue| matches!(
                issue.code,
                IssueCode::UndersizedTable | IssueCode::StrayRows | IssueCode::NoHeaderDetected
            ))
    );
}

#[test]
fn unmatched_tables_are_kept_as_unclassified() {
    let sheet = grid(
        "Otros",
        &[
            &["Descripción", "Comisión", "Frecuencia"],
            &["Reexpedición de clave", "$1.000", "Por evento"],
            &["Bloqueo de cuenta", "$0", "Por evento"],
            &["Extracto físico", "$3.500", "Mensual"],
        ],
    );
    let output = process_document(&[sheet], &context(), &options()).expect("catalog");
    let unclassified = services(&output, "unclassified");
    assert_eq!(unclassified.len(), 3);
    assert_eq!(unclassified[0].rates["comision"], RateSpec::Fixed { value: 1000.0 });
    assert_eq!(unclassified[0].applies_tax, TaxApplication::Unknown);
    assert!(
        output
            .catalog
            .issues
            .iter()
            .any(|issue| issue.code == IssueCode::UnclassifiedTable)
    );
}

#[test]
fn loans_bundle_reads_percentage_rates() {
    let registry = ConfigRegistry::builtin().expect("builtin bundles");
    let context = PipelineContext::from_registry(&registry, "loans").expect("loans context");
    let sheet = grid(
        "Tasas de crédito",
        &[
            &["Tasas vigentes de crédito"],
            &[],
            &["Línea de crédito", "Tasa E.A.", "Tasa N.M.V.", "Frecuencia"],
            &["Crédito libre inversión", "24,5%", "22,1%", "Mensual"],
            &["Crédito de vehículo", "18,9% E.A.", "17,4%", "Mensual"],
            &["Crédito de vivienda", "12,5%", "11,8 %", "Mensual"],
        ],
    );
    let output = process_document(&[sheet], &context, &options()).expect("catalog");
    let catalog = &output.catalog;

    assert_eq!(catalog.business_line, "loans");
    assert_eq!(catalog.document_type, "loan_rates");
    assert_eq!(
        catalog.tables.keys().map(TableType::as_str).collect::<Vec<_>>(),
        vec!["credit_rates"]
    );
    let rates = services(&output, "credit_rates");
    assert_eq!(ids(rates), vec!["personal_loan", "vehicle_loan", "mortgage"]);
    assert_eq!(rates[1].rates["effective_rate"], RateSpec::Fixed { value: 18.9 });
    assert_eq!(rates[2].rates["nominal_rate"], RateSpec::Fixed { value: 11.8 });
    assert_eq!(
        rates[0].rates.keys().collect::<Vec<_>>(),
        vec!["effective_rate", "nominal_rate"]
    );
    assert!(!catalog.has_errors());
}

#[test]
fn identical_input_gives_identical_catalog() {
    let first = process_document(&[rates_sheet()], &context(), &options()).expect("first");
    let second = process_document(&[rates_sheet()], &context(), &options()).expect("second");
    assert_eq!(first, second);
    assert_eq!(first.catalog.document_id.len(), 32);
    assert_eq!(first.catalog.document_id, document_id(&[rates_sheet()]));
    assert_ne!(
        document_id(&[rates_sheet()]),
        document_id(&[grid("Tarifas", &[&["otra cosa"]])])
    );
}

#[test]
fn document_without_tables_is_a_structural_error() {
    let sheet = grid("Notas", &[&["Tarifas vigentes desde enero"], &[], &["Sujeto a cambios"]]);
    let error = process_document(&[sheet], &context(), &options()).unwrap_err();
    assert_eq!(error.category(), "structural");
    assert_eq!(error.stage(), Stage::Segmentation);
    insta::assert_snapshot!(
        error.to_string(),
        @"structural error during segmentation: no usable table found in 1 sheet(s)"
    );
}

#[test]
fn unknown_business_line_is_a_configuration_error() {
    let registry = ConfigRegistry::builtin().expect("builtin bundles");
    let error = PipelineContext::from_registry(&registry, "mortgages").unwrap_err();
    assert_eq!(error.category(), "configuration");
    assert_eq!(error.stage(), Stage::Configuration);
}

#[test]
fn unsatisfiable_required_column_is_structural() {
    let mut config = accounts();
    config.classification.rules[0]
        .required_columns
        .push("cashback".to_string());
    let error = PipelineContext::new(config).unwrap_err();
    assert!(matches!(
        error,
        PipelineError::Structural {
            stage: Stage::Classification,
            reason: StructuralError::UnsatisfiableRequiredColumns { ref column, .. },
        } if column == "cashback"
    ));
}
