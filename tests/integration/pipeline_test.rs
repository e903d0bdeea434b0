use chart_etl::models::UsageStatus;
use chart_etl::{Pipeline, PipelineConfig, PipelineError, RawTable, TreatmentWindow};

use crate::utils::{COLUMNS, cohort_table, config, lexicon};

fn run(config: PipelineConfig, table: &RawTable) -> chart_etl::Result<chart_etl::PipelineOutput> {
    Pipeline::new(lexicon(), config).run(table)
}

#[test]
fn test_processing_report() {
    let output = run(config(), &cohort_table()).unwrap();
    let report = output.report;

    assert_eq!(report.input_rows, 8);
    assert_eq!(report.duplicates_removed, 1);
    assert_eq!(report.unparseable_timestamps, 1);
    assert_eq!(report.unparseable_ages, 1);
    assert_eq!(report.patients_kept, 3);
    assert_eq!(report.patients_dropped, 1);
    assert_eq!(report.output_rows, 6);
    assert_eq!(output.enriched.report, report);
}

#[test]
fn test_longitudinal_output() {
    let output = run(config(), &cohort_table()).unwrap();
    let longitudinal = &output.longitudinal;

    assert_eq!(longitudinal.baseline_type, "ANAMNESE");
    assert_eq!(longitudinal.followup_type, "EVOLUCAO");

    // p3 has no follow-up record and p4 was dropped by the processor
    let patients: Vec<&str> = longitudinal
        .records
        .iter()
        .map(|r| r.patient_id.as_str())
        .collect();
    assert_eq!(patients, vec!["p1", "p2"]);

    let p1 = &longitudinal.records[0];
    assert_eq!(p1.age, Some(54));
    assert_eq!(p1.sex.as_deref(), Some("F"));
    assert_eq!(p1.treatment_days, Some(59));
    assert_eq!(p1.marker("haq").baseline, Some(1.5));
    assert_eq!(p1.marker("haq").followup, Some(0.7));
    assert_eq!(p1.improvement, Some(1));
    assert_eq!(
        p1.profile.medication("adalimumabe").status,
        UsageStatus::Active
    );
    assert_eq!(p1.profile.comorbidities.get("has"), 1);

    let p2 = &longitudinal.records[1];
    assert_eq!(p2.age, Some(61));
    assert_eq!(p2.treatment_days, Some(89));
    assert_eq!(p2.improvement, Some(0));
    assert_eq!(
        p2.profile.medication("etanercepte").reason.as_deref(),
        Some("falha")
    );
    assert!(p2.switched());
}

#[test]
fn test_flat_tables() {
    let config = config();
    let output = run(config.clone(), &cohort_table()).unwrap();

    let enriched = output.enriched_table(&config);
    assert_eq!(enriched.rows.len(), 6);
    assert!(enriched.column_index("haq").is_some());
    assert!(enriched.column_index("adalimumabe_status").is_some());

    let longitudinal = output.longitudinal_table(&config);
    assert_eq!(longitudinal.rows.len(), 2);
    for column in [
        "haq-baseline",
        "haq-followup",
        "data_hora-baseline",
        "data_hora-followup",
        "tempo_tratamento_dias",
        "improvement",
    ] {
        assert!(
            longitudinal.column_index(column).is_some(),
            "missing column {column}"
        );
    }
    assert_eq!(
        longitudinal.get(0, "tempo_tratamento_dias").and_then(|c| c.as_f64()),
        Some(59.0)
    );
    assert_eq!(
        longitudinal.get(1, "haq-followup").and_then(|c| c.as_f64()),
        Some(1.9)
    );

    let records = longitudinal.to_json_records();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0]["paciente"], "p1");
}

#[test]
fn test_treatment_window_filters_patients() {
    let config = PipelineConfig::builder()
        .parallel(false)
        .treatment_window(TreatmentWindow::min_days(60))
        .build();
    let output = run(config, &cohort_table()).unwrap();

    assert_eq!(output.excluded_by_window, 1);
    assert_eq!(output.longitudinal.len(), 1);
    assert_eq!(output.longitudinal.records[0].patient_id, "p2");
}

#[test]
fn test_missing_required_column() {
    let mut table = RawTable::new(["paciente", "tipo", "data_hora"]);
    table.push_row([Some("p1"), Some("ANAMNESE"), Some("2023-01-01")]);

    let err = run(config(), &table).unwrap_err();
    match err {
        PipelineError::MissingRequiredColumn { columns } => {
            assert_eq!(columns, vec!["descricao".to_string()]);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_single_record_type_is_rejected() {
    let mut table = RawTable::new(COLUMNS);
    table.push_row([Some("p1"), Some("ANAMNESE"), Some("2023-01-01"), Some("HAQ 1")]);
    table.push_row([Some("p1"), Some("ANAMNESE"), Some("2023-02-01"), Some("HAQ 2")]);

    let err = run(config(), &table).unwrap_err();
    assert!(matches!(err, PipelineError::InsufficientRecordTypes { .. }));
}

#[test]
fn test_configured_label_without_patients() {
    // p2's only EVOLUCAO record goes with the single-type filter
    let mut table = RawTable::new(COLUMNS);
    table.push_row([Some("p1"), Some("ANAMNESE"), Some("2023-01-01"), Some("HAQ 1,5")]);
    table.push_row([Some("p1"), Some("EXAME"), Some("2023-02-01"), Some("HAQ 1,2")]);
    table.push_row([Some("p2"), Some("EVOLUCAO"), Some("2023-03-01"), Some("HAQ 0,7")]);

    let config = PipelineConfig::builder()
        .parallel(false)
        .baseline_type("ANAMNESE")
        .followup_type("EVOLUCAO")
        .build();

    let output = run(config, &table).unwrap();
    assert_eq!(output.report.patients_dropped, 1);
    assert_eq!(output.longitudinal.followup_type, "EVOLUCAO");
    assert!(output.longitudinal.is_empty());
}

#[test]
fn test_rows_without_patient_are_skipped() {
    let mut table = RawTable::new(COLUMNS);
    table.push_row([Some("p1"), Some("ANAMNESE"), Some("2023-01-01"), Some("HAQ 1,5")]);
    table.push_row([Some("p1"), Some("EVOLUCAO"), Some("2023-03-01"), Some("HAQ 0,7")]);
    table.push_row([None, Some("ANAMNESE"), Some("2023-01-01"), Some("HAQ 2,0")]);
    table.push_row([Some(" "), Some("EVOLUCAO"), Some("2023-03-01"), Some("HAQ 1,0")]);

    let output = run(config(), &table).unwrap();
    assert_eq!(output.report.input_rows, 4);
    assert_eq!(output.report.missing_patient_ids, 2);
    assert_eq!(output.enriched.len(), 2);

    let patients: Vec<&str> = output
        .longitudinal
        .records
        .iter()
        .map(|r| r.patient_id.as_str())
        .collect();
    assert_eq!(patients, vec!["p1"]);
}

#[test]
fn test_parallel_run_matches_sequential() {
    let sequential = run(config(), &cohort_table()).unwrap();
    let parallel = run(
        PipelineConfig::builder().parallel(true).build(),
        &cohort_table(),
    )
    .unwrap();

    assert_eq!(sequential.enriched, parallel.enriched);
    assert_eq!(sequential.longitudinal, parallel.longitudinal);
}

#[test]
fn test_json_input() {
    let rows: Vec<serde_json::Map<String, serde_json::Value>> = serde_json::from_str(
        r#"[
            {"paciente": "p1", "tipo": "ANAMNESE", "data_hora": "2023-01-01", "descricao": "HAQ 1,5", "idade": 50},
            {"paciente": "p1", "tipo": "EVOLUCAO", "data_hora": "2023-03-01", "descricao": "HAQ 0,7", "idade": null}
        ]"#,
    )
    .unwrap();
    let table = RawTable::from_json_rows(&rows);

    let output = run(config(), &table).unwrap();
    assert_eq!(output.longitudinal.len(), 1);
    assert_eq!(output.longitudinal.records[0].age, Some(50));
    assert_eq!(output.longitudinal.records[0].improvement, Some(1));
}
