use chart_etl::{build_longitudinal, process};

use crate::utils::{config, date, lexicon, record};

#[test]
fn test_baseline_and_followup_join() {
    let records = vec![
        record("p1", "ANAMNESE", date(2023, 1, 1), "HAQ 1,5 VHS 40"),
        record("p1", "EVOLUCAO", date(2023, 3, 1), "HAQ 0,7 VHS 20"),
    ];
    let enriched = process(records, &lexicon(), &config()).unwrap();

    let markers = vec!["haq".to_string(), "vhs".to_string()];
    let table = build_longitudinal(&enriched, "ANAMNESE", "EVOLUCAO", &markers);

    assert_eq!(table.len(), 1);
    let row = &table.records[0];
    assert_eq!(row.marker("haq").baseline, Some(1.5));
    assert_eq!(row.marker("haq").followup, Some(0.7));
    assert_eq!(row.marker("vhs").both(), Some((40.0, 20.0)));
    assert_eq!(row.baseline_at, Some(date(2023, 1, 1)));
    assert_eq!(row.followup_at, Some(date(2023, 3, 1)));
    assert_eq!(row.treatment_days, Some(59));
    assert_eq!(row.improvement, None);
    assert_eq!(table.layout.markers, markers);
}

#[test]
fn test_patients_without_followup_are_excluded() {
    let records = vec![
        record("p1", "ANAMNESE", date(2023, 1, 1), "HAQ 1,5"),
        record("p1", "EVOLUCAO", date(2023, 2, 1), "HAQ 1,0"),
        record("p2", "ANAMNESE", date(2023, 1, 1), "HAQ 2,5"),
        record("p2", "EXAME", date(2023, 1, 5), "VHS 12"),
    ];
    let enriched = process(records, &lexicon(), &config()).unwrap();
    assert_eq!(enriched.report.patients_kept, 2);

    let table = build_longitudinal(&enriched, "ANAMNESE", "EVOLUCAO", &["haq".to_string()]);
    assert_eq!(table.len(), 1);
    assert_eq!(table.records[0].patient_id, "p1");
}

#[test]
fn test_demographics_come_from_baseline() {
    let records = vec![
        record("p1", "ANAMNESE", date(2023, 1, 1), "HAS. HAQ 1")
            .with_age(50)
            .with_sex("F"),
        record("p1", "EVOLUCAO", date(2023, 6, 1), "HAQ 1")
            .with_age(51)
            .with_sex("feminino"),
    ];
    let enriched = process(records, &lexicon(), &config()).unwrap();
    let table = build_longitudinal(&enriched, "ANAMNESE", "EVOLUCAO", &[]);

    let row = &table.records[0];
    assert_eq!(row.age, Some(50));
    assert_eq!(row.sex.as_deref(), Some("F"));
    assert_eq!(row.profile.comorbidities.get("has"), 1);
}

#[test]
fn test_followup_before_baseline_gives_negative_duration() {
    let records = vec![
        record("p1", "ANAMNESE", date(2023, 3, 1), "HAQ 1"),
        record("p1", "EVOLUCAO", date(2023, 1, 1), "HAQ 2"),
    ];
    let enriched = process(records, &lexicon(), &config()).unwrap();
    let table = build_longitudinal(&enriched, "ANAMNESE", "EVOLUCAO", &[]);
    assert_eq!(table.records[0].treatment_days, Some(-59));
}

#[test]
fn test_no_joined_patients_is_empty() {
    let records = vec![
        record("p1", "ANAMNESE", date(2023, 1, 1), "HAQ 1"),
        record("p1", "EXAME", date(2023, 1, 2), "HAQ 2"),
    ];
    let enriched = process(records, &lexicon(), &config()).unwrap();
    let table = build_longitudinal(&enriched, "ANAMNESE", "EVOLUCAO", &[]);
    assert!(table.is_empty());
}
