use chart_etl::algorithm::outcome::{default_criteria, evaluate_record};
use chart_etl::{
    ImprovementCriterion, MarkerEvaluation, Pipeline, PipelineConfig, build_longitudinal,
    evaluate_outcomes, process,
};

use crate::utils::{cohort_table, config, date, lexicon, record};

fn markers() -> Vec<String> {
    ["haq", "das28", "cdai"].iter().map(ToString::to_string).collect()
}

#[test]
fn test_haq_reduction_labels() {
    let records = vec![
        record("p1", "ANAMNESE", date(2023, 1, 1), "HAQ 1,5"),
        record("p1", "EVOLUCAO", date(2023, 4, 1), "HAQ 0,7"),
        record("p2", "ANAMNESE", date(2023, 1, 1), "HAQ 1,6"),
        record("p2", "EVOLUCAO", date(2023, 4, 1), "HAQ 1,5"),
    ];
    let enriched = process(records, &lexicon(), &config()).unwrap();
    let table = build_longitudinal(&enriched, "ANAMNESE", "EVOLUCAO", &markers());
    let table = evaluate_outcomes(table, &default_criteria());

    assert_eq!(table.records[0].improvement, Some(1));
    assert_eq!(table.records[1].improvement, Some(0));
    assert!((table.improvement_rate() - 50.0).abs() < 1e-9);
}

#[test]
fn test_falls_through_to_next_marker() {
    let records = vec![
        // haq only at baseline, das28 halves
        record("p1", "ANAMNESE", date(2023, 1, 1), "HAQ 1,5 DAS28 6,0"),
        record("p1", "EVOLUCAO", date(2023, 4, 1), "DAS28 3,0"),
    ];
    let enriched = process(records, &lexicon(), &config()).unwrap();
    let table = build_longitudinal(&enriched, "ANAMNESE", "EVOLUCAO", &markers());

    let row = &table.records[0];
    assert_eq!(
        ImprovementCriterion::absolute("haq", 0.35).evaluate(row),
        MarkerEvaluation::Unresolved
    );
    assert_eq!(
        evaluate_record(row, &default_criteria()),
        MarkerEvaluation::Improved
    );
}

#[test]
fn test_no_resolvable_marker_is_not_improved() {
    let records = vec![
        record("p1", "ANAMNESE", date(2023, 1, 1), "Sem escores"),
        record("p1", "EVOLUCAO", date(2023, 4, 1), "CDAI 12"),
    ];
    let enriched = process(records, &lexicon(), &config()).unwrap();
    let table = build_longitudinal(&enriched, "ANAMNESE", "EVOLUCAO", &markers());
    let table = evaluate_outcomes(table, &default_criteria());
    assert_eq!(table.records[0].improvement, Some(0));
}

#[test]
fn test_custom_criteria_in_pipeline() {
    let config = PipelineConfig::builder()
        .parallel(false)
        .criteria(vec![ImprovementCriterion::custom("haq", |baseline, followup| {
            followup < baseline
        })])
        .build();
    let output = Pipeline::new(lexicon(), config).run(&cohort_table()).unwrap();

    // p2 moves from 2.0 to 1.9, which counts under the custom rule
    let labels: Vec<Option<u8>> = output
        .longitudinal
        .records
        .iter()
        .map(|r| r.improvement)
        .collect();
    assert_eq!(labels, vec![Some(1), Some(1)]);
}

#[test]
fn test_empty_criteria_leave_labels_unset() {
    let config = PipelineConfig::builder()
        .parallel(false)
        .criteria(Vec::new())
        .build();
    let output = Pipeline::new(lexicon(), config).run(&cohort_table()).unwrap();
    assert!(output.longitudinal.records.iter().all(|r| r.improvement.is_none()));
}
