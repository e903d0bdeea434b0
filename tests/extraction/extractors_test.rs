use chart_etl::extract::{ExtractionPlan, extract_record};
use chart_etl::models::{RheumatoidOrigin, RheumatoidResult, UsageStatus};
use chart_etl::{MarkerStrategy, PipelineConfig, process};

use crate::utils::{config, date, lexicon, record};

#[test]
fn test_marker_values_are_cleaned_after_extraction() {
    let lexicon = lexicon();
    let records = vec![
        record("p1", "ANAMNESE", date(2023, 1, 1), "haq: 1,5 das28 : <2"),
        record("p1", "EVOLUCAO", date(2023, 2, 1), "HAQ 1"),
    ];

    let table = process(records, &lexicon, &config()).unwrap();
    let baseline = &table.records[0].extraction;

    assert_eq!(baseline.markers["haq"].raw.as_deref(), Some("1,5"));
    assert_eq!(baseline.marker_value("haq"), Some(1.5));
    assert_eq!(baseline.markers["das28"].raw.as_deref(), Some("<2"));
    assert_eq!(baseline.marker_value("das28"), Some(2.0));
    assert_eq!(table.report.unparseable_numbers, 0);
}

#[test]
fn test_first_value_within_lookahead() {
    let lexicon = lexicon();
    let config = config();
    let plan = ExtractionPlan::new(&lexicon, &config);

    // the value sits beyond the lookahead window
    let extraction = extract_record(Some("haq não avaliado nesta consulta 1,2"), &plan);
    assert!(extraction.markers.get("haq").is_none());

    let extraction = extract_record(Some("HAQ 1,0 e depois HAQ 0,5"), &plan);
    assert_eq!(extraction.markers["haq"].raw.as_deref(), Some("1,0"));
}

#[test]
fn test_pattern_strategy() {
    let lexicon = lexicon();
    let config = PipelineConfig::builder()
        .marker_strategy(MarkerStrategy::Pattern)
        .build();
    let plan = ExtractionPlan::new(&lexicon, &config);

    let extraction = extract_record(Some("VHS=35 PCR: 12,4"), &plan);
    assert_eq!(extraction.markers["vhs"].raw.as_deref(), Some("35"));
    assert_eq!(extraction.markers["pcr"].raw.as_deref(), Some("12,4"));
}

#[test]
fn test_discontinuation_outranks_activity() {
    let lexicon = lexicon();
    let config = PipelineConfig::builder()
        .medications(&["metotrexato"])
        .build();
    let plan = ExtractionPlan::new(&lexicon, &config);

    let extraction = extract_record(
        Some("Uso prévio de metotrexato, suspenso por hepatotoxicidade"),
        &plan,
    );
    let usage = extraction.medication("metotrexato");
    assert_eq!(usage.status, UsageStatus::Prior);
    assert_eq!(usage.reason.as_deref(), Some("hepatotoxicidade"));
    assert_eq!(usage.flag(), 1);

    let extraction = extract_record(Some("Paciente sem medicação"), &plan);
    assert_eq!(extraction.medication("metotrexato").status, UsageStatus::Absent);
    assert_eq!(extraction.medication("metotrexato").flag(), 0);
}

#[test]
fn test_rheumatoid_factor_lab_titer_overrides_origin() {
    let lexicon = lexicon();
    let config = config();
    let plan = ExtractionPlan::new(&lexicon, &config);

    let factor = extract_record(Some("FR + em exame anterior. FR: 45"), &plan)
        .rheumatoid_factor
        .unwrap();
    assert_eq!(factor.result, RheumatoidResult::Positive);
    assert_eq!(factor.origin, Some(RheumatoidOrigin::Lab));
    assert_eq!(factor.titer, Some(45.0));
}

#[test]
fn test_rheumatoid_factor_from_diagnosis_code() {
    let lexicon = lexicon();
    let config = config();
    let plan = ExtractionPlan::new(&lexicon, &config);

    let factor = extract_record(Some("CID10: M05.9"), &plan)
        .rheumatoid_factor
        .unwrap();
    assert_eq!(factor.result, RheumatoidResult::Positive);
    assert_eq!(factor.origin, Some(RheumatoidOrigin::Code));
    assert_eq!(factor.titer, None);

    // a phrase takes precedence over the code
    let factor = extract_record(Some("FR negativo. CID10: M05.9"), &plan)
        .rheumatoid_factor
        .unwrap();
    assert_eq!(factor.result, RheumatoidResult::Negative);
    assert_eq!(factor.origin, Some(RheumatoidOrigin::Text));
}

#[test]
fn test_comorbidity_flags_match_substrings() {
    let lexicon = lexicon();
    let config = PipelineConfig::builder().comorbidities(&["op", "dm"]).build();
    let plan = ExtractionPlan::new(&lexicon, &config);

    // "op" fires inside "opioide"
    let extraction = extract_record(Some("Prescrito opioide para dor"), &plan);
    assert_eq!(extraction.comorbidities.get("op"), 1);
    assert_eq!(extraction.comorbidities.get("dm"), 0);
    assert_eq!(extraction.comorbidities.any(), 1);
    assert_eq!(extraction.comorbidities.count(), 1);
}

#[test]
fn test_extraction_is_idempotent() {
    let lexicon = lexicon();
    let config = config();
    let plan = ExtractionPlan::new(&lexicon, &config);
    let text = Some(
        "HAS, DM. Fez uso de etanercepte, suspenso por infecção. \
         Em uso de MTX 15mg SC. FR: 80. DAS28 4,1",
    );

    let first = extract_record(text, &plan);
    let second = extract_record(text, &plan);
    assert_eq!(first, second);
}
