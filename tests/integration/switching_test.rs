use chart_etl::algorithm::switching::{abandonment_rates, common_sequences, transition_matrix};
use chart_etl::{Pipeline, PipelineConfig, RawTable, SwitchingAnalysis};

use crate::utils::{COLUMNS, cohort_table, config, lexicon};

fn biologics() -> Vec<String> {
    ["adalimumabe", "etanercepte", "tofacitinibe"]
        .iter()
        .map(ToString::to_string)
        .collect()
}

/// Baseline note naming a discontinued drug and, far enough away to fall
/// outside its context window, the current one
fn switch_note(prior: &str, reason: &str, current: &str) -> String {
    let padding = " ".repeat(320);
    format!("Uso prévio: {prior} ({reason}).{padding}Atualmente em uso de {current}.")
}

fn switching_table() -> RawTable {
    let mut table = RawTable::new(COLUMNS);
    let notes = [
        ("s1", switch_note("adalimumabe", "falha", "tofacitinibe")),
        ("s2", switch_note("adalimumabe", "falha", "tofacitinibe")),
        ("s3", switch_note("etanercepte", "infecção", "adalimumabe")),
        ("s4", "Em uso de tofacitinibe. HAQ 1,2".to_string()),
    ];
    for (patient, note) in &notes {
        let baseline = format!("{patient}. {note}");
        table.push_row([
            Some(*patient),
            Some("ANAMNESE"),
            Some("2023-01-01"),
            Some(baseline.as_str()),
        ]);
        let followup = format!("{patient}: retorno, HAQ 0,5");
        table.push_row([
            Some(*patient),
            Some("EVOLUCAO"),
            Some("2023-06-01"),
            Some(followup.as_str()),
        ]);
    }
    table
}

fn switching_config() -> PipelineConfig {
    PipelineConfig::builder()
        .parallel(false)
        .medications(&["adalimumabe", "etanercepte", "tofacitinibe"])
        .biologics(&["adalimumabe", "etanercepte", "tofacitinibe"])
        .build()
}

#[test]
fn test_switching_statistics() {
    let output = Pipeline::new(lexicon(), switching_config())
        .run(&switching_table())
        .unwrap();
    let longitudinal = &output.longitudinal;
    assert_eq!(longitudinal.len(), 4);

    let matrix = transition_matrix(longitudinal, &biologics());
    assert_eq!(matrix.get("Adalimumabe", "Tofacitinibe"), 2);
    assert_eq!(matrix.get("Etanercepte", "Adalimumabe"), 1);
    assert_eq!(matrix.total(), 3);

    let sequences = common_sequences(longitudinal, &biologics(), 10);
    assert_eq!(sequences[0].sequence, "Adalimumabe → Tofacitinibe");
    assert_eq!(sequences[0].patients, 2);
    assert_eq!(sequences[1].sequence, "Etanercepte → Adalimumabe");

    let rates = abandonment_rates(longitudinal, &biologics());
    assert_eq!(rates[0].drug, "Etanercepte");
    assert!((rates[0].rate_pct - 100.0).abs() < 1e-9);
    let adalimumabe = rates.iter().find(|r| r.drug == "Adalimumabe").unwrap();
    assert_eq!(adalimumabe.used, 3);
    assert_eq!(adalimumabe.discontinued, 2);
    assert!((adalimumabe.rate_pct - 66.67).abs() < 1e-9);
}

#[test]
fn test_pipeline_attaches_analysis() {
    let output = Pipeline::new(lexicon(), switching_config())
        .run(&switching_table())
        .unwrap();
    let analysis: &SwitchingAnalysis = output.switching.as_ref().unwrap();

    assert_eq!(analysis.rate.total_patients, 4);
    assert_eq!(analysis.rate.switched, 3);
    assert_eq!(analysis.rate.first_biologic, 1);
    assert!((analysis.rate.switch_rate_pct - 75.0).abs() < 1e-9);

    let falha = analysis
        .reasons
        .iter()
        .find(|r| r.drug == "Adalimumabe")
        .unwrap();
    assert_eq!(falha.reason, "Falha");
    assert_eq!(falha.patients, 2);

    // only s4 has a baseline HAQ
    assert_eq!(analysis.efficacy.with_switch.total, 3);
    assert_eq!(analysis.efficacy.without_switch.total, 1);
    assert_eq!(analysis.efficacy.without_switch.improved, 1);
}

#[test]
fn test_no_analysis_without_biologics() {
    let no_biologics = PipelineConfig::builder()
        .parallel(false)
        .biologics(&[])
        .build();
    let output = Pipeline::new(lexicon(), no_biologics)
        .run(&cohort_table())
        .unwrap();
    assert!(output.switching.is_none());

    let output = Pipeline::new(lexicon(), config()).run(&cohort_table()).unwrap();
    assert!(output.switching.is_some());
}
