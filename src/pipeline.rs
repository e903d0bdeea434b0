//! End-to-end pipeline
//!
//! Raw table → records → processing → longitudinal reshape → outcome
//! evaluation → treatment window. Row-level extraction completes before any
//! aggregation stage starts.

use crate::algorithm::longitudinal::build_longitudinal;
use crate::algorithm::outcome::evaluate_outcomes;
use crate::algorithm::processor::{MIN_RECORD_TYPES, process};
use crate::algorithm::switching::{DEFAULT_TOP_SEQUENCES, SwitchingAnalysis};
use crate::config::{DEFAULT_BASELINE_TYPE, DEFAULT_FOLLOWUP_TYPE, PipelineConfig};
use crate::error::{PipelineError, Result};
use crate::lexicon::Lexicon;
use crate::models::{EnrichedTable, LongitudinalTable, ProcessingReport, Table};
use crate::schema::RawTable;
use crate::utils::logging::log_warning;
use log::info;
use serde::Serialize;
use std::fmt;
use std::time::Instant;

/// Tables and statistics produced by one run
#[derive(Debug, Clone, Serialize)]
pub struct PipelineOutput {
    /// Every processed record with its extracted variables
    pub enriched: EnrichedTable,
    /// One row per patient, after the treatment window
    pub longitudinal: LongitudinalTable,
    pub report: ProcessingReport,
    /// Patients removed by the treatment window
    pub excluded_by_window: usize,
    /// Switching statistics, when biologic statuses were extracted
    pub switching: Option<SwitchingAnalysis>,
}

impl PipelineOutput {
    /// Flat view of the enriched records
    #[must_use]
    pub fn enriched_table(&self, config: &PipelineConfig) -> Table {
        self.enriched.to_table(&config.columns)
    }

    /// Flat view of the longitudinal table
    #[must_use]
    pub fn longitudinal_table(&self, config: &PipelineConfig) -> Table {
        self.longitudinal.to_table(&config.columns)
    }
}

impl fmt::Display for PipelineOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.report)?;
        writeln!(
            f,
            "Longitudinal: {} patients ({} / {}), {} excluded by treatment window",
            self.longitudinal.len(),
            self.longitudinal.baseline_type,
            self.longitudinal.followup_type,
            self.excluded_by_window
        )?;
        write!(
            f,
            "Improvement rate: {:.1}%",
            self.longitudinal.improvement_rate()
        )
    }
}

/// Pick the baseline and follow-up labels among the available record types
///
/// A configured label absent from `available` is kept with a warning and
/// yields an empty join. Without configuration the baseline is `ANAMNESE`
/// when present, else the first type, and the follow-up is `EVOLUCAO` when
/// present, else the first other type.
pub fn resolve_record_types(
    available: &[String],
    baseline: Option<&str>,
    followup: Option<&str>,
) -> Result<(String, String)> {
    if available.len() < MIN_RECORD_TYPES {
        return Err(PipelineError::InsufficientRecordTypes {
            found: available.to_vec(),
        });
    }

    let present = |label: &str| available.iter().any(|t| t == label);
    let configured = |label: &str| {
        if !present(label) {
            log_warning(
                &format!("Record type '{label}' not found after processing"),
                Some(&format!("available: [{}]", available.join(", "))),
            );
        }
        label.to_string()
    };

    let baseline = match baseline {
        Some(label) => configured(label),
        None if present(DEFAULT_BASELINE_TYPE) => DEFAULT_BASELINE_TYPE.to_string(),
        None => available[0].clone(),
    };
    let followup = match followup {
        Some(label) => configured(label),
        None if present(DEFAULT_FOLLOWUP_TYPE) && baseline != DEFAULT_FOLLOWUP_TYPE => {
            DEFAULT_FOLLOWUP_TYPE.to_string()
        }
        None => available
            .iter()
            .find(|t| **t != baseline)
            .cloned()
            .unwrap_or_else(|| available[1].clone()),
    };

    Ok((baseline, followup))
}

/// A configured extraction pipeline
#[derive(Debug, Clone)]
pub struct Pipeline {
    lexicon: Lexicon,
    config: PipelineConfig,
}

impl Pipeline {
    #[must_use]
    pub const fn new(lexicon: Lexicon, config: PipelineConfig) -> Self {
        Self { lexicon, config }
    }

    /// Pipeline over the standard lexicon
    pub fn standard(config: PipelineConfig) -> Result<Self> {
        Ok(Self::new(Lexicon::standard()?, config))
    }

    #[must_use]
    pub const fn lexicon(&self) -> &Lexicon {
        &self.lexicon
    }

    #[must_use]
    pub const fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run every stage over a raw table
    pub fn run(&self, table: &RawTable) -> Result<PipelineOutput> {
        let start = Instant::now();
        info!("Starting pipeline on {} rows", table.len());
        info!("{}", self.config);

        let parsed = table.to_records(&self.config.columns, &self.config.timestamp_formats)?;
        let unparseable_timestamps = parsed.unparseable_timestamps;
        let unparseable_ages = parsed.unparseable_ages;
        let missing_patient_ids = parsed.missing_patient_ids;

        let mut enriched = process(parsed.records, &self.lexicon, &self.config)?;
        enriched.report.unparseable_timestamps = unparseable_timestamps;
        enriched.report.unparseable_ages = unparseable_ages;
        enriched.report.missing_patient_ids = missing_patient_ids;
        enriched.report.input_rows = table.len();

        let (baseline_type, followup_type) = resolve_record_types(
            &enriched.record_types(),
            self.config.baseline_type.as_deref(),
            self.config.followup_type.as_deref(),
        )?;
        info!("Baseline type '{baseline_type}', follow-up type '{followup_type}'");

        let markers = enriched.layout.markers.clone();
        let mut longitudinal =
            build_longitudinal(&enriched, &baseline_type, &followup_type, &markers);

        if !self.config.criteria.is_empty() {
            longitudinal = evaluate_outcomes(longitudinal, &self.config.criteria);
        }

        let before = longitudinal.len();
        let window = self.config.treatment_window;
        longitudinal
            .records
            .retain(|record| window.admits(record.treatment_days));
        let excluded_by_window = before - longitudinal.len();
        if !window.is_unrestricted() {
            info!("Treatment window excluded {excluded_by_window} of {before} patients");
        }

        let switching = self.switching_analysis(&longitudinal);

        info!("Pipeline finished in {:?}", start.elapsed());

        Ok(PipelineOutput {
            report: enriched.report,
            enriched,
            longitudinal,
            excluded_by_window,
            switching,
        })
    }

    /// Switching statistics over the configured biologics with a status column
    fn switching_analysis(&self, longitudinal: &LongitudinalTable) -> Option<SwitchingAnalysis> {
        if !longitudinal.layout.biologics {
            return None;
        }
        let drugs: Vec<String> = self
            .config
            .biologics
            .iter()
            .filter(|drug| longitudinal.layout.medications.contains(drug))
            .cloned()
            .collect();
        if drugs.is_empty() {
            return None;
        }
        Some(SwitchingAnalysis::compute(
            longitudinal,
            &drugs,
            DEFAULT_TOP_SEQUENCES,
        ))
    }
}
