//! Record processing: deduplication, extraction, numeric cleanup and patient filtering
//!
//! Extraction is row-independent, so records are mapped in parallel with
//! rayon when enabled. The map preserves input order and shares no mutable
//! state; the aggregation steps run after it completes.

use crate::config::PipelineConfig;
use crate::error::Result;
use crate::extract::{ExtractionPlan, extract_record};
use crate::lexicon::Lexicon;
use crate::models::{EnrichedRecord, EnrichedTable, ProcessingReport, RawRecord, RecordExtraction};
use crate::utils::logging::{
    create_main_progress_bar, finish_progress_bar, log_stage_complete, log_stage_start,
};
use crate::utils::parse_decimal;
use indicatif::ParallelProgressIterator;
use log::{debug, info};
use rayon::prelude::*;
use rustc_hash::{FxHashMap, FxHashSet};
use std::time::Instant;

/// Minimum number of distinct record types a patient needs
pub const MIN_RECORD_TYPES: usize = 2;

/// Keep the first record of every distinct narrative
///
/// Two missing narratives count as equal. Returns the kept records and the
/// number removed.
#[must_use]
pub fn deduplicate(records: Vec<RawRecord>) -> (Vec<RawRecord>, usize) {
    let total = records.len();
    let mut seen: FxHashSet<Option<String>> = FxHashSet::default();
    let kept: Vec<RawRecord> = records
        .into_iter()
        .filter(|record| seen.insert(record.narrative.clone()))
        .collect();
    let removed = total - kept.len();
    (kept, removed)
}

/// Extract every record, in parallel when configured
fn extract_all(
    records: &[RawRecord],
    plan: &ExtractionPlan<'_>,
    config: &PipelineConfig,
) -> Vec<RecordExtraction> {
    if !config.parallel {
        return records
            .iter()
            .map(|record| extract_record(record.narrative.as_deref(), plan))
            .collect();
    }

    let min_len = (records.len() / (num_cpus::get() * 4)).max(1);
    if config.show_progress {
        let pb = create_main_progress_bar(records.len() as u64, Some("Extracting variables"));
        let extractions = records
            .par_iter()
            .with_min_len(min_len)
            .progress_with(pb.clone())
            .map(|record| extract_record(record.narrative.as_deref(), plan))
            .collect();
        finish_progress_bar(&pb, Some("Extraction complete"));
        extractions
    } else {
        records
            .par_iter()
            .with_min_len(min_len)
            .map(|record| extract_record(record.narrative.as_deref(), plan))
            .collect()
    }
}

/// Parse every captured marker string into a number
///
/// Returns the number of captures that did not yield a number.
pub fn clean_numeric_markers(extractions: &mut [RecordExtraction]) -> usize {
    let mut unparseable = 0;
    for extraction in extractions.iter_mut() {
        for (marker, reading) in &mut extraction.markers {
            reading.value = reading.raw.as_deref().and_then(parse_decimal);
            if reading.value.is_none() && reading.raw.is_some() {
                debug!(
                    "Marker '{marker}': unparseable value '{}'",
                    reading.raw.as_deref().unwrap_or_default()
                );
                unparseable += 1;
            }
        }
    }
    unparseable
}

/// Patients with at least [`MIN_RECORD_TYPES`] distinct record types
#[must_use]
pub fn patients_with_multiple_types(records: &[EnrichedRecord]) -> FxHashSet<String> {
    let mut types_by_patient: FxHashMap<&str, FxHashSet<&str>> = FxHashMap::default();
    for enriched in records {
        types_by_patient
            .entry(enriched.record.patient_id.as_str())
            .or_default()
            .insert(enriched.record.record_type.as_str());
    }
    types_by_patient
        .into_iter()
        .filter(|(_, types)| types.len() >= MIN_RECORD_TYPES)
        .map(|(patient, _)| patient.to_string())
        .collect()
}

/// Deduplicate, extract and clean records, then drop single-type patients
pub fn process(
    records: Vec<RawRecord>,
    lexicon: &Lexicon,
    config: &PipelineConfig,
) -> Result<EnrichedTable> {
    let start = Instant::now();
    log_stage_start("Record processing", records.len());

    let mut report = ProcessingReport {
        input_rows: records.len(),
        ..ProcessingReport::default()
    };

    let (records, duplicates) = deduplicate(records);
    report.duplicates_removed = duplicates;
    info!("Removed {duplicates} duplicate narratives");

    let plan = ExtractionPlan::new(lexicon, config);
    let mut extractions = extract_all(&records, &plan, config);
    report.unparseable_numbers = clean_numeric_markers(&mut extractions);

    let enriched: Vec<EnrichedRecord> = records
        .into_iter()
        .zip(extractions)
        .map(|(record, extraction)| EnrichedRecord { record, extraction })
        .collect();

    let valid = patients_with_multiple_types(&enriched);
    let total_patients = enriched
        .iter()
        .map(|e| e.record.patient_id.as_str())
        .collect::<FxHashSet<_>>()
        .len();
    report.patients_kept = valid.len();
    report.patients_dropped = total_patients - valid.len();

    let enriched: Vec<EnrichedRecord> = enriched
        .into_iter()
        .filter(|e| valid.contains(&e.record.patient_id))
        .collect();
    report.output_rows = enriched.len();
    info!(
        "{} valid patients, {} dropped with fewer than {MIN_RECORD_TYPES} record types",
        report.patients_kept, report.patients_dropped
    );

    log_stage_complete("Record processing", enriched.len(), Some(start.elapsed()));

    Ok(EnrichedTable {
        records: enriched,
        layout: plan.layout(),
        report,
    })
}
