//! Baseline/follow-up reshape
//!
//! Every patient contributes their earliest record of the baseline type and
//! their latest record of the follow-up type. Patients missing either side
//! are left out of the result.

use crate::models::{
    BaselineProfile, EnrichedRecord, EnrichedTable, ExtractionLayout, LongitudinalRecord,
    LongitudinalTable, MarkerPair,
};
use crate::utils::days_between;
use crate::utils::logging::{log_stage_complete, log_stage_start, log_warning};
use chrono::NaiveDateTime;
use std::cmp::Reverse;
use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::time::Instant;

/// Which record of a patient's records of one type is kept
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    /// Smallest timestamp
    Earliest,
    /// Largest timestamp
    Latest,
}

impl Selection {
    /// Whether `candidate` replaces `current`
    ///
    /// Missing timestamps always lose, and ties keep the record seen first.
    fn prefers(self, candidate: Option<NaiveDateTime>, current: Option<NaiveDateTime>) -> bool {
        match (candidate, current) {
            (Some(_), None) => true,
            (None, _) => false,
            (Some(c), Some(k)) => match self {
                Self::Earliest => c < k,
                Self::Latest => Reverse(c) < Reverse(k),
            },
        }
    }
}

/// One record per patient among records of `record_type`, keyed by patient id
#[must_use]
pub fn select_per_patient<'a>(
    records: &'a [EnrichedRecord],
    record_type: &str,
    selection: Selection,
) -> BTreeMap<&'a str, &'a EnrichedRecord> {
    let mut selected: BTreeMap<&str, &EnrichedRecord> = BTreeMap::new();
    for enriched in records
        .iter()
        .filter(|e| e.record.record_type == record_type)
    {
        match selected.entry(enriched.record.patient_id.as_str()) {
            Entry::Vacant(slot) => {
                slot.insert(enriched);
            }
            Entry::Occupied(mut slot) => {
                if selection.prefers(enriched.record.timestamp, slot.get().record.timestamp) {
                    slot.insert(enriched);
                }
            }
        }
    }
    selected
}

fn join_patient(
    baseline: &EnrichedRecord,
    followup: &EnrichedRecord,
    marker_columns: &[String],
) -> LongitudinalRecord {
    let markers = marker_columns
        .iter()
        .map(|marker| {
            (
                marker.clone(),
                MarkerPair {
                    baseline: baseline.extraction.marker_value(marker),
                    followup: followup.extraction.marker_value(marker),
                },
            )
        })
        .collect();

    let baseline_at = baseline.record.timestamp;
    let followup_at = followup.record.timestamp;

    LongitudinalRecord {
        patient_id: baseline.record.patient_id.clone(),
        age: baseline.record.age,
        sex: baseline.record.sex.clone(),
        profile: BaselineProfile::from(baseline.extraction.clone()),
        markers,
        baseline_at,
        followup_at,
        treatment_days: baseline_at
            .zip(followup_at)
            .map(|(start, end)| days_between(start, end)),
        improvement: None,
    }
}

/// Reshape an enriched table into one row per patient
///
/// Demographics and descriptive fields come from the baseline record. Rows
/// are ordered by patient id. An empty join is logged and returned as an
/// empty table.
#[must_use]
pub fn build_longitudinal(
    enriched: &EnrichedTable,
    baseline_type: &str,
    followup_type: &str,
    marker_columns: &[String],
) -> LongitudinalTable {
    let start = Instant::now();
    log_stage_start("Longitudinal build", enriched.len());

    let baselines = select_per_patient(&enriched.records, baseline_type, Selection::Earliest);
    let followups = select_per_patient(&enriched.records, followup_type, Selection::Latest);
    log::info!(
        "{} patients with '{baseline_type}', {} with '{followup_type}'",
        baselines.len(),
        followups.len()
    );

    let records: Vec<LongitudinalRecord> = baselines
        .iter()
        .filter_map(|(patient, baseline)| {
            followups
                .get(patient)
                .map(|followup| join_patient(baseline, followup, marker_columns))
        })
        .collect();

    if records.is_empty() {
        log_warning(
            "No patient has both record types",
            Some(&format!("{baseline_type} / {followup_type}")),
        );
    }

    log_stage_complete("Longitudinal build", records.len(), Some(start.elapsed()));

    LongitudinalTable {
        records,
        layout: ExtractionLayout {
            markers: marker_columns.to_vec(),
            ..enriched.layout.clone()
        },
        baseline_type: baseline_type.to_string(),
        followup_type: followup_type.to_string(),
    }
}
