//! Per-patient baseline vs. follow-up model

use crate::models::enriched::ExtractionLayout;
use crate::models::extraction::{
    BiologicSummary, ComorbidityFlags, DrugUsage, MethotrexateDetail, RecordExtraction,
    RheumatoidFactor,
};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Baseline and follow-up values of one marker
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MarkerPair {
    pub baseline: Option<f64>,
    pub followup: Option<f64>,
}

impl MarkerPair {
    /// Both values, when both are present
    #[must_use]
    pub fn both(&self) -> Option<(f64, f64)> {
        self.baseline.zip(self.followup)
    }
}

/// Descriptive fields taken from the baseline record
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BaselineProfile {
    pub comorbidities: ComorbidityFlags,
    pub medications: BTreeMap<String, DrugUsage>,
    pub methotrexate: Option<MethotrexateDetail>,
    pub biologics: Option<BiologicSummary>,
    pub rheumatoid_factor: Option<RheumatoidFactor>,
}

impl From<RecordExtraction> for BaselineProfile {
    fn from(extraction: RecordExtraction) -> Self {
        Self {
            comorbidities: extraction.comorbidities,
            medications: extraction.medications,
            methotrexate: extraction.methotrexate,
            biologics: extraction.biologics,
            rheumatoid_factor: extraction.rheumatoid_factor,
        }
    }
}

impl BaselineProfile {
    /// Usage of a medication at baseline
    #[must_use]
    pub fn medication(&self, name: &str) -> DrugUsage {
        self.medications.get(name).cloned().unwrap_or_default()
    }

    /// Number of discontinued biologics at baseline, 0 when not extracted
    #[must_use]
    pub fn prior_biologics(&self) -> usize {
        self.biologics
            .as_ref()
            .map_or(0, BiologicSummary::prior_count)
    }
}

/// One patient with both a baseline and a follow-up record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LongitudinalRecord {
    pub patient_id: String,
    /// Demographics of the baseline record
    pub age: Option<u32>,
    pub sex: Option<String>,
    pub profile: BaselineProfile,
    /// Marker pairs keyed by marker name
    pub markers: BTreeMap<String, MarkerPair>,
    pub baseline_at: Option<NaiveDateTime>,
    pub followup_at: Option<NaiveDateTime>,
    /// Whole days from baseline to follow-up; may be negative
    pub treatment_days: Option<i64>,
    /// Improvement label, set by outcome evaluation
    pub improvement: Option<u8>,
}

impl LongitudinalRecord {
    /// Pair for a marker, both sides missing when it was not tracked
    #[must_use]
    pub fn marker(&self, name: &str) -> MarkerPair {
        self.markers.get(name).copied().unwrap_or_default()
    }

    /// Whether a prior biologic was discontinued before baseline
    #[must_use]
    pub fn switched(&self) -> bool {
        self.profile.prior_biologics() > 0
    }
}

/// Output of the longitudinal builder
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LongitudinalTable {
    /// One row per joined patient, ordered by patient id
    pub records: Vec<LongitudinalRecord>,
    pub layout: ExtractionLayout,
    pub baseline_type: String,
    pub followup_type: String,
}

impl LongitudinalTable {
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Share of patients labelled as improved, in percent
    #[must_use]
    pub fn improvement_rate(&self) -> f64 {
        if self.records.is_empty() {
            return 0.0;
        }
        let improved = self
            .records
            .iter()
            .filter(|record| record.improvement == Some(1))
            .count();
        improved as f64 / self.records.len() as f64 * 100.0
    }
}
