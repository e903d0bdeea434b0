//! Records annotated with their extraction results

use crate::models::extraction::RecordExtraction;
use crate::models::record::RawRecord;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A raw record together with the variables extracted from its narrative
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedRecord {
    pub record: RawRecord,
    pub extraction: RecordExtraction,
}

/// Which extracted variables a table carries, in output column order
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ExtractionLayout {
    pub markers: Vec<String>,
    pub comorbidities: Vec<String>,
    pub medications: Vec<String>,
    pub methotrexate: bool,
    pub biologics: bool,
    pub rheumatoid_factor: bool,
}

/// Counters collected while processing a batch of records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ProcessingReport {
    /// Rows received
    pub input_rows: usize,
    /// Rows skipped for a missing patient id
    pub missing_patient_ids: usize,
    /// Rows removed as duplicate narratives
    pub duplicates_removed: usize,
    /// Timestamp cells that could not be parsed
    pub unparseable_timestamps: usize,
    /// Age cells that could not be parsed
    pub unparseable_ages: usize,
    /// Captured marker strings that did not yield a number
    pub unparseable_numbers: usize,
    /// Patients with at least two record types
    pub patients_kept: usize,
    /// Patients dropped for having a single record type
    pub patients_dropped: usize,
    /// Rows remaining after all filters
    pub output_rows: usize,
}

impl fmt::Display for ProcessingReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Processing Report:")?;
        writeln!(f, "  Input rows: {}", self.input_rows)?;
        writeln!(f, "  Missing patient ids: {}", self.missing_patient_ids)?;
        writeln!(f, "  Duplicates removed: {}", self.duplicates_removed)?;
        writeln!(f, "  Unparseable timestamps: {}", self.unparseable_timestamps)?;
        writeln!(f, "  Unparseable ages: {}", self.unparseable_ages)?;
        writeln!(f, "  Unparseable numbers: {}", self.unparseable_numbers)?;
        writeln!(
            f,
            "  Patients kept/dropped: {}/{}",
            self.patients_kept, self.patients_dropped
        )?;
        write!(f, "  Output rows: {}", self.output_rows)
    }
}

/// Output of the record processor
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EnrichedTable {
    /// Records in input order
    pub records: Vec<EnrichedRecord>,
    pub layout: ExtractionLayout,
    pub report: ProcessingReport,
}

impl EnrichedTable {
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Distinct record types in order of first appearance
    #[must_use]
    pub fn record_types(&self) -> Vec<String> {
        self.records
            .iter()
            .map(|enriched| enriched.record.record_type.clone())
            .unique()
            .collect()
    }
}
