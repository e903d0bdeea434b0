//! Raw clinical note model
//!
//! A `RawRecord` is one row of the input table after column validation and
//! timestamp parsing. Records are immutable input to the pipeline.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// One clinical note for a patient
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRecord {
    /// Patient identifier
    pub patient_id: String,
    /// Record type label, e.g. `ANAMNESE` (intake) or `EVOLUCAO` (follow-up)
    pub record_type: String,
    /// Time of the note; `None` when missing or unparseable
    pub timestamp: Option<NaiveDateTime>,
    /// Free-text narrative
    pub narrative: Option<String>,
    /// Patient age in years
    pub age: Option<u32>,
    /// Patient sex as recorded
    pub sex: Option<String>,
}

impl RawRecord {
    /// Create a record with no timestamp or demographics
    #[must_use]
    pub fn new(
        patient_id: impl Into<String>,
        record_type: impl Into<String>,
        narrative: Option<&str>,
    ) -> Self {
        Self {
            patient_id: patient_id.into(),
            record_type: record_type.into(),
            timestamp: None,
            narrative: narrative.map(str::to_string),
            age: None,
            sex: None,
        }
    }

    /// Set the timestamp
    #[must_use]
    pub const fn with_timestamp(mut self, timestamp: NaiveDateTime) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Set the patient age
    #[must_use]
    pub const fn with_age(mut self, age: u32) -> Self {
        self.age = Some(age);
        self
    }

    /// Set the patient sex
    #[must_use]
    pub fn with_sex(mut self, sex: impl Into<String>) -> Self {
        self.sex = Some(sex.into());
        self
    }
}
