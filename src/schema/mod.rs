//! Input table schema: column names, validation and conversion to records
//!
//! The input is row-oriented: a list of column names and rows of optional
//! string cells. Required columns are checked once per run; individual cells
//! that fail to parse are recovered as missing values and counted.

use crate::error::{PipelineError, Result};
use crate::models::RawRecord;
use crate::utils::{TimestampFormatConfig, parse_decimal, parse_timestamp};
use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Names of the input columns
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnNames {
    pub patient: String,
    pub record_type: String,
    pub timestamp: String,
    pub narrative: String,
    /// Optional column
    pub age: String,
    /// Optional column
    pub sex: String,
}

impl Default for ColumnNames {
    fn default() -> Self {
        Self {
            patient: "paciente".to_string(),
            record_type: "tipo".to_string(),
            timestamp: "data_hora".to_string(),
            narrative: "descricao".to_string(),
            age: "idade".to_string(),
            sex: "sexo".to_string(),
        }
    }
}

impl ColumnNames {
    /// Required columns in validation order
    #[must_use]
    pub fn required(&self) -> [&str; 4] {
        [
            &self.patient,
            &self.record_type,
            &self.timestamp,
            &self.narrative,
        ]
    }
}

/// Row-oriented input table
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RawTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Option<String>>>,
}

/// Records converted from a `RawTable` with the cells that had to be dropped
#[derive(Debug, Clone, Default)]
pub struct ParsedRecords {
    pub records: Vec<RawRecord>,
    /// Rows skipped for a missing or blank patient id
    pub missing_patient_ids: usize,
    pub unparseable_timestamps: usize,
    pub unparseable_ages: usize,
}

impl RawTable {
    /// Create an empty table with the given columns
    #[must_use]
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Append a row; short rows are padded with missing cells
    pub fn push_row<I, S>(&mut self, cells: I)
    where
        I: IntoIterator<Item = Option<S>>,
        S: Into<String>,
    {
        let mut row: Vec<Option<String>> = cells.into_iter().map(|c| c.map(Into::into)).collect();
        row.resize(self.columns.len(), None);
        self.rows.push(row);
    }

    /// Build a table from JSON objects, one per row
    ///
    /// Columns are the union of the object keys, in the order they are first seen.
    /// Strings are kept as is, numbers and booleans are rendered as text and
    /// `null` is a missing cell.
    #[must_use]
    pub fn from_json_rows(objects: &[serde_json::Map<String, Value>]) -> Self {
        let mut columns: Vec<String> = Vec::new();
        for object in objects {
            for key in object.keys() {
                if !columns.contains(key) {
                    columns.push(key.clone());
                }
            }
        }

        let rows = objects
            .iter()
            .map(|object| {
                columns
                    .iter()
                    .map(|column| match object.get(column) {
                        None | Some(Value::Null) => None,
                        Some(Value::String(s)) => Some(s.clone()),
                        Some(other) => Some(other.to_string()),
                    })
                    .collect()
            })
            .collect();

        Self { columns, rows }
    }

    /// Position of a column
    #[must_use]
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column == name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Check that every required column is present
    pub fn validate(&self, columns: &ColumnNames) -> Result<()> {
        let missing: Vec<&str> = columns
            .required()
            .into_iter()
            .filter(|name| self.column_index(name).is_none())
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(PipelineError::missing_columns(missing))
        }
    }

    /// Convert rows into records
    ///
    /// Fails with `MissingRequiredColumn` when a required column is absent.
    /// Rows without a patient id are skipped and counted. Unparseable
    /// timestamps and ages become `None` and are counted.
    pub fn to_records(
        &self,
        columns: &ColumnNames,
        formats: &TimestampFormatConfig,
    ) -> Result<ParsedRecords> {
        self.validate(columns)?;

        // Required columns were validated above
        let index = |name: &str| self.column_index(name).unwrap_or(usize::MAX);
        let patient_idx = index(&columns.patient);
        let type_idx = index(&columns.record_type);
        let timestamp_idx = index(&columns.timestamp);
        let narrative_idx = index(&columns.narrative);
        let age_idx = self.column_index(&columns.age);
        let sex_idx = self.column_index(&columns.sex);

        let mut parsed = ParsedRecords {
            records: Vec::with_capacity(self.rows.len()),
            ..ParsedRecords::default()
        };

        for (row_number, row) in self.rows.iter().enumerate() {
            let cell = |idx: usize| row.get(idx).and_then(Option::as_deref);

            let Some(patient_id) = cell(patient_idx)
                .map(str::trim)
                .filter(|id| !id.is_empty())
            else {
                debug!("Row {row_number}: missing patient id, skipped");
                parsed.missing_patient_ids += 1;
                continue;
            };

            let timestamp = cell(timestamp_idx).and_then(|raw| {
                let parsed_ts = parse_timestamp(raw, formats);
                if parsed_ts.is_none() {
                    debug!("Row {row_number}: unparseable timestamp '{raw}'");
                }
                parsed_ts
            });
            let has_timestamp = cell(timestamp_idx).is_some_and(|raw| !raw.trim().is_empty());
            if timestamp.is_none() && has_timestamp {
                parsed.unparseable_timestamps += 1;
            }

            let age_cell = age_idx.and_then(cell);
            let age = age_cell.and_then(parse_age);
            if age.is_none() && age_cell.is_some_and(|raw| !raw.trim().is_empty()) {
                debug!("Row {row_number}: unparseable age '{}'", age_cell.unwrap_or_default());
                parsed.unparseable_ages += 1;
            }

            parsed.records.push(RawRecord {
                patient_id: patient_id.to_string(),
                record_type: cell(type_idx).unwrap_or_default().trim().to_string(),
                timestamp,
                narrative: cell(narrative_idx).map(str::to_string),
                age,
                sex: sex_idx.and_then(cell).map(|s| s.trim().to_string()),
            });
        }

        Ok(parsed)
    }
}

/// Whole years from an age cell such as `45`, `45 anos` or `45.0`
fn parse_age(raw: &str) -> Option<u32> {
    parse_decimal(raw)
        .filter(|years| years.is_finite() && *years >= 0.0 && *years < f64::from(u32::MAX))
        .map(|years| years.trunc() as u32)
}
