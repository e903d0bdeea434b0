//! Flat column/cell view of the output tables
//!
//! Consumers that work with named columns (dashboards, exporters) receive a
//! `Table`. Column names follow the input column names for identity fields and
//! the standard output names for extracted variables. Marker and timestamp
//! columns of the longitudinal table carry the `-baseline` / `-followup`
//! suffixes.

use crate::models::enriched::{EnrichedTable, ExtractionLayout};
use crate::models::extraction::{
    BiologicSummary, ComorbidityFlags, DrugUsage, MethotrexateDetail, RheumatoidFactor,
};
use crate::models::longitudinal::LongitudinalTable;
use crate::schema::ColumnNames;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Suffix of baseline marker and timestamp columns
pub const BASELINE_SUFFIX: &str = "-baseline";
/// Suffix of follow-up marker and timestamp columns
pub const FOLLOWUP_SUFFIX: &str = "-followup";

pub const ANY_COMORBIDITY_COLUMN: &str = "comorbidade_qualquer";
pub const COMORBIDITY_COUNT_COLUMN: &str = "num_comorbidades";
pub const TREATMENT_DAYS_COLUMN: &str = "tempo_tratamento_dias";
pub const IMPROVEMENT_COLUMN: &str = "improvement";

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A single table cell
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    Integer(i64),
    Number(f64),
    Text(String),
    Empty,
}

impl Cell {
    fn text(value: Option<&str>) -> Self {
        value.map_or(Self::Empty, |s| Self::Text(s.to_string()))
    }

    fn number(value: Option<f64>) -> Self {
        value.map_or(Self::Empty, Self::Number)
    }

    fn timestamp(value: Option<NaiveDateTime>) -> Self {
        value.map_or(Self::Empty, |ts| {
            Self::Text(ts.format(TIMESTAMP_FORMAT).to_string())
        })
    }

    fn integer(value: impl Into<i64>) -> Self {
        Self::Integer(value.into())
    }

    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Integer(i) => Some(*i as f64),
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }
}

/// Named columns and rows of cells
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl Table {
    #[must_use]
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column == name)
    }

    /// Cell at `row` in column `name`
    #[must_use]
    pub fn get(&self, row: usize, name: &str) -> Option<&Cell> {
        let col = self.column_index(name)?;
        self.rows.get(row).and_then(|cells| cells.get(col))
    }

    /// Rows as JSON objects keyed by column name
    #[must_use]
    pub fn to_json_records(&self) -> Vec<Map<String, Value>> {
        self.rows
            .iter()
            .map(|cells| {
                self.columns
                    .iter()
                    .zip(cells)
                    .map(|(column, cell)| {
                        let value = serde_json::to_value(cell).unwrap_or(Value::Null);
                        (column.clone(), value)
                    })
                    .collect()
            })
            .collect()
    }
}

/// Names of the descriptive (non-marker) extraction columns
fn descriptor_columns(layout: &ExtractionLayout) -> Vec<String> {
    let mut columns = Vec::new();

    if !layout.comorbidities.is_empty() {
        columns.extend(layout.comorbidities.iter().cloned());
        columns.push(ANY_COMORBIDITY_COLUMN.to_string());
        columns.push(COMORBIDITY_COUNT_COLUMN.to_string());
    }
    for medication in &layout.medications {
        columns.push(format!("{medication}_status"));
        columns.push(format!("{medication}_motivo"));
        columns.push(medication.clone());
    }
    if layout.methotrexate {
        columns.extend(
            ["uso_mtx", "mtx_dose_mg_semana", "mtx_via", "motivo_suspensao_mtx"].map(String::from),
        );
    }
    if layout.biologics {
        columns.extend(
            [
                "uso_biologico",
                "biologico_nome",
                "biologico_grupo",
                "num_biologicos_previos",
                "biologico_plano",
            ]
            .map(String::from),
        );
    }
    if layout.rheumatoid_factor {
        columns.extend(["fr_resultado", "fr_valor", "fr_origem"].map(String::from));
    }
    columns
}

/// Borrowed view of the descriptive fields of one row
struct Descriptors<'a> {
    comorbidities: &'a ComorbidityFlags,
    medications: &'a BTreeMap<String, DrugUsage>,
    methotrexate: Option<&'a MethotrexateDetail>,
    biologics: Option<&'a BiologicSummary>,
    rheumatoid_factor: Option<&'a RheumatoidFactor>,
}

impl Descriptors<'_> {
    fn cells(&self, layout: &ExtractionLayout) -> Vec<Cell> {
        let mut cells = Vec::new();

        if !layout.comorbidities.is_empty() {
            for name in &layout.comorbidities {
                cells.push(Cell::integer(self.comorbidities.get(name)));
            }
            cells.push(Cell::integer(self.comorbidities.any()));
            cells.push(Cell::Integer(self.comorbidities.count() as i64));
        }

        for medication in &layout.medications {
            let usage = self.medications.get(medication).cloned().unwrap_or_default();
            cells.push(Cell::Text(usage.status.as_str().to_string()));
            cells.push(Cell::text(usage.reason.as_deref()));
            cells.push(Cell::integer(usage.flag()));
        }

        if layout.methotrexate {
            let detail = self.methotrexate.cloned().unwrap_or_default();
            cells.push(Cell::Text(detail.usage.status.as_str().to_string()));
            cells.push(Cell::number(detail.weekly_dose_mg));
            cells.push(Cell::text(detail.route.map(|r| r.as_str())));
            cells.push(Cell::text(detail.usage.reason.as_deref()));
        }

        if layout.biologics {
            let summary = self.biologics.cloned().unwrap_or_default();
            cells.push(Cell::Text(summary.status.as_str().to_string()));
            cells.push(Cell::text(summary.name.as_deref()));
            cells.push(Cell::text(summary.group.as_deref()));
            cells.push(Cell::Integer(summary.prior_count() as i64));
            cells.push(Cell::Text(summary.plan.as_str().to_string()));
        }

        if layout.rheumatoid_factor {
            let factor = self.rheumatoid_factor.cloned().unwrap_or_default();
            cells.push(Cell::Text(factor.result.as_str().to_string()));
            cells.push(Cell::number(factor.titer));
            cells.push(Cell::text(factor.origin.map(|o| o.as_str())));
        }

        cells
    }
}

impl EnrichedTable {
    /// Flatten to one row per record
    #[must_use]
    pub fn to_table(&self, names: &ColumnNames) -> Table {
        let mut columns = vec![
            names.patient.clone(),
            names.record_type.clone(),
            names.timestamp.clone(),
            names.age.clone(),
            names.sex.clone(),
            names.narrative.clone(),
        ];
        columns.extend(self.layout.markers.iter().cloned());
        columns.extend(descriptor_columns(&self.layout));

        let rows = self
            .records
            .iter()
            .map(|enriched| {
                let record = &enriched.record;
                let extraction = &enriched.extraction;
                let mut cells = vec![
                    Cell::Text(record.patient_id.clone()),
                    Cell::Text(record.record_type.clone()),
                    Cell::timestamp(record.timestamp),
                    record.age.map_or(Cell::Empty, Cell::integer),
                    Cell::text(record.sex.as_deref()),
                    Cell::text(record.narrative.as_deref()),
                ];
                cells.extend(
                    self.layout
                        .markers
                        .iter()
                        .map(|marker| Cell::number(extraction.marker_value(marker))),
                );
                let descriptors = Descriptors {
                    comorbidities: &extraction.comorbidities,
                    medications: &extraction.medications,
                    methotrexate: extraction.methotrexate.as_ref(),
                    biologics: extraction.biologics.as_ref(),
                    rheumatoid_factor: extraction.rheumatoid_factor.as_ref(),
                };
                cells.extend(descriptors.cells(&self.layout));
                cells
            })
            .collect();

        Table { columns, rows }
    }
}

impl LongitudinalTable {
    /// Flatten to one row per patient
    #[must_use]
    pub fn to_table(&self, names: &ColumnNames) -> Table {
        let mut columns = vec![names.patient.clone(), names.age.clone(), names.sex.clone()];
        columns.extend(descriptor_columns(&self.layout));
        for suffix in [BASELINE_SUFFIX, FOLLOWUP_SUFFIX] {
            columns.extend(
                self.layout
                    .markers
                    .iter()
                    .map(|marker| format!("{marker}{suffix}")),
            );
            columns.push(format!("{}{suffix}", names.timestamp));
        }
        columns.push(TREATMENT_DAYS_COLUMN.to_string());
        columns.push(IMPROVEMENT_COLUMN.to_string());

        let rows = self
            .records
            .iter()
            .map(|record| {
                let mut cells = vec![
                    Cell::Text(record.patient_id.clone()),
                    record.age.map_or(Cell::Empty, Cell::integer),
                    Cell::text(record.sex.as_deref()),
                ];
                let profile = &record.profile;
                let descriptors = Descriptors {
                    comorbidities: &profile.comorbidities,
                    medications: &profile.medications,
                    methotrexate: profile.methotrexate.as_ref(),
                    biologics: profile.biologics.as_ref(),
                    rheumatoid_factor: profile.rheumatoid_factor.as_ref(),
                };
                cells.extend(descriptors.cells(&self.layout));

                cells.extend(
                    self.layout
                        .markers
                        .iter()
                        .map(|marker| Cell::number(record.marker(marker).baseline)),
                );
                cells.push(Cell::timestamp(record.baseline_at));
                cells.extend(
                    self.layout
                        .markers
                        .iter()
                        .map(|marker| Cell::number(record.marker(marker).followup)),
                );
                cells.push(Cell::timestamp(record.followup_at));
                cells.push(record.treatment_days.map_or(Cell::Empty, Cell::Integer));
                cells.push(record.improvement.map_or(Cell::Empty, Cell::integer));
                cells
            })
            .collect();

        Table { columns, rows }
    }
}
