//! Configuration for a pipeline run.
//!
//! `PipelineConfig` selects which variables are extracted, how record types
//! are mapped to baseline and follow-up, which improvement criteria apply and
//! which patients enter the outcome analysis.

use crate::algorithm::outcome::{ImprovementCriterion, default_criteria};
use crate::lexicon::drugs::METHOTREXATE;
use crate::schema::ColumnNames;
use crate::utils::TimestampFormatConfig;
use std::fmt;

/// Intake record type used as baseline when present
pub const DEFAULT_BASELINE_TYPE: &str = "ANAMNESE";
/// Follow-up record type used when present
pub const DEFAULT_FOLLOWUP_TYPE: &str = "EVOLUCAO";

/// How numeric markers are located in the narrative
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MarkerStrategy {
    /// Keyword token followed by a value within a few tokens
    #[default]
    Token,
    /// The marker's value pattern from the lexicon
    Pattern,
}

impl fmt::Display for MarkerStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Token => write!(f, "token"),
            Self::Pattern => write!(f, "pattern"),
        }
    }
}

/// Which patients of the longitudinal table enter the outcome analysis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TreatmentWindow {
    /// Minimum days between baseline and follow-up; rows with a missing
    /// duration are excluded when set
    pub min_days: Option<i64>,
    /// Exclude rows whose follow-up precedes the baseline
    pub drop_negative: bool,
}

impl TreatmentWindow {
    /// Keep every row
    #[must_use]
    pub const fn unrestricted() -> Self {
        Self {
            min_days: None,
            drop_negative: false,
        }
    }

    /// Require at least `days` of treatment
    #[must_use]
    pub const fn min_days(days: i64) -> Self {
        Self {
            min_days: Some(days),
            drop_negative: false,
        }
    }

    /// Whether a row with this treatment duration is kept
    #[must_use]
    pub fn admits(&self, treatment_days: Option<i64>) -> bool {
        if let Some(min) = self.min_days {
            if !treatment_days.is_some_and(|days| days >= min) {
                return false;
            }
        }
        !(self.drop_negative && treatment_days.is_some_and(|days| days < 0))
    }

    #[must_use]
    pub const fn is_unrestricted(&self) -> bool {
        self.min_days.is_none() && !self.drop_negative
    }
}

/// Configuration for a pipeline run
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Markers to extract, in output column order
    pub markers: Vec<String>,
    /// Comorbidities to flag
    pub comorbidities: Vec<String>,
    /// Medications to classify as `SIM` / `PRÉVIO` / `NÃO`
    pub medications: Vec<String>,
    /// Biologics summarised into the biologic therapy fields
    pub biologics: Vec<String>,
    /// Resolve the rheumatoid factor
    pub rheumatoid_factor: bool,
    pub marker_strategy: MarkerStrategy,
    /// Baseline record type; `None` selects `ANAMNESE` or the first type seen
    pub baseline_type: Option<String>,
    /// Follow-up record type; `None` selects `EVOLUCAO` or the second type seen
    pub followup_type: Option<String>,
    /// Improvement criteria in evaluation order
    pub criteria: Vec<ImprovementCriterion>,
    pub treatment_window: TreatmentWindow,
    /// Extract records in parallel
    pub parallel: bool,
    /// Show a progress bar during extraction
    pub show_progress: bool,
    pub columns: ColumnNames,
    pub timestamp_formats: TimestampFormatConfig,
}

fn owned(names: &[&str]) -> Vec<String> {
    names.iter().map(ToString::to_string).collect()
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            markers: owned(&["vhs", "pcr", "haq", "das28", "cdai"]),
            comorbidities: owned(&["has", "dm", "dlp", "fm", "op"]),
            medications: owned(&[
                "tofacitinibe",
                "upadacitinibe",
                "adalimumabe",
                "etanercepte",
                METHOTREXATE,
            ]),
            biologics: owned(&["tofacitinibe", "upadacitinibe", "adalimumabe", "etanercepte"]),
            rheumatoid_factor: true,
            marker_strategy: MarkerStrategy::Token,
            baseline_type: None,
            followup_type: None,
            criteria: default_criteria(),
            treatment_window: TreatmentWindow::unrestricted(),
            parallel: true,
            show_progress: false,
            columns: ColumnNames::default(),
            timestamp_formats: TimestampFormatConfig::default(),
        }
    }
}

impl PipelineConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder::new()
    }

    /// Whether methotrexate detail (dose, route) is extracted
    #[must_use]
    pub fn methotrexate_detail(&self) -> bool {
        self.medications.iter().any(|name| name == METHOTREXATE)
    }
}

impl fmt::Display for PipelineConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Pipeline Configuration:")?;
        writeln!(f, "  Markers ({}): {}", self.marker_strategy, self.markers.join(", "))?;
        writeln!(f, "  Comorbidities: {}", self.comorbidities.join(", "))?;
        writeln!(f, "  Medications: {}", self.medications.join(", "))?;
        writeln!(f, "  Biologics: {}", self.biologics.join(", "))?;
        writeln!(f, "  Rheumatoid factor: {}", self.rheumatoid_factor)?;
        writeln!(
            f,
            "  Baseline/follow-up: {} / {}",
            self.baseline_type.as_deref().unwrap_or("auto"),
            self.followup_type.as_deref().unwrap_or("auto")
        )?;
        writeln!(
            f,
            "  Criteria: {}",
            self.criteria
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ")
        )?;
        match self.treatment_window.min_days {
            Some(days) => writeln!(f, "  Minimum treatment days: {days}")?,
            None => writeln!(f, "  Minimum treatment days: none")?,
        }
        writeln!(f, "  Drop negative durations: {}", self.treatment_window.drop_negative)?;
        write!(f, "  Parallel: {}", self.parallel)
    }
}

/// Builder for [`PipelineConfig`]
#[derive(Debug, Clone, Default)]
pub struct PipelineConfigBuilder {
    config: PipelineConfig,
}

impl PipelineConfigBuilder {
    /// Create a builder with the default configuration
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: PipelineConfig::default(),
        }
    }

    #[must_use]
    pub fn markers(mut self, markers: &[&str]) -> Self {
        self.config.markers = owned(markers);
        self
    }

    #[must_use]
    pub fn comorbidities(mut self, comorbidities: &[&str]) -> Self {
        self.config.comorbidities = owned(comorbidities);
        self
    }

    #[must_use]
    pub fn medications(mut self, medications: &[&str]) -> Self {
        self.config.medications = owned(medications);
        self
    }

    #[must_use]
    pub fn biologics(mut self, biologics: &[&str]) -> Self {
        self.config.biologics = owned(biologics);
        self
    }

    #[must_use]
    pub const fn rheumatoid_factor(mut self, enabled: bool) -> Self {
        self.config.rheumatoid_factor = enabled;
        self
    }

    #[must_use]
    pub const fn marker_strategy(mut self, strategy: MarkerStrategy) -> Self {
        self.config.marker_strategy = strategy;
        self
    }

    #[must_use]
    pub fn baseline_type(mut self, label: &str) -> Self {
        self.config.baseline_type = Some(label.to_string());
        self
    }

    #[must_use]
    pub fn followup_type(mut self, label: &str) -> Self {
        self.config.followup_type = Some(label.to_string());
        self
    }

    /// Replace the improvement criteria
    #[must_use]
    pub fn criteria(mut self, criteria: Vec<ImprovementCriterion>) -> Self {
        self.config.criteria = criteria;
        self
    }

    #[must_use]
    pub const fn treatment_window(mut self, window: TreatmentWindow) -> Self {
        self.config.treatment_window = window;
        self
    }

    #[must_use]
    pub const fn parallel(mut self, parallel: bool) -> Self {
        self.config.parallel = parallel;
        self
    }

    #[must_use]
    pub const fn show_progress(mut self, show: bool) -> Self {
        self.config.show_progress = show;
        self
    }

    #[must_use]
    pub fn columns(mut self, columns: ColumnNames) -> Self {
        self.config.columns = columns;
        self
    }

    #[must_use]
    pub fn timestamp_formats(mut self, formats: TimestampFormatConfig) -> Self {
        self.config.timestamp_formats = formats;
        self
    }

    #[must_use]
    pub fn build(self) -> PipelineConfig {
        self.config
    }
}
