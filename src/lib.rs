//! Rule-based extraction of clinical variables from free-text medical notes,
//! with a longitudinal baseline/follow-up reshape and therapy-response
//! outcomes.

pub mod algorithm;
pub mod config;
pub mod error;
pub mod extract;
pub mod lexicon;
pub mod models;
pub mod pipeline;
pub mod schema;
pub mod utils;

// Re-export the most common types for easier use
// Core types
pub use config::{MarkerStrategy, PipelineConfig, TreatmentWindow};
pub use error::{PipelineError, Result};
pub use lexicon::Lexicon;
pub use pipeline::{Pipeline, PipelineOutput};
pub use schema::{ColumnNames, RawTable};

// Models
pub use models::{
    EnrichedRecord, EnrichedTable, LongitudinalRecord, LongitudinalTable, ProcessingReport,
    RawRecord, RecordExtraction, Table,
};

// Stages
pub use algorithm::{
    ImprovementCriterion, ImprovementPredicate, MarkerEvaluation, SwitchingAnalysis,
    build_longitudinal, evaluate_outcomes, process,
};
pub use extract::{ExtractionPlan, extract_record};
