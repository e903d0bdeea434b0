//! Pipeline stages that run on whole tables
//!
//! This module contains the record processor, the longitudinal reshape,
//! outcome evaluation and the treatment-switch analytics built on top of it.

pub mod longitudinal;
pub mod outcome;
pub mod processor;
pub mod switching;

pub use longitudinal::{Selection, build_longitudinal, select_per_patient};
pub use outcome::{
    ImprovementCriterion, ImprovementPredicate, MarkerEvaluation, default_criteria,
    evaluate_outcomes, evaluate_record,
};
pub use processor::{MIN_RECORD_TYPES, deduplicate, process};
pub use switching::SwitchingAnalysis;
