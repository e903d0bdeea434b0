//! Therapy-response evaluation
//!
//! Criteria are an ordered list of (marker, predicate). For each patient the
//! first marker with both a baseline and a follow-up value decides the label;
//! a patient for whom no criterion resolves is labelled as not improved.

use crate::models::{LongitudinalRecord, LongitudinalTable};
use crate::utils::logging::{log_stage_complete, log_stage_start};
use std::fmt;
use std::sync::Arc;
use std::time::Instant;

type Comparison = Arc<dyn Fn(f64, f64) -> bool + Send + Sync>;

/// Decides whether a (baseline, follow-up) pair counts as improvement
#[derive(Clone)]
pub enum ImprovementPredicate {
    /// Follow-up at most baseline minus the threshold
    AbsoluteReduction(f64),
    /// Follow-up at most baseline reduced by the given percentage
    PercentageReduction(f64),
    /// Caller-supplied comparison of (baseline, follow-up)
    Custom(Comparison),
}

impl ImprovementPredicate {
    /// Wrap a closure of (baseline, follow-up)
    #[must_use]
    pub fn custom(f: impl Fn(f64, f64) -> bool + Send + Sync + 'static) -> Self {
        Self::Custom(Arc::new(f))
    }

    #[must_use]
    pub fn is_improved(&self, baseline: f64, followup: f64) -> bool {
        match self {
            Self::AbsoluteReduction(threshold) => followup <= baseline - threshold,
            Self::PercentageReduction(pct) => followup <= baseline * (1.0 - pct / 100.0),
            Self::Custom(f) => f(baseline, followup),
        }
    }
}

impl fmt::Debug for ImprovementPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AbsoluteReduction(t) => f.debug_tuple("AbsoluteReduction").field(t).finish(),
            Self::PercentageReduction(p) => f.debug_tuple("PercentageReduction").field(p).finish(),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

impl fmt::Display for ImprovementPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AbsoluteReduction(t) => write!(f, "reduction >= {t}"),
            Self::PercentageReduction(p) => write!(f, "reduction >= {p}%"),
            Self::Custom(_) => write!(f, "custom"),
        }
    }
}

/// Outcome of one criterion for one patient
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerEvaluation {
    /// Baseline or follow-up value missing
    Unresolved,
    Improved,
    NotImproved,
}

impl MarkerEvaluation {
    #[must_use]
    pub const fn is_resolved(self) -> bool {
        !matches!(self, Self::Unresolved)
    }
}

/// A marker and the predicate applied to its value pair
#[derive(Debug, Clone)]
pub struct ImprovementCriterion {
    pub marker: String,
    pub predicate: ImprovementPredicate,
}

impl ImprovementCriterion {
    #[must_use]
    pub fn new(marker: &str, predicate: ImprovementPredicate) -> Self {
        Self {
            marker: marker.to_string(),
            predicate,
        }
    }

    /// Improvement when the marker drops by at least `threshold`
    #[must_use]
    pub fn absolute(marker: &str, threshold: f64) -> Self {
        Self::new(marker, ImprovementPredicate::AbsoluteReduction(threshold))
    }

    /// Improvement when the marker drops by at least `pct` percent
    #[must_use]
    pub fn percentage(marker: &str, pct: f64) -> Self {
        Self::new(marker, ImprovementPredicate::PercentageReduction(pct))
    }

    #[must_use]
    pub fn custom(marker: &str, f: impl Fn(f64, f64) -> bool + Send + Sync + 'static) -> Self {
        Self::new(marker, ImprovementPredicate::custom(f))
    }

    #[must_use]
    pub fn evaluate(&self, record: &LongitudinalRecord) -> MarkerEvaluation {
        match record.marker(&self.marker).both() {
            None => MarkerEvaluation::Unresolved,
            Some((baseline, followup)) if self.predicate.is_improved(baseline, followup) => {
                MarkerEvaluation::Improved
            }
            Some(_) => MarkerEvaluation::NotImproved,
        }
    }
}

impl fmt::Display for ImprovementCriterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.marker, self.predicate)
    }
}

/// HAQ drop of 0.35, DAS28 drop of 50%, CDAI drop of 10, in that order
#[must_use]
pub fn default_criteria() -> Vec<ImprovementCriterion> {
    vec![
        ImprovementCriterion::absolute("haq", 0.35),
        ImprovementCriterion::percentage("das28", 50.0),
        ImprovementCriterion::absolute("cdai", 10.0),
    ]
}

/// First resolved evaluation in criteria order
#[must_use]
pub fn evaluate_record(
    record: &LongitudinalRecord,
    criteria: &[ImprovementCriterion],
) -> MarkerEvaluation {
    criteria
        .iter()
        .map(|criterion| criterion.evaluate(record))
        .find(|evaluation| evaluation.is_resolved())
        .unwrap_or(MarkerEvaluation::Unresolved)
}

/// Label every patient with 1 (improved) or 0
#[must_use]
pub fn evaluate_outcomes(
    mut table: LongitudinalTable,
    criteria: &[ImprovementCriterion],
) -> LongitudinalTable {
    let start = Instant::now();
    log_stage_start("Outcome evaluation", table.len());

    for record in &mut table.records {
        let label = match evaluate_record(record, criteria) {
            MarkerEvaluation::Improved => 1,
            MarkerEvaluation::NotImproved | MarkerEvaluation::Unresolved => 0,
        };
        record.improvement = Some(label);
    }

    log_stage_complete("Outcome evaluation", table.len(), Some(start.elapsed()));
    log::info!("Improvement rate: {:.1}%", table.improvement_rate());
    table
}
