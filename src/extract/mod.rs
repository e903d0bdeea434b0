//! Field extractors
//!
//! Each extractor is a pure function of the narrative text and the lexicon.
//! [`ExtractionPlan`] resolves the configured selections against the lexicon
//! once per run; [`extract_record`] then applies every selected extractor to
//! one note and returns a fresh [`RecordExtraction`].

pub mod biologics;
pub mod drug_status;
pub mod flags;
pub mod markers;
pub mod methotrexate;
pub mod rheumatoid;
pub mod rules;

pub use biologics::extract_biologics;
pub use drug_status::{drug_usage, drug_usage_in};
pub use flags::extract_comorbidities;
pub use markers::{extract_by_pattern, extract_by_token};
pub use methotrexate::extract_methotrexate;
pub use rheumatoid::extract_rheumatoid_factor;
pub use rules::RuleSet;

use crate::config::{MarkerStrategy, PipelineConfig};
use crate::lexicon::drugs::METHOTREXATE;
use crate::lexicon::{ComorbidityEntry, DrugEntry, Lexicon, MarkerDefinition};
use crate::models::{ExtractionLayout, RecordExtraction};
use log::{info, warn};

/// Selected lexicon entries for one run
#[derive(Debug, Clone)]
pub struct ExtractionPlan<'a> {
    lexicon: &'a Lexicon,
    strategy: MarkerStrategy,
    markers: Vec<&'a MarkerDefinition>,
    comorbidities: Vec<&'a ComorbidityEntry>,
    medications: Vec<&'a DrugEntry>,
    biologics: Vec<&'a DrugEntry>,
    methotrexate: Option<&'a DrugEntry>,
    rheumatoid_factor: bool,
}

fn resolve<'a, T>(
    kind: &str,
    names: &[String],
    lookup: impl Fn(&str) -> Option<&'a T>,
) -> Vec<&'a T> {
    names
        .iter()
        .filter_map(|name| {
            let entry = lookup(name);
            if entry.is_none() {
                warn!("Unknown {kind} '{name}' is not in the lexicon and will be skipped");
            }
            entry
        })
        .collect()
}

impl<'a> ExtractionPlan<'a> {
    /// Resolve the configured selections; unknown names are logged and skipped
    #[must_use]
    pub fn new(lexicon: &'a Lexicon, config: &PipelineConfig) -> Self {
        let markers = resolve("marker", &config.markers, |name| lexicon.marker(name));
        let comorbidities = resolve("comorbidity", &config.comorbidities, |name| {
            lexicon.comorbidity(name)
        });
        let medications = resolve("medication", &config.medications, |name| lexicon.drug(name));

        let biologics = resolve("biologic", &config.biologics, |name| lexicon.drug(name))
            .into_iter()
            .filter(|drug| {
                if !drug.is_biologic() {
                    warn!(
                        "'{}' is not a biologic and is left out of the biologic summary",
                        drug.name
                    );
                }
                drug.is_biologic()
            })
            .collect();

        if !markers.is_empty() {
            let labels: Vec<&str> = markers.iter().map(|m| m.label.as_str()).collect();
            info!("Tracking markers: {}", labels.join("; "));
        }

        let methotrexate = if config.methotrexate_detail() {
            lexicon.drug(METHOTREXATE)
        } else {
            None
        };

        Self {
            lexicon,
            strategy: config.marker_strategy,
            markers,
            comorbidities,
            medications,
            biologics,
            methotrexate,
            rheumatoid_factor: config.rheumatoid_factor,
        }
    }

    #[must_use]
    pub fn lexicon(&self) -> &'a Lexicon {
        self.lexicon
    }

    /// Output columns produced by this plan
    #[must_use]
    pub fn layout(&self) -> ExtractionLayout {
        ExtractionLayout {
            markers: self.markers.iter().map(|m| m.name.clone()).collect(),
            comorbidities: self.comorbidities.iter().map(|c| c.name.clone()).collect(),
            medications: self.medications.iter().map(|d| d.name.clone()).collect(),
            methotrexate: self.methotrexate.is_some(),
            biologics: !self.biologics.is_empty(),
            rheumatoid_factor: self.rheumatoid_factor,
        }
    }
}

/// Apply every selected extractor to one note
///
/// A missing narrative yields the "not found" value of every variable.
#[must_use]
pub fn extract_record(narrative: Option<&str>, plan: &ExtractionPlan<'_>) -> RecordExtraction {
    let text = narrative.unwrap_or("");
    let lexicon = plan.lexicon;
    let lower = text.to_lowercase();

    let markers = match plan.strategy {
        MarkerStrategy::Token => extract_by_token(text, &plan.markers),
        MarkerStrategy::Pattern => extract_by_pattern(text, &plan.markers),
    };

    let medications = plan
        .medications
        .iter()
        .map(|drug| (drug.name.clone(), drug_usage_in(&lower, drug, lexicon.usage())))
        .collect();

    RecordExtraction {
        markers,
        comorbidities: extract_comorbidities(text, &plan.comorbidities),
        medications,
        methotrexate: plan
            .methotrexate
            .map(|drug| extract_methotrexate(text, drug, lexicon)),
        biologics: (!plan.biologics.is_empty())
            .then(|| extract_biologics(text, &plan.biologics, lexicon)),
        rheumatoid_factor: plan
            .rheumatoid_factor
            .then(|| extract_rheumatoid_factor(text, lexicon.rheumatoid())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{RheumatoidResult, UsageStatus};

    #[test]
    fn test_unknown_selections_are_skipped() {
        let lexicon = Lexicon::standard().unwrap();
        let config = PipelineConfig::builder()
            .markers(&["haq", "unknown_marker"])
            .comorbidities(&["has"])
            .medications(&["adalimumabe", "aspirina"])
            .biologics(&["adalimumabe", "leflunomida"])
            .build();
        let plan = ExtractionPlan::new(&lexicon, &config);
        let layout = plan.layout();

        assert_eq!(layout.markers, vec!["haq"]);
        assert_eq!(layout.medications, vec!["adalimumabe"]);
        assert!(layout.biologics);
        assert!(!layout.methotrexate);
    }

    #[test]
    fn test_extract_record_combines_extractors() {
        let lexicon = Lexicon::standard().unwrap();
        let config = PipelineConfig::default();
        let plan = ExtractionPlan::new(&lexicon, &config);

        let extraction = extract_record(
            Some("HAS, DM. FR positivo. Em uso de MTX 15mg e adalimumabe. HAQ 1,25"),
            &plan,
        );

        assert_eq!(extraction.markers["haq"].raw.as_deref(), Some("1,25"));
        assert_eq!(extraction.comorbidities.get("has"), 1);
        assert_eq!(extraction.comorbidities.get("dm"), 1);
        assert_eq!(extraction.medication("adalimumabe").status, UsageStatus::Active);
        assert_eq!(extraction.medication("etanercepte").status, UsageStatus::Absent);
        assert_eq!(
            extraction.methotrexate.as_ref().and_then(|m| m.weekly_dose_mg),
            Some(15.0)
        );
        assert_eq!(
            extraction.biologics.as_ref().map(|b| b.status),
            Some(UsageStatus::Active)
        );
        assert_eq!(
            extraction.rheumatoid_factor.as_ref().map(|f| f.result),
            Some(RheumatoidResult::Positive)
        );
    }

    #[test]
    fn test_missing_narrative_yields_defaults() {
        let lexicon = Lexicon::standard().unwrap();
        let config = PipelineConfig::default();
        let plan = ExtractionPlan::new(&lexicon, &config);

        let extraction = extract_record(None, &plan);
        assert!(extraction.markers.is_empty());
        assert_eq!(extraction.comorbidities.any(), 0);
        assert!(
            extraction
                .medications
                .values()
                .all(|usage| usage.status == UsageStatus::Absent)
        );
        assert_eq!(
            extraction.rheumatoid_factor.map(|f| f.result),
            Some(RheumatoidResult::NotInformed)
        );
    }

    #[test]
    fn test_extraction_is_idempotent() {
        let lexicon = Lexicon::standard().unwrap();
        let config = PipelineConfig::default();
        let plan = ExtractionPlan::new(&lexicon, &config);
        let text = Some("Fez uso de etanercepte, suspenso por infecção. DAS28 4,1");

        assert_eq!(extract_record(text, &plan), extract_record(text, &plan));
    }
}
