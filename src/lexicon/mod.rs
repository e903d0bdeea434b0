//! Lexicon of clinical terms and patterns
//!
//! The lexicon is an immutable registry of everything the extractors match
//! against: drug aliases and groups, comorbidity synonyms, marker keywords and
//! value patterns, rheumatoid factor phrases and diagnosis codes, and drug
//! usage phrases. It is built once and passed by reference to every extractor.
//!
//! ```
//! use chart_etl::lexicon::{DrugEntry, Lexicon};
//!
//! let lexicon = Lexicon::builder()
//!     .with_standard_tables()
//!     .drug(DrugEntry::biologic("sarilumabe", &["sarilumabe", "kevzara"], "Anti-IL/Outros"))
//!     .build()
//!     .unwrap();
//! assert!(lexicon.drug("sarilumabe").is_some());
//! ```

pub mod comorbidities;
pub mod drugs;
pub mod markers;
pub mod rheumatoid;
pub mod usage;

pub use comorbidities::ComorbidityEntry;
pub use drugs::{DrugClass, DrugEntry};
pub use markers::{MarkerDefinition, MarkerSpec};
pub use rheumatoid::RheumatoidPatterns;
pub use usage::UsagePatterns;

use crate::error::{PipelineError, Result};
use crate::models::{RheumatoidResult, Route};
use regex::Regex;
use rustc_hash::FxHashMap;

/// Methotrexate dose/route and therapy-plan patterns
#[derive(Debug, Clone)]
pub struct TherapyPatterns {
    pub methotrexate_dose: Regex,
    /// Route patterns in test order
    pub methotrexate_routes: Vec<(Route, Regex)>,
    pub switch_plan: Regex,
    /// `iniciar <biologic>`; `None` when the lexicon has no biologics
    pub start_plan: Option<Regex>,
}

/// Immutable registry of terms and patterns
#[derive(Debug, Clone)]
pub struct Lexicon {
    drugs: Vec<DrugEntry>,
    comorbidities: Vec<ComorbidityEntry>,
    markers: Vec<MarkerDefinition>,
    rheumatoid: RheumatoidPatterns,
    usage: UsagePatterns,
    therapy: TherapyPatterns,
    drug_index: FxHashMap<String, usize>,
    comorbidity_index: FxHashMap<String, usize>,
    marker_index: FxHashMap<String, usize>,
}

impl Lexicon {
    /// Lexicon with the standard tables
    pub fn standard() -> Result<Self> {
        LexiconBuilder::new().with_standard_tables().build()
    }

    /// Empty builder; rheumatoid factor and usage patterns default to the standard ones
    #[must_use]
    pub fn builder() -> LexiconBuilder {
        LexiconBuilder::new()
    }

    /// All drugs in table order
    #[must_use]
    pub fn drugs(&self) -> &[DrugEntry] {
        &self.drugs
    }

    #[must_use]
    pub fn drug(&self, name: &str) -> Option<&DrugEntry> {
        self.drug_index.get(name).map(|&i| &self.drugs[i])
    }

    /// Biologics in table order
    pub fn biologics(&self) -> impl Iterator<Item = &DrugEntry> {
        self.drugs.iter().filter(|drug| drug.is_biologic())
    }

    #[must_use]
    pub fn comorbidities(&self) -> &[ComorbidityEntry] {
        &self.comorbidities
    }

    #[must_use]
    pub fn comorbidity(&self, name: &str) -> Option<&ComorbidityEntry> {
        self.comorbidity_index
            .get(name)
            .map(|&i| &self.comorbidities[i])
    }

    #[must_use]
    pub fn markers(&self) -> &[MarkerDefinition] {
        &self.markers
    }

    #[must_use]
    pub fn marker(&self, name: &str) -> Option<&MarkerDefinition> {
        self.marker_index.get(name).map(|&i| &self.markers[i])
    }

    #[must_use]
    pub fn rheumatoid(&self) -> &RheumatoidPatterns {
        &self.rheumatoid
    }

    #[must_use]
    pub fn usage(&self) -> &UsagePatterns {
        &self.usage
    }

    #[must_use]
    pub fn therapy(&self) -> &TherapyPatterns {
        &self.therapy
    }
}

/// Builder for [`Lexicon`]
///
/// Entries added with the same name replace the earlier entry in place.
/// Patterns are compiled by [`LexiconBuilder::build`].
#[derive(Debug, Clone)]
pub struct LexiconBuilder {
    drugs: Vec<DrugEntry>,
    comorbidities: Vec<ComorbidityEntry>,
    markers: Vec<MarkerSpec>,
    positive_patterns: Vec<String>,
    negative_patterns: Vec<String>,
    value_pattern: String,
    code_pattern: String,
    code_results: Vec<(String, RheumatoidResult)>,
    active_patterns: Vec<String>,
    discontinued_patterns: Vec<String>,
    reasons: Vec<String>,
}

impl Default for LexiconBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn owned(patterns: &[&str]) -> Vec<String> {
    patterns.iter().map(ToString::to_string).collect()
}

fn upsert<T>(entries: &mut Vec<T>, entry: T, same: impl Fn(&T, &T) -> bool) {
    match entries.iter().position(|existing| same(existing, &entry)) {
        Some(i) => entries[i] = entry,
        None => entries.push(entry),
    }
}

fn compile(name: &str, pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|source| PipelineError::invalid_pattern(name, source))
}

/// Aliases and reasons are matched as substrings, so a blank one would match every text
fn check_terms(name: &str, terms: &[String]) -> Result<()> {
    if terms.iter().any(|term| term.trim().is_empty()) {
        return Err(PipelineError::EmptyAlias {
            name: name.to_string(),
        });
    }
    Ok(())
}

fn compile_all(name: &str, patterns: &[String]) -> Result<Vec<Regex>> {
    patterns
        .iter()
        .enumerate()
        .map(|(i, pattern)| compile(&format!("{name}[{i}]"), pattern))
        .collect()
}

impl LexiconBuilder {
    /// Builder with no drugs, comorbidities or markers
    #[must_use]
    pub fn new() -> Self {
        Self {
            drugs: Vec::new(),
            comorbidities: Vec::new(),
            markers: Vec::new(),
            positive_patterns: owned(rheumatoid::POSITIVE_PATTERNS),
            negative_patterns: owned(rheumatoid::NEGATIVE_PATTERNS),
            value_pattern: rheumatoid::VALUE_PATTERN.to_string(),
            code_pattern: rheumatoid::CODE_PATTERN.to_string(),
            code_results: rheumatoid::CODE_RESULTS
                .iter()
                .map(|(code, result)| ((*code).to_string(), *result))
                .collect(),
            active_patterns: owned(usage::ACTIVE_PATTERNS),
            discontinued_patterns: owned(usage::DISCONTINUED_PATTERNS),
            reasons: owned(usage::DISCONTINUATION_REASONS),
        }
    }

    /// Add the standard drug, comorbidity and marker tables
    #[must_use]
    pub fn with_standard_tables(mut self) -> Self {
        for drug in drugs::standard_drugs() {
            self = self.drug(drug);
        }
        for comorbidity in comorbidities::standard_comorbidities() {
            self = self.comorbidity(comorbidity);
        }
        for marker in markers::standard_markers() {
            self = self.marker(marker);
        }
        self
    }

    #[must_use]
    pub fn drug(mut self, entry: DrugEntry) -> Self {
        upsert(&mut self.drugs, entry, |a, b| a.name == b.name);
        self
    }

    #[must_use]
    pub fn comorbidity(mut self, entry: ComorbidityEntry) -> Self {
        upsert(&mut self.comorbidities, entry, |a, b| a.name == b.name);
        self
    }

    #[must_use]
    pub fn marker(mut self, spec: MarkerSpec) -> Self {
        upsert(&mut self.markers, spec, |a, b| a.name == b.name);
        self
    }

    /// Replace the rheumatoid factor phrase patterns
    #[must_use]
    pub fn rheumatoid_phrases(mut self, positive: &[&str], negative: &[&str]) -> Self {
        self.positive_patterns = owned(positive);
        self.negative_patterns = owned(negative);
        self
    }

    /// Map a diagnosis code to a rheumatoid factor result
    #[must_use]
    pub fn diagnosis_code(mut self, code: &str, result: RheumatoidResult) -> Self {
        let code = rheumatoid::normalize_code(code);
        upsert(&mut self.code_results, (code, result), |a, b| a.0 == b.0);
        self
    }

    /// Replace the activity and discontinuation phrase patterns
    #[must_use]
    pub fn usage_phrases(mut self, active: &[&str], discontinued: &[&str]) -> Self {
        self.active_patterns = owned(active);
        self.discontinued_patterns = owned(discontinued);
        self
    }

    /// Replace the discontinuation reason vocabulary
    #[must_use]
    pub fn discontinuation_reasons(mut self, reasons: &[&str]) -> Self {
        self.reasons = reasons.iter().map(|r| r.to_lowercase()).collect();
        self
    }

    /// Compile all patterns and freeze the lexicon
    ///
    /// Fails with `InvalidPattern` naming the first entry whose pattern does
    /// not compile, and with `EmptyAlias` for a blank alias or reason.
    pub fn build(self) -> Result<Lexicon> {
        for drug in &self.drugs {
            check_terms(&drug.name, &drug.aliases)?;
        }
        for comorbidity in &self.comorbidities {
            check_terms(&comorbidity.name, &comorbidity.aliases)?;
        }
        check_terms("discontinuation_reasons", &self.reasons)?;

        let markers = self
            .markers
            .into_iter()
            .map(|spec| {
                let pattern = compile(&spec.name, &spec.pattern)?;
                Ok(MarkerDefinition {
                    name: spec.name,
                    label: spec.label,
                    keywords: spec.keywords,
                    pattern,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let rheumatoid = RheumatoidPatterns {
            positive: compile_all("rheumatoid_positive", &self.positive_patterns)?,
            negative: compile_all("rheumatoid_negative", &self.negative_patterns)?,
            value: compile("rheumatoid_value", &self.value_pattern)?,
            code: compile("rheumatoid_code", &self.code_pattern)?,
            code_results: self.code_results.into_iter().collect(),
        };

        let usage = UsagePatterns {
            active: compile_all("usage_active", &self.active_patterns)?,
            discontinued: compile_all("usage_discontinued", &self.discontinued_patterns)?,
            reasons: self.reasons,
        };

        let methotrexate_routes = drugs::METHOTREXATE_ROUTE_PATTERNS
            .iter()
            .zip([Route::Subcutaneous, Route::Oral, Route::Intramuscular])
            .map(|((label, pattern), route)| {
                Ok((route, compile(&format!("methotrexate_route_{label}"), pattern)?))
            })
            .collect::<Result<Vec<_>>>()?;

        let biologic_names: Vec<String> = self
            .drugs
            .iter()
            .filter(|drug| drug.is_biologic())
            .map(|drug| regex::escape(&drug.name))
            .collect();
        let start_plan = if biologic_names.is_empty() {
            None
        } else {
            Some(compile(
                "start_plan",
                &format!(r"iniciar\s+(?:{})", biologic_names.join("|")),
            )?)
        };

        let therapy = TherapyPatterns {
            methotrexate_dose: compile("methotrexate_dose", drugs::METHOTREXATE_DOSE_PATTERN)?,
            methotrexate_routes,
            switch_plan: compile("switch_plan", drugs::SWITCH_PLAN_PATTERN)?,
            start_plan,
        };

        let index_of = |names: Vec<&String>| -> FxHashMap<String, usize> {
            names
                .into_iter()
                .enumerate()
                .map(|(i, name)| (name.clone(), i))
                .collect()
        };
        let drug_index = index_of(self.drugs.iter().map(|d| &d.name).collect());
        let comorbidity_index = index_of(self.comorbidities.iter().map(|c| &c.name).collect());
        let marker_index = index_of(markers.iter().map(|m| &m.name).collect());

        Ok(Lexicon {
            drugs: self.drugs,
            comorbidities: self.comorbidities,
            markers,
            rheumatoid,
            usage,
            therapy,
            drug_index,
            comorbidity_index,
            marker_index,
        })
    }
}
