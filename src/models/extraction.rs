//! Values produced by the field extractors
//!
//! Each record yields one `RecordExtraction`. Categorical values carry the
//! labels used by downstream consumers (`SIM`, `PRÉVIO`, `NÃO`, `POSITIVO`,
//! ...), exposed through `as_str` and serde.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Usage status of a drug within one note
///
/// Ordered by precedence: `Prior` outranks `Active`, which outranks `Absent`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum UsageStatus {
    /// Never mentioned
    #[serde(rename = "NÃO")]
    Absent,
    /// Mentioned and currently in use
    #[serde(rename = "SIM")]
    Active,
    /// Previously used and discontinued
    #[serde(rename = "PRÉVIO")]
    Prior,
}

impl UsageStatus {
    /// Label of this status
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Absent => "NÃO",
            Self::Active => "SIM",
            Self::Prior => "PRÉVIO",
        }
    }

    /// Whether the drug was mentioned at all
    #[must_use]
    pub const fn is_mentioned(self) -> bool {
        !matches!(self, Self::Absent)
    }
}

impl fmt::Display for UsageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Usage status of one drug plus the discontinuation reason, if any
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrugUsage {
    pub status: UsageStatus,
    pub reason: Option<String>,
}

impl DrugUsage {
    /// A drug that is not mentioned
    #[must_use]
    pub const fn absent() -> Self {
        Self {
            status: UsageStatus::Absent,
            reason: None,
        }
    }

    /// Binary usage flag: 1 when active or prior
    #[must_use]
    pub const fn flag(&self) -> u8 {
        self.status.is_mentioned() as u8
    }
}

impl Default for DrugUsage {
    fn default() -> Self {
        Self::absent()
    }
}

/// Rheumatoid factor result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RheumatoidResult {
    #[serde(rename = "POSITIVO")]
    Positive,
    #[serde(rename = "NEGATIVO")]
    Negative,
    #[serde(rename = "NÃO INFORMADO")]
    NotInformed,
}

impl RheumatoidResult {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Positive => "POSITIVO",
            Self::Negative => "NEGATIVO",
            Self::NotInformed => "NÃO INFORMADO",
        }
    }
}

impl fmt::Display for RheumatoidResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Source that determined the rheumatoid factor fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RheumatoidOrigin {
    /// A numeric titer was found
    #[serde(rename = "LAB")]
    Lab,
    /// A positive/negative phrase was found
    #[serde(rename = "TEXTO")]
    Text,
    /// Inferred from a diagnosis code
    #[serde(rename = "CID")]
    Code,
}

impl RheumatoidOrigin {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Lab => "LAB",
            Self::Text => "TEXTO",
            Self::Code => "CID",
        }
    }
}

/// Rheumatoid factor resolved from one note
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RheumatoidFactor {
    pub result: RheumatoidResult,
    pub titer: Option<f64>,
    pub origin: Option<RheumatoidOrigin>,
}

impl Default for RheumatoidFactor {
    fn default() -> Self {
        Self {
            result: RheumatoidResult::NotInformed,
            titer: None,
            origin: None,
        }
    }
}

/// A numeric marker as captured from the text and after cleanup
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MarkerReading {
    /// Captured string: optional comparison operator followed by the number
    pub raw: Option<String>,
    /// Cleaned numeric value
    pub value: Option<f64>,
}

impl MarkerReading {
    /// A reading holding a raw capture that has not been cleaned yet
    #[must_use]
    pub fn captured(raw: impl Into<String>) -> Self {
        Self {
            raw: Some(raw.into()),
            value: None,
        }
    }
}

/// Methotrexate route of administration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Route {
    #[serde(rename = "SC")]
    Subcutaneous,
    #[serde(rename = "VO")]
    Oral,
    #[serde(rename = "IM")]
    Intramuscular,
}

impl Route {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Subcutaneous => "SC",
            Self::Oral => "VO",
            Self::Intramuscular => "IM",
        }
    }
}

/// Methotrexate usage with dose and route
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethotrexateDetail {
    pub usage: DrugUsage,
    /// Weekly dose in mg
    pub weekly_dose_mg: Option<f64>,
    pub route: Option<Route>,
}

impl Default for MethotrexateDetail {
    fn default() -> Self {
        Self {
            usage: DrugUsage::absent(),
            weekly_dose_mg: None,
            route: None,
        }
    }
}

/// Therapy plan stated in the note
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TherapyPlan {
    /// Switch from one drug to another
    #[serde(rename = "TROCA")]
    Switch,
    /// Start a biologic
    #[serde(rename = "INICIAR")]
    Start,
    #[default]
    #[serde(rename = "NENHUM")]
    None,
}

impl TherapyPlan {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Switch => "TROCA",
            Self::Start => "INICIAR",
            Self::None => "NENHUM",
        }
    }
}

/// A discontinued biologic and the reason given for stopping it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriorBiologic {
    pub name: String,
    pub group: String,
    pub reason: Option<String>,
}

/// Biologic therapy summary across the selected biologics
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BiologicSummary {
    /// `Active` if any biologic is active, else `Prior` if any is prior
    pub status: UsageStatus,
    /// First active biologic, else first prior biologic
    pub name: Option<String>,
    /// Therapeutic group of `name`
    pub group: Option<String>,
    /// Biologics in use, in lexicon order
    pub active: Vec<String>,
    /// Discontinued biologics, in lexicon order
    pub prior: Vec<PriorBiologic>,
    pub plan: TherapyPlan,
}

impl BiologicSummary {
    /// Number of discontinued biologics
    #[must_use]
    pub fn prior_count(&self) -> usize {
        self.prior.len()
    }
}

impl Default for BiologicSummary {
    fn default() -> Self {
        Self {
            status: UsageStatus::Absent,
            name: None,
            group: None,
            active: Vec::new(),
            prior: Vec::new(),
            plan: TherapyPlan::None,
        }
    }
}

/// Comorbidity presence flags with their aggregates
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ComorbidityFlags {
    pub flags: BTreeMap<String, u8>,
}

impl ComorbidityFlags {
    /// 1 if any comorbidity is flagged
    #[must_use]
    pub fn any(&self) -> u8 {
        u8::from(self.flags.values().any(|&flag| flag == 1))
    }

    /// Number of flagged comorbidities
    #[must_use]
    pub fn count(&self) -> usize {
        self.flags.values().filter(|&&flag| flag == 1).count()
    }

    #[must_use]
    pub fn get(&self, name: &str) -> u8 {
        self.flags.get(name).copied().unwrap_or(0)
    }
}

/// Everything extracted from one note
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RecordExtraction {
    /// Selected markers; a marker that was not found is absent from the map
    pub markers: BTreeMap<String, MarkerReading>,
    pub comorbidities: ComorbidityFlags,
    /// Selected medications keyed by canonical name
    pub medications: BTreeMap<String, DrugUsage>,
    pub methotrexate: Option<MethotrexateDetail>,
    pub biologics: Option<BiologicSummary>,
    pub rheumatoid_factor: Option<RheumatoidFactor>,
}

impl RecordExtraction {
    /// Usage of a medication, `NÃO` when it was not selected or not found
    #[must_use]
    pub fn medication(&self, name: &str) -> DrugUsage {
        self.medications.get(name).cloned().unwrap_or_default()
    }

    /// Cleaned value of a marker
    #[must_use]
    pub fn marker_value(&self, name: &str) -> Option<f64> {
        self.markers.get(name).and_then(|reading| reading.value)
    }
}
