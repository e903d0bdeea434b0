//! Clinical marker definitions
//!
//! Each marker has token keywords for the token-scan strategy and a regular
//! expression whose first capture group is the value for the pattern strategy.

use regex::Regex;

/// A compiled marker definition
#[derive(Debug, Clone)]
pub struct MarkerDefinition {
    /// Output column name
    pub name: String,
    /// Human-readable label
    pub label: String,
    /// Cleaned tokens that introduce a value
    pub keywords: Vec<String>,
    /// Value pattern applied to lower-cased text
    pub pattern: Regex,
}

/// A marker definition before its pattern is compiled
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerSpec {
    pub name: String,
    pub label: String,
    pub keywords: Vec<String>,
    pub pattern: String,
}

impl MarkerSpec {
    #[must_use]
    pub fn new(name: &str, label: &str, keywords: &[&str], pattern: &str) -> Self {
        Self {
            name: name.to_lowercase(),
            label: label.to_string(),
            keywords: keywords.iter().map(|k| k.to_lowercase()).collect(),
            pattern: pattern.to_string(),
        }
    }
}

/// (name, label, keywords, pattern)
pub const STANDARD_MARKERS: &[(&str, &str, &[&str], &str)] = &[
    (
        "vhs",
        "VHS - Velocidade de Hemossedimentação",
        &["vhs", "vss"],
        r"v[hs]s\s*[:\s=]*(\d+[\.,]?\d*)",
    ),
    (
        "leucocitos",
        "Leucócitos",
        &["leucocitos", "leucócitos", "leuco"],
        r"leuc[oó]?c?i?t?o?s?\s*[:\s=]*(\d+[\.,]?\d*)",
    ),
    (
        "pcr",
        "PCR - Proteína C-Reativa",
        &["pcr"],
        r"pcr\s*[:\s=]*(\d+[\.,]?\d*)",
    ),
    (
        "haq",
        "HAQ - Health Assessment Questionnaire",
        &["haq"],
        r"haq\s*[:\s=]*(\d+[\.,]?\d*)",
    ),
    (
        "das28",
        "DAS28 - Disease Activity Score",
        &["das28", "das-28"],
        r"das\s*-?\s*28\s*[:\s=]*(\d+[\.,]?\d*)",
    ),
    (
        "cdai",
        "CDAI - Clinical Disease Activity Index",
        &["cdai"],
        r"cdai\s*[:\s=]*(\d+[\.,]?\d*)",
    ),
    (
        "sdai",
        "SDAI - Simplified Disease Activity Index",
        &["sdai"],
        r"sdai\s*[:\s=]*(\d+[\.,]?\d*)",
    ),
    (
        "basdai",
        "BASDAI - Bath Ankylosing Spondylitis DAI",
        &["basdai"],
        r"basdai\s*[:\s=]*(\d+[\.,]?\d*)",
    ),
    (
        "asdas",
        "ASDAS - Ankylosing Spondylitis DAS",
        &["asdas"],
        r"asdas\s*[:\s=]*(\d+[\.,]?\d*)",
    ),
    (
        "eva_dor",
        "EVA - Escala Visual Analógica de Dor",
        &["eva", "eva_dor"],
        r"eva\s*(?:dor)?\s*[:\s=]*(\d+[\.,]?\d*)",
    ),
];

#[must_use]
pub fn standard_markers() -> Vec<MarkerSpec> {
    STANDARD_MARKERS
        .iter()
        .map(|(name, label, keywords, pattern)| MarkerSpec::new(name, label, keywords, pattern))
        .collect()
}
