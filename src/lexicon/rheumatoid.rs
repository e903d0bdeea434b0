//! Rheumatoid factor phrase patterns and diagnosis-code mapping

use crate::models::RheumatoidResult;
use regex::Regex;
use rustc_hash::FxHashMap;

/// Phrases reporting a positive factor, applied to lower-cased text
pub const POSITIVE_PATTERNS: &[&str] = &[
    r"\bfr\s*\+",
    r"\bfr\s*positivo",
    r"\bfr\s*reagente",
    r"\(fr\s*\+\)",
    r"fator\s+reumat[oó]ide\s*(positivo|reagente|\+)",
    r"soropositiv[ao]",
    r"ar\s*\(?\s*fr\s*\+\s*\)?",
    r"\bfr\s*[:\s]+\d+[\.,]?\d*\s*\(?positivo\)?",
];

/// Phrases reporting a negative factor, applied to lower-cased text
///
/// `fr -` must not be followed by a digit; the trailing class consumes one
/// character instead of looking ahead.
pub const NEGATIVE_PATTERNS: &[&str] = &[
    r"\bfr\s*-(?:[^\d]|$)",
    r"\bfr\s*negativo",
    r"\bfr\s*n[aã]o\s*reagente",
    r"\(fr\s*-\)",
    r"fator\s+reumat[oó]ide\s*(negativo|n[aã]o\s*reagente|-)",
    r"soronegativ[ao]",
    r"\bfr\s*[:\s]+\d+[\.,]?\d*\s*\(?(neg|negativo)\)?",
];

/// Numeric titer after `fr`, applied to lower-cased text
pub const VALUE_PATTERN: &str = r"\bfr\s*[:\s]+(\d+[\.,]?\d*)";

/// ICD-10 code in the original-case text
pub const CODE_PATTERN: &str = r"(?i)CID[\s\-]*10?\s*[:\s]*([M]\d{2}\.?\d?)";

pub const CODE_RESULTS: &[(&str, RheumatoidResult)] = &[
    ("M06.0", RheumatoidResult::Negative),
    ("M05.9", RheumatoidResult::Positive),
    ("M05.0", RheumatoidResult::Positive),
    ("M05.1", RheumatoidResult::Positive),
    ("M05.2", RheumatoidResult::Positive),
    ("M05.3", RheumatoidResult::Positive),
    ("M05.8", RheumatoidResult::Positive),
    ("M06.8", RheumatoidResult::NotInformed),
    ("M06.9", RheumatoidResult::NotInformed),
];

/// Compiled rheumatoid factor patterns
#[derive(Debug, Clone)]
pub struct RheumatoidPatterns {
    pub positive: Vec<Regex>,
    pub negative: Vec<Regex>,
    pub value: Regex,
    pub code: Regex,
    pub code_results: FxHashMap<String, RheumatoidResult>,
}

impl RheumatoidPatterns {
    /// Result mapped to a diagnosis code, after normalisation
    #[must_use]
    pub fn result_for_code(&self, code: &str) -> Option<RheumatoidResult> {
        self.code_results.get(&normalize_code(code)).copied()
    }
}

/// Upper-case a diagnosis code and insert the dot after the category, `m059` -> `M05.9`
#[must_use]
pub fn normalize_code(code: &str) -> String {
    let code = code.trim().to_uppercase();
    if !code.contains('.') && code.len() >= 4 && code.is_char_boundary(3) {
        format!("{}.{}", &code[..3], &code[3..])
    } else {
        code
    }
}
