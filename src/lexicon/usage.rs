//! Drug activity and discontinuation phrases

use regex::Regex;

/// Phrases indicating current use
pub const ACTIVE_PATTERNS: &[&str] = &[
    r"em\s+uso",
    r"mant[eé]m",
    r"mantenho",
    r"renovo\s+lme",
    r"segue\s+com",
    r"continua\s+com",
    r"uso\s+atual",
    r"medicaç[oõ]es?\s+em\s+uso",
    r"usando",
];

/// Phrases indicating previous use that was stopped
pub const DISCONTINUED_PATTERNS: &[&str] = &[
    r"uso\s+pr[eé]vio",
    r"pr[eé]vio[s]?\s*[:\s]",
    r"fez\s+uso",
    r"j[aá]\s+usou",
    r"suspen[sd][oa]",
    r"parou",
    r"interromp",
    r"descontinua",
    r"n[aã]o\s+tolera",
    r"intoler[aâ]ncia",
    r"hepatotoxicidade",
    r"alop[eé]cia",
    r"falha\s+terap[eê]utica",
];

/// Discontinuation reasons, matched as literal substrings in vocabulary order
pub const DISCONTINUATION_REASONS: &[&str] = &[
    "intolerância",
    "hepatotoxicidade",
    "alopécia",
    "alopecia",
    "falha",
    "infecção",
    "efeito adverso",
    "evento adverso",
    "falta",
    "indisponibilidade",
    "gestação",
    "gravidez",
];

/// Compiled usage phrases and the reason vocabulary
#[derive(Debug, Clone)]
pub struct UsagePatterns {
    pub active: Vec<Regex>,
    pub discontinued: Vec<Regex>,
    pub reasons: Vec<String>,
}

impl UsagePatterns {
    /// Whether any activity phrase occurs in `context`
    #[must_use]
    pub fn is_active(&self, context: &str) -> bool {
        self.active.iter().any(|pattern| pattern.is_match(context))
    }

    /// Whether any discontinuation phrase occurs in `context`
    #[must_use]
    pub fn is_discontinued(&self, context: &str) -> bool {
        self.discontinued
            .iter()
            .any(|pattern| pattern.is_match(context))
    }

    /// First vocabulary reason occurring in `context`
    #[must_use]
    pub fn reason_in(&self, context: &str) -> Option<&str> {
        self.reasons
            .iter()
            .find(|reason| context.contains(reason.as_str()))
            .map(String::as_str)
    }
}
