//! Drug tables: canonical names, aliases and therapeutic groups
//!
//! Biologics and JAK inhibitors are listed before the conventional DMARDs.
//! Table order is the order in which biologics are reported as "first active"
//! or "first prior".

use std::fmt;

/// Drug class used to tell biologic therapy from conventional DMARDs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DrugClass {
    /// Biologic or targeted synthetic (JAK inhibitor)
    Biologic,
    /// Conventional synthetic DMARD
    Conventional,
}

impl fmt::Display for DrugClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Biologic => write!(f, "Biologic"),
            Self::Conventional => write!(f, "Conventional DMARD"),
        }
    }
}

/// One drug known to the lexicon
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrugEntry {
    /// Canonical (generic) name
    pub name: String,
    /// Lower-cased aliases matched as literal substrings
    pub aliases: Vec<String>,
    /// Therapeutic group, e.g. `Anti-TNF`
    pub group: String,
    pub class: DrugClass,
}

impl DrugEntry {
    #[must_use]
    pub fn new(name: &str, aliases: &[&str], group: &str, class: DrugClass) -> Self {
        Self {
            name: name.to_lowercase(),
            aliases: aliases.iter().map(|alias| alias.to_lowercase()).collect(),
            group: group.to_string(),
            class,
        }
    }

    /// A biologic or JAK inhibitor
    #[must_use]
    pub fn biologic(name: &str, aliases: &[&str], group: &str) -> Self {
        Self::new(name, aliases, group, DrugClass::Biologic)
    }

    /// A conventional DMARD
    #[must_use]
    pub fn conventional(name: &str, aliases: &[&str]) -> Self {
        Self::new(name, aliases, CONVENTIONAL_GROUP, DrugClass::Conventional)
    }

    #[must_use]
    pub fn is_biologic(&self) -> bool {
        self.class == DrugClass::Biologic
    }
}

/// Group of the conventional DMARDs
pub const CONVENTIONAL_GROUP: &str = "csDMARD";

/// Canonical name of methotrexate in the standard tables
pub const METHOTREXATE: &str = "metotrexato";

/// Biologics and JAK inhibitors: (name, aliases, group)
pub const STANDARD_BIOLOGICS: &[(&str, &[&str], &str)] = &[
    ("tofacitinibe", &["tofacitinibe", "xeljanz", "tofa"], "JAK Inibidores"),
    ("upadacitinibe", &["upadacitinibe", "rinvoq", "upada"], "JAK Inibidores"),
    ("baricitinibe", &["baricitinibe", "olumiant", "bari"], "JAK Inibidores"),
    ("adalimumabe", &["adalimumabe", "humira", "ada"], "Anti-TNF"),
    ("etanercepte", &["etanercepte", "enbrel", "eta"], "Anti-TNF"),
    ("golimumabe", &["golimumabe", "simponi", "goli"], "Anti-TNF"),
    ("infliximabe", &["infliximabe", "remicade", "ifx"], "Anti-TNF"),
    ("certolizumabe", &["certolizumabe", "cimzia", "czp"], "Anti-TNF"),
    ("tocilizumabe", &["tocilizumabe", "actemra", "tcz"], "Anti-IL/Outros"),
    ("rituximabe", &["rituximabe", "mabthera", "rtx"], "Anti-IL/Outros"),
    ("abatacepte", &["abatacepte", "orencia", "aba"], "Anti-IL/Outros"),
    ("secuquinumabe", &["secuquinumabe", "cosentyx"], "Anti-IL17"),
    ("ixequizumabe", &["ixequizumabe", "taltz"], "Anti-IL17"),
];

/// Conventional DMARDs: (name, aliases)
pub const STANDARD_CONVENTIONAL: &[(&str, &[&str])] = &[
    (METHOTREXATE, &["metotrexato", "metotrexate", "mtx"]),
    ("leflunomida", &["leflunomida", "arava", "lef"]),
    ("sulfassalazina", &["sulfassalazina", "azulfin", "ssz"]),
    ("hidroxicloroquina", &["hidroxicloroquina", "plaquinol", "hcq"]),
];

/// Weekly methotrexate dose following a drug mention
pub const METHOTREXATE_DOSE_PATTERN: &str = r"(?:mtx|metotrexato)\s*[:\s]*(\d+[\.,]?\d*)\s*(?:mg)?";

/// Route patterns, tested in this order
pub const METHOTREXATE_ROUTE_PATTERNS: [(&str, &str); 3] = [
    ("SC", r"(?:mtx|metotrexato)\s*\S*\s*(sc|subcutan[eê])"),
    ("VO", r"(?:mtx|metotrexato)\s*\S*\s*(vo|oral|comprimido)"),
    ("IM", r"(?:mtx|metotrexato)\s*\S*\s*(im|intramuscular)"),
];

/// Stated intention to switch one drug for another
pub const SWITCH_PLAN_PATTERN: &str = r"troc[oa]r?\s+\w+\s+por";

/// Standard drug entries in table order
#[must_use]
pub fn standard_drugs() -> Vec<DrugEntry> {
    STANDARD_BIOLOGICS
        .iter()
        .map(|(name, aliases, group)| DrugEntry::biologic(name, aliases, group))
        .chain(
            STANDARD_CONVENTIONAL
                .iter()
                .map(|(name, aliases)| DrugEntry::conventional(name, aliases)),
        )
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_drug_counts() {
        let drugs = standard_drugs();
        assert_eq!(drugs.len(), 17);
        assert_eq!(drugs.iter().filter(|d| d.is_biologic()).count(), 13);
        assert_eq!(drugs[0].name, "tofacitinibe");
        assert_eq!(drugs[13].name, METHOTREXATE);
        assert_eq!(drugs[13].group, CONVENTIONAL_GROUP);
    }

    #[test]
    fn test_aliases_are_lowercased() {
        let entry = DrugEntry::biologic("Adalimumabe", &["HUMIRA", "Ada"], "Anti-TNF");
        assert_eq!(entry.name, "adalimumabe");
        assert_eq!(entry.aliases, vec!["humira", "ada"]);
    }
}
