//! Comorbidity synonym table

/// A comorbidity and the terms that indicate it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComorbidityEntry {
    pub name: String,
    /// Lower-cased terms matched as literal substrings
    pub aliases: Vec<String>,
}

impl ComorbidityEntry {
    #[must_use]
    pub fn new(name: &str, aliases: &[&str]) -> Self {
        Self {
            name: name.to_lowercase(),
            aliases: aliases.iter().map(|alias| alias.to_lowercase()).collect(),
        }
    }
}

pub const STANDARD_COMORBIDITIES: &[(&str, &[&str])] = &[
    ("has", &["has", "hipertensão", "hipertensao", "hipertenso"]),
    ("dm", &["dm", "dm2", "diabetes", "diabético", "diabetico"]),
    (
        "pre_dm",
        &["pré-dm", "pre-dm", "pré-diabetes", "pre-diabetes", "pre-dm2"],
    ),
    ("dlp", &["dlp", "dislipidemia", "dislipidêmico"]),
    ("fm", &["fm", "fibromialgia"]),
    ("op", &["op", "osteoporose", "osteoporótico"]),
    (
        "hipotireoidismo",
        &["hipotireoidismo", "tireoidite", "hipotireoideo"],
    ),
    ("obesidade", &["obesidade", "obeso", "imc >30"]),
    ("dpoc", &["dpoc", "enfisema", "bronquite crônica"]),
    (
        "irc",
        &["irc", "doença renal", "insuficiência renal", "nefropatia"],
    ),
    (
        "hepatopatia",
        &["hepatopatia", "doença hepática", "cirrose", "esteatose"],
    ),
    ("depressao", &["depressão", "depressao", "transtorno depressivo"]),
];

#[must_use]
pub fn standard_comorbidities() -> Vec<ComorbidityEntry> {
    STANDARD_COMORBIDITIES
        .iter()
        .map(|(name, aliases)| ComorbidityEntry::new(name, aliases))
        .collect()
}
