//! Comorbidity presence flags
//!
//! A flag is set when any alias occurs as a literal substring of the
//! lower-cased text. Matching ignores word boundaries, so short aliases can
//! fire inside longer words.

use crate::lexicon::ComorbidityEntry;
use crate::models::ComorbidityFlags;

/// Whether any alias occurs in already lower-cased text
#[must_use]
pub fn mentions_any(lower: &str, aliases: &[String]) -> bool {
    aliases.iter().any(|alias| lower.contains(alias.as_str()))
}

/// Flag each selected comorbidity, 0 or 1
#[must_use]
pub fn extract_comorbidities(text: &str, entries: &[&ComorbidityEntry]) -> ComorbidityFlags {
    let lower = text.to_lowercase();
    ComorbidityFlags {
        flags: entries
            .iter()
            .map(|entry| {
                (
                    entry.name.clone(),
                    u8::from(mentions_any(&lower, &entry.aliases)),
                )
            })
            .collect(),
    }
}
