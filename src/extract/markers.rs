//! Numeric marker extraction
//!
//! Two strategies locate a marker value in a note:
//!
//! - **token**: split the lower-cased text on whitespace; a token that equals
//!   a marker keyword once the characters `:\<>;/'` are stripped starts a
//!   lookahead of [`LOOKAHEAD_TOKENS`] tokens. A standalone comparison operator
//!   is remembered, and the first token holding a digit supplies the value.
//! - **pattern**: the first match of the marker's value pattern.
//!
//! Both keep the first value found per marker. The captured string keeps any
//! comparison operator; numeric cleanup happens later in the processor.

use crate::lexicon::MarkerDefinition;
use crate::models::MarkerReading;
use crate::utils::text::{COMPARISON_OPERATORS, first_decimal, has_digit, operator_prefix};
use rustc_hash::FxHashMap;
use std::collections::BTreeMap;

/// Tokens inspected after a keyword
pub const LOOKAHEAD_TOKENS: usize = 4;

const STRIPPED_CHARS: [char; 7] = [':', '\\', '<', '>', ';', '/', '\''];

fn clean_token(token: &str) -> String {
    token.chars().filter(|c| !STRIPPED_CHARS.contains(c)).collect()
}

/// Value string starting at `tokens[0]`, scanning at most `LOOKAHEAD_TOKENS`
fn scan_value(tokens: &[&str]) -> Option<String> {
    let mut operator: Option<&str> = None;

    for token in tokens.iter().take(LOOKAHEAD_TOKENS) {
        if COMPARISON_OPERATORS.contains(token) {
            operator = Some(*token);
            continue;
        }
        if has_digit(token) {
            if let Some(number) = first_decimal(token) {
                let prefix = operator.or_else(|| operator_prefix(token)).unwrap_or("");
                return Some(format!("{prefix}{number}"));
            }
        }
    }
    None
}

/// Token-scan extraction of the given markers
#[must_use]
pub fn extract_by_token(
    text: &str,
    markers: &[&MarkerDefinition],
) -> BTreeMap<String, MarkerReading> {
    let mut found = BTreeMap::new();
    if markers.is_empty() || text.is_empty() {
        return found;
    }

    let keyword_to_marker: FxHashMap<&str, &str> = markers
        .iter()
        .flat_map(|marker| {
            marker
                .keywords
                .iter()
                .map(move |keyword| (keyword.as_str(), marker.name.as_str()))
        })
        .collect();

    let lower = text.to_lowercase();
    let tokens: Vec<&str> = lower.split_whitespace().collect();

    for (i, token) in tokens.iter().enumerate() {
        let cleaned = clean_token(token);
        let Some(&marker) = keyword_to_marker.get(cleaned.as_str()) else {
            continue;
        };
        if found.contains_key(marker) {
            continue;
        }
        if let Some(raw) = scan_value(&tokens[i + 1..]) {
            found.insert(marker.to_string(), MarkerReading::captured(raw));
        }
    }

    found
}

/// Pattern extraction of the given markers
#[must_use]
pub fn extract_by_pattern(
    text: &str,
    markers: &[&MarkerDefinition],
) -> BTreeMap<String, MarkerReading> {
    let lower = text.to_lowercase();
    markers
        .iter()
        .filter_map(|marker| {
            let value = marker.pattern.captures(&lower)?.get(1)?.as_str();
            Some((marker.name.clone(), MarkerReading::captured(value)))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexicon::Lexicon;

    fn raw(found: &BTreeMap<String, MarkerReading>, name: &str) -> Option<String> {
        found.get(name).and_then(|reading| reading.raw.clone())
    }

    fn standard_markers(lexicon: &Lexicon) -> Vec<&MarkerDefinition> {
        lexicon.markers().iter().collect()
    }

    #[test]
    fn test_token_value_after_keyword() {
        let lexicon = Lexicon::standard().unwrap();
        let markers = standard_markers(&lexicon);

        let found = extract_by_token("HAQ: 1,5 e das28 : <2", &markers);
        assert_eq!(raw(&found, "haq").as_deref(), Some("1,5"));
        assert_eq!(raw(&found, "das28").as_deref(), Some("<2"));
    }

    #[test]
    fn test_token_standalone_operator_is_kept() {
        let lexicon = Lexicon::standard().unwrap();
        let markers = standard_markers(&lexicon);

        let found = extract_by_token("pcr >= 12,3 mg/l", &markers);
        assert_eq!(raw(&found, "pcr").as_deref(), Some(">=12,3"));
    }

    #[test]
    fn test_token_lookahead_is_bounded() {
        let lexicon = Lexicon::standard().unwrap();
        let markers = standard_markers(&lexicon);

        let found = extract_by_token("vhs sem alteração no exame 40", &markers);
        assert!(!found.contains_key("vhs"));

        let found = extract_by_token("vhs sem alteração no 40", &markers);
        assert_eq!(raw(&found, "vhs").as_deref(), Some("40"));
    }

    #[test]
    fn test_token_first_match_wins() {
        let lexicon = Lexicon::standard().unwrap();
        let markers = standard_markers(&lexicon);

        let found = extract_by_token("cdai 22 ... cdai 8", &markers);
        assert_eq!(raw(&found, "cdai").as_deref(), Some("22"));
    }

    #[test]
    fn test_unselected_markers_are_ignored() {
        let lexicon = Lexicon::standard().unwrap();
        let haq = lexicon.marker("haq").unwrap();

        let found = extract_by_token("haq 1 cdai 3", &[haq]);
        assert_eq!(found.len(), 1);
        assert!(found.contains_key("haq"));
    }

    #[test]
    fn test_pattern_strategy() {
        let lexicon = Lexicon::standard().unwrap();
        let markers = standard_markers(&lexicon);

        let found = extract_by_pattern("DAS-28=3,2; VHS:35 EVA dor 7", &markers);
        assert_eq!(raw(&found, "das28").as_deref(), Some("3,2"));
        assert_eq!(raw(&found, "vhs").as_deref(), Some("35"));
        assert_eq!(raw(&found, "eva_dor").as_deref(), Some("7"));
        assert!(!found.contains_key("haq"));
    }
}
