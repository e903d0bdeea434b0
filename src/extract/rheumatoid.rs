//! Rheumatoid factor resolution
//!
//! Four stages, applied in order:
//!
//! 1. a positive phrase sets `POSITIVO` with origin `TEXTO`;
//! 2. otherwise a negative phrase sets `NEGATIVO` with origin `TEXTO`;
//! 3. a numeric titer after `fr` is recorded and sets the origin to `LAB`,
//!    overwriting `TEXTO` without changing the result;
//! 4. if the result is still `NÃO INFORMADO`, a diagnosis code in the original
//!    text is mapped to a result with origin `CID`.

use crate::extract::rules::RuleSet;
use crate::lexicon::RheumatoidPatterns;
use crate::models::{RheumatoidFactor, RheumatoidOrigin, RheumatoidResult};
use crate::utils::parse_decimal;

fn phrase_rules(patterns: &RheumatoidPatterns) -> RuleSet<'_, str, RheumatoidResult> {
    RuleSet::new(RheumatoidResult::NotInformed)
        .rule(
            "positive_phrase",
            |lower: &str| patterns.positive.iter().any(|p| p.is_match(lower)),
            RheumatoidResult::Positive,
        )
        .rule(
            "negative_phrase",
            |lower: &str| patterns.negative.iter().any(|p| p.is_match(lower)),
            RheumatoidResult::Negative,
        )
}

/// Resolve the rheumatoid factor of one note
#[must_use]
pub fn extract_rheumatoid_factor(text: &str, patterns: &RheumatoidPatterns) -> RheumatoidFactor {
    let mut factor = RheumatoidFactor::default();
    if text.is_empty() {
        return factor;
    }

    let lower = text.to_lowercase();

    factor.result = *phrase_rules(patterns).resolve(&lower);
    if factor.result != RheumatoidResult::NotInformed {
        factor.origin = Some(RheumatoidOrigin::Text);
    }

    if let Some(titer) = patterns
        .value
        .captures(&lower)
        .and_then(|caps| caps.get(1))
        .and_then(|m| parse_decimal(m.as_str()))
    {
        factor.titer = Some(titer);
        factor.origin = Some(RheumatoidOrigin::Lab);
    }

    if factor.result == RheumatoidResult::NotInformed {
        if let Some(result) = patterns
            .code
            .captures(text)
            .and_then(|caps| caps.get(1))
            .and_then(|m| patterns.result_for_code(m.as_str()))
        {
            factor.result = result;
            factor.origin = Some(RheumatoidOrigin::Code);
        }
    }

    factor
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexicon::Lexicon;

    fn resolve(text: &str) -> RheumatoidFactor {
        let lexicon = Lexicon::standard().unwrap();
        extract_rheumatoid_factor(text, lexicon.rheumatoid())
    }

    #[test]
    fn test_lab_titer_overwrites_text_origin() {
        let factor = resolve("AR soropositiva, FR +. FR: 45 UI/mL");
        assert_eq!(factor.result, RheumatoidResult::Positive);
        assert_eq!(factor.origin, Some(RheumatoidOrigin::Lab));
        assert_eq!(factor.titer, Some(45.0));
    }

    #[test]
    fn test_negative_phrase() {
        let factor = resolve("FR negativo, anti-CCP negativo");
        assert_eq!(factor.result, RheumatoidResult::Negative);
        assert_eq!(factor.origin, Some(RheumatoidOrigin::Text));
        assert_eq!(factor.titer, None);
    }

    #[test]
    fn test_negative_dash_not_followed_by_digit() {
        assert_eq!(resolve("fr - , vhs 20").result, RheumatoidResult::Negative);
        assert_eq!(resolve("fr -").result, RheumatoidResult::Negative);
        assert_eq!(resolve("fr -12").result, RheumatoidResult::NotInformed);
    }

    #[test]
    fn test_diagnosis_code_inference() {
        let factor = resolve("Artrite reumatoide CID10: M05.9");
        assert_eq!(factor.result, RheumatoidResult::Positive);
        assert_eq!(factor.origin, Some(RheumatoidOrigin::Code));

        let factor = resolve("cid 10 m060");
        assert_eq!(factor.result, RheumatoidResult::Negative);
        assert_eq!(factor.origin, Some(RheumatoidOrigin::Code));
    }

    #[test]
    fn test_code_does_not_override_text() {
        let factor = resolve("FR negativo. CID-10: M05.9");
        assert_eq!(factor.result, RheumatoidResult::Negative);
        assert_eq!(factor.origin, Some(RheumatoidOrigin::Text));
    }

    #[test]
    fn test_unmapped_code_leaves_not_informed() {
        let factor = resolve("CID10: M06.8");
        assert_eq!(factor.result, RheumatoidResult::NotInformed);
        assert_eq!(factor.origin, Some(RheumatoidOrigin::Code));

        let factor = resolve("Sem dados");
        assert_eq!(factor, RheumatoidFactor::default());
    }
}
