//! Methotrexate usage, weekly dose and route

use crate::extract::drug_status::drug_usage_in;
use crate::extract::rules::RuleSet;
use crate::lexicon::{DrugEntry, Lexicon, TherapyPatterns};
use crate::models::{MethotrexateDetail, Route};
use crate::utils::parse_decimal;

fn route_rules(therapy: &TherapyPatterns) -> RuleSet<'_, str, Option<Route>> {
    therapy
        .methotrexate_routes
        .iter()
        .fold(RuleSet::new(None), |rules, (route, pattern)| {
            rules.rule(
                route.as_str(),
                move |lower: &str| pattern.is_match(lower),
                Some(*route),
            )
        })
}

/// Methotrexate detail of one note
#[must_use]
pub fn extract_methotrexate(text: &str, drug: &DrugEntry, lexicon: &Lexicon) -> MethotrexateDetail {
    let lower = text.to_lowercase();
    let therapy = lexicon.therapy();

    let weekly_dose_mg = therapy
        .methotrexate_dose
        .captures(&lower)
        .and_then(|caps| caps.get(1))
        .and_then(|m| parse_decimal(m.as_str()));

    MethotrexateDetail {
        usage: drug_usage_in(&lower, drug, lexicon.usage()),
        weekly_dose_mg,
        route: *route_rules(therapy).resolve(&lower),
    }
}
