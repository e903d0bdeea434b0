//! Biologic therapy summary

use crate::extract::drug_status::drug_usage_in;
use crate::extract::rules::RuleSet;
use crate::lexicon::{DrugEntry, Lexicon, TherapyPatterns};
use crate::models::{BiologicSummary, PriorBiologic, TherapyPlan, UsageStatus};

fn plan_rules(therapy: &TherapyPatterns) -> RuleSet<'_, str, TherapyPlan> {
    let rules = RuleSet::new(TherapyPlan::None).rule(
        "switch",
        |lower: &str| therapy.switch_plan.is_match(lower),
        TherapyPlan::Switch,
    );
    match &therapy.start_plan {
        Some(start) => rules.rule(
            "start",
            move |lower: &str| start.is_match(lower),
            TherapyPlan::Start,
        ),
        None => rules,
    }
}

/// Summarise the given biologics in one note
///
/// The summary names the first active biologic, or the first prior one when
/// none is active, in the order of `biologics`.
#[must_use]
pub fn extract_biologics(
    text: &str,
    biologics: &[&DrugEntry],
    lexicon: &Lexicon,
) -> BiologicSummary {
    let lower = text.to_lowercase();
    let mut summary = BiologicSummary {
        plan: *plan_rules(lexicon.therapy()).resolve(&lower),
        ..BiologicSummary::default()
    };

    let mut first_active: Option<&DrugEntry> = None;
    for &drug in biologics {
        let usage = drug_usage_in(&lower, drug, lexicon.usage());
        match usage.status {
            UsageStatus::Active => {
                if first_active.is_none() {
                    first_active = Some(drug);
                }
                summary.active.push(drug.name.clone());
            }
            UsageStatus::Prior => summary.prior.push(PriorBiologic {
                name: drug.name.clone(),
                group: drug.group.clone(),
                reason: usage.reason,
            }),
            UsageStatus::Absent => {}
        }
    }

    if let Some(drug) = first_active {
        summary.status = UsageStatus::Active;
        summary.name = Some(drug.name.clone());
        summary.group = Some(drug.group.clone());
    } else if let Some(prior) = summary.prior.first() {
        summary.status = UsageStatus::Prior;
        summary.name = Some(prior.name.clone());
        summary.group = Some(prior.group.clone());
    }

    summary
}
