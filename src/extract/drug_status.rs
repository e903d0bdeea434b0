//! Drug usage status with context-window disambiguation
//!
//! A drug that is not mentioned is `NÃO`. Otherwise every occurrence of every
//! alias opens a window of [`CONTEXT_RADIUS`] characters on both sides. Each
//! window is classified by an ordered rule table (discontinuation phrases
//! before activity phrases) and the record keeps the highest status seen,
//! `PRÉVIO > SIM > NÃO`. A mention without any usage phrase is `SIM`.
//!
//! The discontinuation reason is the first vocabulary term found in a
//! discontinuation window; a later discontinuation window naming a reason
//! replaces it.

use crate::extract::flags::mentions_any;
use crate::extract::rules::RuleSet;
use crate::lexicon::{DrugEntry, UsagePatterns};
use crate::models::{DrugUsage, UsageStatus};
use crate::utils::text::context_bounds;

/// Characters of context on each side of an alias occurrence
pub const CONTEXT_RADIUS: usize = 300;

/// Rule table classifying one context window
fn window_rules(usage: &UsagePatterns) -> RuleSet<'_, str, UsageStatus> {
    RuleSet::new(UsageStatus::Absent)
        .rule(
            "discontinued",
            |context: &str| usage.is_discontinued(context),
            UsageStatus::Prior,
        )
        .rule(
            "active",
            |context: &str| usage.is_active(context),
            UsageStatus::Active,
        )
}

/// Usage status of one drug in already lower-cased text
#[must_use]
pub fn drug_usage_in(lower: &str, drug: &DrugEntry, usage: &UsagePatterns) -> DrugUsage {
    if !mentions_any(lower, &drug.aliases) {
        return DrugUsage::absent();
    }

    let rules = window_rules(usage);
    let mut status = UsageStatus::Absent;
    let mut reason: Option<String> = None;

    for alias in drug.aliases.iter().filter(|alias| !alias.is_empty()) {
        for (start, matched) in lower.match_indices(alias.as_str()) {
            let (lo, hi) = context_bounds(lower, start, start + matched.len(), CONTEXT_RADIUS);
            let context = &lower[lo..hi];

            let window_status = *rules.resolve(context);
            if window_status == UsageStatus::Prior {
                if let Some(found) = usage.reason_in(context) {
                    reason = Some(found.to_string());
                }
            }
            status = status.max(window_status);
        }
    }

    if status == UsageStatus::Absent {
        status = UsageStatus::Active;
    }

    DrugUsage { status, reason }
}

/// Usage status of one drug in a note
#[must_use]
pub fn drug_usage(text: &str, drug: &DrugEntry, usage: &UsagePatterns) -> DrugUsage {
    drug_usage_in(&text.to_lowercase(), drug, usage)
}
