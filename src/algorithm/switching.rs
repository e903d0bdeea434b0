//! Treatment-switch analytics
//!
//! Cohort statistics over the baseline drug statuses of the longitudinal
//! table: how many patients switched biologics, which drugs they switched
//! between and why, and whether switching patients improved as often as
//! those still on their first biologic.

use crate::models::{LongitudinalRecord, LongitudinalTable, UsageStatus};
use crate::utils::title_case;
use itertools::Itertools;
use rustc_hash::FxHashMap;
use serde::Serialize;
use smallvec::SmallVec;
use std::fmt;

/// Separator between drugs of a treatment sequence
pub const SEQUENCE_SEPARATOR: &str = " → ";
/// Prior drugs shown per sequence
pub const MAX_SEQUENCE_PRIORS: usize = 3;
/// Default number of sequences reported
pub const DEFAULT_TOP_SEQUENCES: usize = 10;

fn percentage(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 / total as f64 * 100.0
    }
}

/// Overall switching figures
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct SwitchRateStats {
    pub total_patients: usize,
    /// Patients with no discontinued biologic
    pub first_biologic: usize,
    /// Patients with at least one discontinued biologic
    pub switched: usize,
    /// Switched patients among those with any biologic use, in percent
    pub switch_rate_pct: f64,
    /// Mean number of discontinued biologics over all patients
    pub mean_prior_biologics: f64,
}

/// Counts of patients moving from a prior drug to the current one
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct TransitionMatrix {
    /// Row and column labels
    pub drugs: Vec<String>,
    /// `counts[from][to]`
    pub counts: Vec<Vec<usize>>,
}

impl TransitionMatrix {
    /// Patients moving from `from` to `to`, by label
    #[must_use]
    pub fn get(&self, from: &str, to: &str) -> usize {
        let row = self.drugs.iter().position(|d| d == from);
        let col = self.drugs.iter().position(|d| d == to);
        match (row, col) {
            (Some(r), Some(c)) => self.counts[r][c],
            _ => 0,
        }
    }

    /// Total number of recorded transitions
    #[must_use]
    pub fn total(&self) -> usize {
        self.counts.iter().flatten().sum()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReasonCount {
    pub drug: String,
    pub reason: String,
    pub patients: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AbandonmentRate {
    pub drug: String,
    /// Patients with the drug active or discontinued
    pub used: usize,
    pub discontinued: usize,
    /// Rounded to two decimals
    pub rate_pct: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SequenceCount {
    pub sequence: String,
    pub patients: usize,
}

/// Improvement figures for one group of patients
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct EfficacyGroup {
    pub total: usize,
    pub improved: usize,
    pub rate_pct: f64,
}

impl EfficacyGroup {
    fn from_records<'a>(records: impl Iterator<Item = &'a LongitudinalRecord>) -> Self {
        let (total, improved) = records.fold((0, 0), |(total, improved), record| {
            (total + 1, improved + usize::from(record.improvement == Some(1)))
        });
        Self {
            total,
            improved,
            rate_pct: percentage(improved, total),
        }
    }
}

/// Improvement of switching patients vs. patients on their first biologic
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct SwitchEfficacy {
    pub with_switch: EfficacyGroup,
    pub without_switch: EfficacyGroup,
}

fn biologic_status(record: &LongitudinalRecord) -> UsageStatus {
    record
        .profile
        .biologics
        .as_ref()
        .map_or(UsageStatus::Absent, |summary| summary.status)
}

fn drugs_with_status<'a>(
    record: &'a LongitudinalRecord,
    drugs: &'a [String],
    status: UsageStatus,
) -> impl Iterator<Item = &'a String> + 'a {
    drugs
        .iter()
        .filter(move |drug| record.profile.medication(drug).status == status)
}

fn current_drug<'a>(record: &'a LongitudinalRecord, drugs: &'a [String]) -> Option<&'a String> {
    drugs_with_status(record, drugs, UsageStatus::Active).next()
}

/// Switch counts and rate over the whole table
#[must_use]
pub fn switch_rate(table: &LongitudinalTable) -> SwitchRateStats {
    let total_patients = table.len();
    let switched = table.records.iter().filter(|r| r.switched()).count();
    let on_biologic = table
        .records
        .iter()
        .filter(|r| biologic_status(r).is_mentioned())
        .count();
    let prior_total: usize = table
        .records
        .iter()
        .map(|r| r.profile.prior_biologics())
        .sum();

    SwitchRateStats {
        total_patients,
        first_biologic: total_patients - switched,
        switched,
        switch_rate_pct: percentage(switched, on_biologic),
        mean_prior_biologics: if total_patients == 0 {
            0.0
        } else {
            prior_total as f64 / total_patients as f64
        },
    }
}

/// Prior → current transitions between the given drugs
///
/// The current drug of a patient is the first drug in `drugs` with an active
/// status; every discontinued drug counts as one transition to it.
#[must_use]
pub fn transition_matrix(table: &LongitudinalTable, drugs: &[String]) -> TransitionMatrix {
    let mut counts = vec![vec![0; drugs.len()]; drugs.len()];
    let index: FxHashMap<&str, usize> = drugs
        .iter()
        .enumerate()
        .map(|(i, drug)| (drug.as_str(), i))
        .collect();

    for record in &table.records {
        let Some(current) = current_drug(record, drugs) else {
            continue;
        };
        let to = index[current.as_str()];
        for prior in drugs_with_status(record, drugs, UsageStatus::Prior) {
            counts[index[prior.as_str()]][to] += 1;
        }
    }

    TransitionMatrix {
        drugs: drugs.iter().map(|d| title_case(d)).collect(),
        counts,
    }
}

/// Tally values by count descending, ties in order of first appearance
fn ranked_counts<I>(values: I) -> Vec<(String, usize)>
where
    I: IntoIterator<Item = String>,
{
    let mut order: Vec<(String, usize)> = Vec::new();
    let mut position: FxHashMap<String, usize> = FxHashMap::default();
    for value in values {
        if let Some(&i) = position.get(&value) {
            order[i].1 += 1;
        } else {
            position.insert(value.clone(), order.len());
            order.push((value, 1));
        }
    }
    order
        .into_iter()
        .sorted_by(|a, b| b.1.cmp(&a.1))
        .collect()
}

/// Discontinuation reasons per drug, most frequent first within each drug
#[must_use]
pub fn discontinuation_reasons(table: &LongitudinalTable, drugs: &[String]) -> Vec<ReasonCount> {
    drugs
        .iter()
        .flat_map(|drug| {
            let reasons = table.records.iter().filter_map(|record| {
                let usage = record.profile.medication(drug);
                (usage.status == UsageStatus::Prior)
                    .then_some(usage.reason)
                    .flatten()
            });
            ranked_counts(reasons)
                .into_iter()
                .map(move |(reason, patients)| ReasonCount {
                    drug: title_case(drug),
                    reason: title_case(&reason),
                    patients,
                })
        })
        .collect()
}

/// Share of users who discontinued each drug, highest first
///
/// Drugs nobody used are left out.
#[must_use]
pub fn abandonment_rates(table: &LongitudinalTable, drugs: &[String]) -> Vec<AbandonmentRate> {
    drugs
        .iter()
        .filter_map(|drug| {
            let statuses = table
                .records
                .iter()
                .map(|record| record.profile.medication(drug).status);
            let (used, discontinued) = statuses.fold((0, 0), |(used, disc), status| {
                (
                    used + usize::from(status.is_mentioned()),
                    disc + usize::from(status == UsageStatus::Prior),
                )
            });
            (used > 0).then(|| AbandonmentRate {
                drug: title_case(drug),
                used,
                discontinued,
                rate_pct: (percentage(discontinued, used) * 100.0).round() / 100.0,
            })
        })
        .sorted_by(|a, b| b.rate_pct.total_cmp(&a.rate_pct))
        .collect()
}

/// Most common "prior → … → current" sequences
///
/// Only patients with both a discontinued and an active drug contribute;
/// at most [`MAX_SEQUENCE_PRIORS`] prior drugs are listed per sequence.
#[must_use]
pub fn common_sequences(
    table: &LongitudinalTable,
    drugs: &[String],
    top_n: usize,
) -> Vec<SequenceCount> {
    let sequences = table.records.iter().filter_map(|record| {
        let current = current_drug(record, drugs)?;
        let priors: SmallVec<[String; MAX_SEQUENCE_PRIORS]> =
            drugs_with_status(record, drugs, UsageStatus::Prior)
                .take(MAX_SEQUENCE_PRIORS)
                .map(|d| title_case(d))
                .collect();
        if priors.is_empty() {
            return None;
        }
        Some(format!(
            "{}{SEQUENCE_SEPARATOR}{}",
            priors.join(SEQUENCE_SEPARATOR),
            title_case(current)
        ))
    });

    ranked_counts(sequences)
        .into_iter()
        .take(top_n)
        .map(|(sequence, patients)| SequenceCount { sequence, patients })
        .collect()
}

/// Improvement rate of switching patients vs. patients on a first active biologic
#[must_use]
pub fn switch_efficacy(table: &LongitudinalTable) -> SwitchEfficacy {
    SwitchEfficacy {
        with_switch: EfficacyGroup::from_records(table.records.iter().filter(|r| r.switched())),
        without_switch: EfficacyGroup::from_records(
            table
                .records
                .iter()
                .filter(|r| !r.switched() && biologic_status(r) == UsageStatus::Active),
        ),
    }
}

/// All switching statistics of one cohort
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct SwitchingAnalysis {
    pub rate: SwitchRateStats,
    pub transitions: TransitionMatrix,
    pub reasons: Vec<ReasonCount>,
    pub abandonment: Vec<AbandonmentRate>,
    pub sequences: Vec<SequenceCount>,
    pub efficacy: SwitchEfficacy,
}

impl SwitchingAnalysis {
    /// Compute every statistic over `drugs`, reporting `top_n` sequences
    #[must_use]
    pub fn compute(table: &LongitudinalTable, drugs: &[String], top_n: usize) -> Self {
        Self {
            rate: switch_rate(table),
            transitions: transition_matrix(table, drugs),
            reasons: discontinuation_reasons(table, drugs),
            abandonment: abandonment_rates(table, drugs),
            sequences: common_sequences(table, drugs, top_n),
            efficacy: switch_efficacy(table),
        }
    }
}

impl fmt::Display for SwitchingAnalysis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Treatment Switch Summary:")?;
        writeln!(f, "  Total Patients: {}", self.rate.total_patients)?;
        writeln!(f, "  First Biologic: {}", self.rate.first_biologic)?;
        writeln!(
            f,
            "  Switched: {} ({:.1}%)",
            self.rate.switched, self.rate.switch_rate_pct
        )?;
        writeln!(
            f,
            "  Mean Prior Biologics: {:.2}",
            self.rate.mean_prior_biologics
        )?;

        if !self.abandonment.is_empty() {
            writeln!(f, "\nAbandonment by Drug:")?;
            for rate in &self.abandonment {
                writeln!(
                    f,
                    "    {}: {}/{} ({:.2}%)",
                    rate.drug, rate.discontinued, rate.used, rate.rate_pct
                )?;
            }
        }

        if !self.sequences.is_empty() {
            writeln!(f, "\nCommon Sequences:")?;
            for sequence in &self.sequences {
                writeln!(f, "    {}: {}", sequence.sequence, sequence.patients)?;
            }
        }

        writeln!(f, "\nImprovement:")?;
        writeln!(
            f,
            "  With switch: {}/{} ({:.1}%)",
            self.efficacy.with_switch.improved,
            self.efficacy.with_switch.total,
            self.efficacy.with_switch.rate_pct
        )?;
        write!(
            f,
            "  Without switch: {}/{} ({:.1}%)",
            self.efficacy.without_switch.improved,
            self.efficacy.without_switch.total,
            self.efficacy.without_switch.rate_pct
        )
    }
}
