//! Semester aggregation.
//!
//! Scans the coverage timeline for maximal runs of consecutive calendar
//! months sharing the same tier and counts how many full semesters each run
//! holds. Leftover months of a run never count on their own.
//!
//! With `cross_tier_absorption` enabled, tiers are processed highest first
//! and the leftover months of a run are relabelled to the next lower counted
//! tier, where they can complete an adjacent run. Leftovers are taken from
//! the edge of the run that borders a lower counted tier, the trailing edge
//! when neither or both do. A month is consumed by at most one semester
//! either way.

use std::ops::Range;

use serde::Serialize;

use crate::config::EligibilityPolicy;
use crate::models::{AuditStep, CanonicalMonth, MonthCoverage, SemesterDetails, Tier};

/// A maximal run of consecutive months sharing a tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TierRun {
    /// The tier of every month in the run.
    pub tier: Tier,
    /// First month of the run.
    pub start: CanonicalMonth,
    /// Last month of the run.
    pub end: CanonicalMonth,
    /// Number of months in the run.
    pub months: u32,
    /// Full semesters the run holds.
    pub semesters: u32,
    /// Months left over after the full semesters.
    pub leftover: u32,
    /// Tier the leftover months were relabelled to, if absorbed.
    pub absorbed_into: Option<Tier>,
    /// Edge of the run the absorbed months were taken from.
    pub absorbed_edge: Option<RunEdge>,
}

/// One end of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunEdge {
    /// The first months of the run.
    Leading,
    /// The last months of the run.
    Trailing,
}

/// The outcome of semester aggregation.
#[derive(Debug, Clone)]
pub struct SemesterCount {
    /// Full semesters per tier.
    pub details: SemesterDetails,
    /// Months credited toward the requirement.
    pub valid_months: u32,
    /// Every run found, in processing order.
    pub runs: Vec<TierRun>,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
}

/// Counts full semesters per tier and the resulting valid months.
///
/// `valid_months` is `semester_months` times the semesters of the counted
/// tiers. Semesters of uncounted tiers are still reported in `details`.
///
/// # Example
///
/// ```
/// use eligibility_engine::calculation::count_semesters;
/// use eligibility_engine::config::EligibilityPolicy;
/// use eligibility_engine::models::{CanonicalMonth, MonthCoverage, Tier};
/// use rust_decimal::Decimal;
///
/// // 44 consecutive months at 40h: 7 semesters, 2 months left over.
/// let mut month = CanonicalMonth::new(2020, 1).unwrap();
/// let mut coverage = Vec::new();
/// for _ in 0..44 {
///     coverage.push(MonthCoverage { month, hours: Decimal::new(40, 0), tier: Tier::Hours40 });
///     month = month.succ();
/// }
///
/// let count = count_semesters(&coverage, &EligibilityPolicy::default(), 1);
/// assert_eq!(count.details.semesters_40, 7);
/// assert_eq!(count.valid_months, 42);
/// ```
pub fn count_semesters(
    coverage: &[MonthCoverage],
    policy: &EligibilityPolicy,
    step_number: u32,
) -> SemesterCount {
    let semester_months = policy.semester_months.max(1) as usize;
    let mut labels: Vec<(CanonicalMonth, Option<Tier>)> =
        coverage.iter().map(|m| (m.month, Some(m.tier))).collect();

    let mut details = SemesterDetails::default();
    let mut runs = Vec::new();

    for tier in Tier::ALL {
        for range in find_runs(&labels, tier) {
            let months = range.len();
            let semesters = (months / semester_months) as u32;
            let leftover = months % semester_months;
            details.add(tier, semesters);

            let absorbed_into = if policy.cross_tier_absorption && leftover > 0 {
                policy.next_lower_counted(tier)
            } else {
                None
            };
            let absorbed_edge = absorbed_into.map(|_| leftover_edge(&labels, &range, tier, policy));
            if let (Some(lower), Some(edge)) = (absorbed_into, absorbed_edge) {
                let absorbed = match edge {
                    RunEdge::Leading => range.start..range.start + leftover,
                    RunEdge::Trailing => range.end - leftover..range.end,
                };
                for label in &mut labels[absorbed] {
                    label.1 = Some(lower);
                }
            }

            runs.push(TierRun {
                tier,
                start: labels[range.start].0,
                end: labels[range.end - 1].0,
                months: months as u32,
                semesters,
                leftover: leftover as u32,
                absorbed_into,
                absorbed_edge,
            });
        }
    }

    let counted_semesters: u32 = Tier::ALL
        .iter()
        .filter(|tier| policy.counts(**tier))
        .map(|tier| details.for_tier(*tier))
        .sum();
    let valid_months = counted_semesters * policy.semester_months;

    let audit_step = AuditStep {
        step_number,
        rule_id: "semester_aggregation".to_string(),
        rule_name: "Semester Aggregation".to_string(),
        input: serde_json::json!({
            "covered_months": coverage.len(),
            "semester_months": policy.semester_months,
            "counted_tiers": policy.counted_tiers,
            "cross_tier_absorption": policy.cross_tier_absorption,
        }),
        output: serde_json::json!({
            "runs": runs,
            "details": details,
            "valid_months": valid_months,
        }),
        reasoning: format!(
            "{} runs found; {} counted semesters x {} months = {} valid months",
            runs.len(),
            counted_semesters,
            policy.semester_months,
            valid_months
        ),
    };

    SemesterCount {
        details,
        valid_months,
        runs,
        audit_step,
    }
}

/// The edge of a run whose leftover months should be absorbed.
///
/// An edge qualifies when the month right next to it is consecutive and
/// labelled with a counted tier below `tier`.
fn leftover_edge(
    labels: &[(CanonicalMonth, Option<Tier>)],
    range: &Range<usize>,
    tier: Tier,
    policy: &EligibilityPolicy,
) -> RunEdge {
    let borders_lower = |inner: usize, outer: usize| {
        let (inner_month, _) = labels[inner];
        let (outer_month, outer_tier) = labels[outer];
        let adjacent = if outer < inner {
            outer_month.is_followed_by(&inner_month)
        } else {
            inner_month.is_followed_by(&outer_month)
        };
        adjacent && outer_tier.is_some_and(|t| t < tier && policy.counts(t))
    };

    let leading = range.start > 0 && borders_lower(range.start, range.start - 1);
    let trailing = range.end < labels.len() && borders_lower(range.end - 1, range.end);
    if leading && !trailing {
        RunEdge::Leading
    } else {
        RunEdge::Trailing
    }
}

/// Index ranges of the maximal runs of consecutive months labelled `tier`.
fn find_runs(labels: &[(CanonicalMonth, Option<Tier>)], tier: Tier) -> Vec<Range<usize>> {
    let mut runs = Vec::new();
    let mut start: Option<usize> = None;

    for (index, (month, label)) in labels.iter().enumerate() {
        if *label != Some(tier) {
            if let Some(run_start) = start.take() {
                runs.push(run_start..index);
            }
            continue;
        }

        match start {
            Some(_) if labels[index - 1].0.is_followed_by(month) => {}
            Some(run_start) => {
                runs.push(run_start..index);
                start = Some(index);
            }
            None => start = Some(index),
        }
    }

    if let Some(run_start) = start {
        runs.push(run_start..labels.len());
    }
    runs
}
