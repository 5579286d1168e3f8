//! Month-by-month coverage timeline.
//!
//! Overlapping links are deduplicated per calendar month: a month covered by
//! several qualifying rows counts once, at the highest weekly commitment
//! among them. Hours from concurrent links are never added together. Months
//! whose commitment meets no tier are excluded from coverage.

use std::collections::BTreeMap;

use rust_decimal::Decimal;

use crate::config::EligibilityPolicy;
use crate::models::{AuditStep, CanonicalMonth, CanonicalRow, MonthCoverage};

use super::month_interval::{merge_intervals, months_in};
use super::tier::classify_hours;

/// The coverage timeline and the audit step describing it.
#[derive(Debug, Clone)]
pub struct CoverageResult {
    /// One entry per covered month, in chronological order.
    pub coverage: Vec<MonthCoverage>,
    /// Months covered only below the lowest tier, left out of `coverage`.
    pub below_threshold: Vec<CanonicalMonth>,
    /// Indices of the rows that contributed coverage.
    pub contributing_rows: Vec<usize>,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
}

/// Returns true if the row contributes coverage under the policy.
///
/// A row contributes when its role is eligible and its establishment is
/// valid. Family-medicine rows skip the establishment check when the policy
/// exempts them.
pub fn contributes(row: &CanonicalRow, policy: &EligibilityPolicy) -> bool {
    if row.is_qualifying() {
        return true;
    }
    row.role_eligible
        && row.is_family_medicine()
        && !policy.family_medicine_requires_valid_establishment
}

/// Builds the coverage timeline from normalized rows.
///
/// Only contributing rows are considered. Each month's hours are the maximum
/// weekly hours among the rows covering it, and its tier is the highest tier
/// that value meets. Months covered only below the lowest threshold are
/// listed in `below_threshold` instead.
///
/// # Example
///
/// ```
/// use eligibility_engine::calculation::{build_coverage, normalize_interval};
/// use eligibility_engine::config::EligibilityPolicy;
/// use eligibility_engine::models::{CanonicalMonth, CanonicalRow, RoleCategory, Tier};
/// use rust_decimal::Decimal;
///
/// let reference = CanonicalMonth::new(2024, 12).unwrap();
/// let row = |hours: i64, start: &str, end: &str| CanonicalRow {
///     row_index: 0,
///     establishment_id: "0000001".to_string(),
///     role_category: Some(RoleCategory::ClinicalPhysician),
///     role_eligible: true,
///     weekly_hours: Decimal::new(hours, 0),
///     interval: normalize_interval(start, Some(end), reference).unwrap(),
///     establishment_valid: true,
/// };
///
/// // 20h + 20h in the same months is still 20h, never 40h.
/// let rows = vec![row(20, "01/2024", "06/2024"), row(20, "01/2024", "06/2024")];
/// let result = build_coverage(&rows, &EligibilityPolicy::default(), 1);
/// assert_eq!(result.coverage.len(), 6);
/// assert!(result.coverage.iter().all(|m| m.tier == Tier::Hours20));
/// ```
pub fn build_coverage(
    rows: &[CanonicalRow],
    policy: &EligibilityPolicy,
    step_number: u32,
) -> CoverageResult {
    let mut timeline: BTreeMap<CanonicalMonth, Decimal> = BTreeMap::new();
    let mut contributing_rows = Vec::new();
    let mut intervals = Vec::new();

    for row in rows.iter().filter(|row| contributes(row, policy)) {
        contributing_rows.push(row.row_index);
        intervals.push(row.interval);
        for month in months_in(&row.interval) {
            timeline
                .entry(month)
                .and_modify(|hours| *hours = (*hours).max(row.weekly_hours))
                .or_insert(row.weekly_hours);
        }
    }

    let mut coverage = Vec::with_capacity(timeline.len());
    let mut below_threshold = Vec::new();
    for (month, hours) in timeline {
        match classify_hours(hours) {
            Some(tier) => coverage.push(MonthCoverage { month, hours, tier }),
            None => below_threshold.push(month),
        }
    }

    let excluded_rows = rows.len() - contributing_rows.len();
    let spans: Vec<String> = merge_intervals(&intervals)
        .iter()
        .map(ToString::to_string)
        .collect();

    let audit_step = AuditStep {
        step_number,
        rule_id: "coverage_timeline".to_string(),
        rule_name: "Coverage Timeline".to_string(),
        input: serde_json::json!({
            "rows": rows.len(),
            "contributing_rows": contributing_rows,
        }),
        output: serde_json::json!({
            "covered_months": coverage.len(),
            "below_threshold_months": below_threshold.len(),
            "spans": spans,
        }),
        reasoning: format!(
            "{} of {} rows contribute coverage ({} excluded); {} distinct months at or above 10h, {} below",
            contributing_rows.len(),
            rows.len(),
            excluded_rows,
            coverage.len(),
            below_threshold.len()
        ),
    };

    CoverageResult {
        coverage,
        below_threshold,
        contributing_rows,
        audit_step,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculation::normalize_interval;
    use crate::models::{RoleCategory, Tier};
    use std::str::FromStr;

    fn reference() -> CanonicalMonth {
        CanonicalMonth::new(2024, 12).unwrap()
    }

    fn row(index: usize, hours: &str, start: &str, end: &str) -> CanonicalRow {
        CanonicalRow {
            row_index: index,
            establishment_id: format!("{:07}", index + 1),
            role_category: Some(RoleCategory::ClinicalPhysician),
            role_eligible: true,
            weekly_hours: Decimal::from_str(hours).unwrap(),
            interval: normalize_interval(start, Some(end), reference()).unwrap(),
            establishment_valid: true,
        }
    }

    fn tiers(result: &CoverageResult) -> Vec<Tier> {
        result.coverage.iter().map(|m| m.tier).collect()
    }

    // ==========================================================================
    // CV-001: overlapping rows take the maximum, not the sum
    // ==========================================================================
    #[test]
    fn test_cv_001_overlap_takes_max_hours() {
        let rows = vec![
            row(0, "20", "01/2024", "06/2024"),
            row(1, "40", "04/2024", "09/2024"),
        ];
        let result = build_coverage(&rows, &EligibilityPolicy::default(), 1);

        assert_eq!(result.coverage.len(), 9);
        assert_eq!(
            tiers(&result),
            vec![
                Tier::Hours20,
                Tier::Hours20,
                Tier::Hours20,
                Tier::Hours40,
                Tier::Hours40,
                Tier::Hours40,
                Tier::Hours40,
                Tier::Hours40,
                Tier::Hours40,
            ]
        );
    }

    #[test]
    fn test_concurrent_part_time_links_are_not_summed() {
        let rows = vec![
            row(0, "20", "01/2024", "06/2024"),
            row(1, "20", "01/2024", "06/2024"),
        ];
        let result = build_coverage(&rows, &EligibilityPolicy::default(), 1);
        assert!(result.coverage.iter().all(|m| m.hours == Decimal::new(20, 0)));
    }

    // ==========================================================================
    // CV-002: non-contributing rows are excluded
    // ==========================================================================
    #[test]
    fn test_cv_002_only_qualifying_rows_contribute() {
        let mut ineligible = row(1, "40", "01/2024", "12/2024");
        ineligible.role_eligible = false;
        ineligible.role_category = None;
        let mut invalid_establishment = row(2, "40", "01/2024", "12/2024");
        invalid_establishment.establishment_valid = false;

        let rows = vec![
            row(0, "20", "01/2024", "03/2024"),
            ineligible,
            invalid_establishment,
        ];
        let result = build_coverage(&rows, &EligibilityPolicy::default(), 1);

        assert_eq!(result.contributing_rows, vec![0]);
        assert_eq!(result.coverage.len(), 3);
    }

    #[test]
    fn test_family_medicine_exemption() {
        let mut family = row(0, "40", "01/2024", "06/2024");
        family.role_category = Some(RoleCategory::FamilyMedicinePhysician);
        family.establishment_valid = false;

        let strict = build_coverage(&[family.clone()], &EligibilityPolicy::default(), 1);
        assert!(strict.coverage.is_empty());

        let exempt = EligibilityPolicy {
            family_medicine_requires_valid_establishment: false,
            ..Default::default()
        };
        let relaxed = build_coverage(&[family], &exempt, 1);
        assert_eq!(relaxed.coverage.len(), 6);
    }

    // ==========================================================================
    // CV-003: months below the lowest tier are excluded from coverage
    // ==========================================================================
    #[test]
    fn test_cv_003_low_hour_months_are_excluded() {
        let rows = vec![
            row(0, "40", "01/2020", "12/2023"),
            row(1, "5", "01/2024", "06/2024"),
        ];
        let result = build_coverage(&rows, &EligibilityPolicy::default(), 1);

        assert_eq!(result.coverage.len(), 48);
        assert!(result.coverage.iter().all(|m| m.tier == Tier::Hours40));
        assert_eq!(result.below_threshold.len(), 6);
        assert_eq!(result.below_threshold[0], CanonicalMonth::new(2024, 1).unwrap());
        assert_eq!(result.audit_step.output["below_threshold_months"], 6);
    }

    #[test]
    fn test_low_hours_overlapped_by_higher_tier_still_count() {
        let rows = vec![
            row(0, "8", "01/2024", "06/2024"),
            row(1, "20", "04/2024", "06/2024"),
        ];
        let result = build_coverage(&rows, &EligibilityPolicy::default(), 1);
        assert_eq!(tiers(&result), vec![Tier::Hours20; 3]);
        assert_eq!(result.below_threshold.len(), 3);
    }

    #[test]
    fn test_gap_months_are_absent() {
        let rows = vec![
            row(0, "40", "01/2024", "02/2024"),
            row(1, "40", "05/2024", "05/2024"),
        ];
        let result = build_coverage(&rows, &EligibilityPolicy::default(), 1);
        let months: Vec<u32> = result.coverage.iter().map(|m| m.month.month()).collect();
        assert_eq!(months, vec![1, 2, 5]);
    }

    #[test]
    fn test_audit_step_counts() {
        let rows = vec![row(0, "40", "01/2024", "06/2024")];
        let result = build_coverage(&rows, &EligibilityPolicy::default(), 7);
        assert_eq!(result.audit_step.step_number, 7);
        assert_eq!(result.audit_step.rule_id, "coverage_timeline");
        assert_eq!(result.audit_step.output["covered_months"], 6);
        assert_eq!(
            result.audit_step.output["spans"],
            serde_json::json!(["[01/2024 - 06/2024]"])
        );
    }
}
