//! Eligibility report models.
//!
//! The [`EligibilityReport`] is the engine's only output. It carries no
//! timestamps or generated identifiers, so the same inputs always serialize
//! to the same bytes.

use serde::{Deserialize, Serialize};

use super::{AuditTrace, CanonicalMonth, MonthCoverage, Tier};

/// The final verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EligibilityStatus {
    /// The professional has accumulated the required months.
    Eligible,
    /// The professional is short of the required months.
    NotEligible,
}

/// Full semesters counted per tier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SemesterDetails {
    /// Semesters at 40 hours per week or more.
    pub semesters_40: u32,
    /// Semesters at 30 hours per week or more.
    pub semesters_30: u32,
    /// Semesters at 20 hours per week or more.
    pub semesters_20: u32,
    /// Semesters at 10 hours per week or more (tracked for visibility).
    pub semesters_10: u32,
}

impl SemesterDetails {
    /// Returns the semesters counted for a tier.
    pub fn for_tier(&self, tier: Tier) -> u32 {
        match tier {
            Tier::Hours40 => self.semesters_40,
            Tier::Hours30 => self.semesters_30,
            Tier::Hours20 => self.semesters_20,
            Tier::Hours10 => self.semesters_10,
        }
    }

    /// Adds semesters to a tier's count.
    pub fn add(&mut self, tier: Tier, semesters: u32) {
        let slot = match tier {
            Tier::Hours40 => &mut self.semesters_40,
            Tier::Hours30 => &mut self.semesters_30,
            Tier::Hours20 => &mut self.semesters_20,
            Tier::Hours10 => &mut self.semesters_10,
        };
        *slot += semesters;
    }
}

/// The outcome of an eligibility computation.
///
/// # Example
///
/// ```
/// use eligibility_engine::models::{
///     AuditTrace, CanonicalMonth, EligibilityReport, EligibilityStatus, SemesterDetails,
/// };
///
/// let report = EligibilityReport::new(
///     "52998224725".to_string(),
///     CanonicalMonth::new(2024, 6).unwrap(),
///     42,
///     48,
///     SemesterDetails { semesters_40: 7, ..Default::default() },
///     vec![],
///     AuditTrace::default(),
/// );
/// assert_eq!(report.status, EligibilityStatus::NotEligible);
/// assert_eq!(report.pending_months, 6);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EligibilityReport {
    /// The professional the report is about.
    pub professional_id: String,
    /// The month open-ended links were resolved to.
    pub reference_month: CanonicalMonth,
    /// Months credited toward eligibility.
    pub valid_months: u32,
    /// The verdict.
    pub status: EligibilityStatus,
    /// Months still missing, never negative.
    pub pending_months: u32,
    /// Semester breakdown per tier.
    pub details: SemesterDetails,
    /// Month-by-month coverage, chronologically ordered.
    pub coverage: Vec<MonthCoverage>,
    /// Decisions taken along the way.
    pub audit_trace: AuditTrace,
}

impl EligibilityReport {
    /// Builds a report, deriving `status` and `pending_months` from
    /// `valid_months` and `required_months`.
    pub fn new(
        professional_id: String,
        reference_month: CanonicalMonth,
        valid_months: u32,
        required_months: u32,
        details: SemesterDetails,
        coverage: Vec<MonthCoverage>,
        audit_trace: AuditTrace,
    ) -> Self {
        let status = if valid_months >= required_months {
            EligibilityStatus::Eligible
        } else {
            EligibilityStatus::NotEligible
        };

        Self {
            professional_id,
            reference_month,
            valid_months,
            status,
            pending_months: required_months.saturating_sub(valid_months),
            details,
            coverage,
            audit_trace,
        }
    }

    /// Returns true when the verdict is [`EligibilityStatus::Eligible`].
    pub fn is_eligible(&self) -> bool {
        self.status == EligibilityStatus::Eligible
    }
}
