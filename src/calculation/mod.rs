//! Calculation logic for the Eligibility Engine.
//!
//! This module contains the month and interval arithmetic, role and
//! establishment checks, row normalization, the deduplicated coverage
//! timeline, tier classification, semester aggregation, and the
//! [`EligibilityEngine`] orchestrating them.

mod coverage;
mod eligibility;
mod establishment_validation;
mod month_interval;
mod role_check;
mod row_normalizer;
mod semesters;
mod tier;

pub use coverage::{CoverageResult, build_coverage, contributes};
pub use eligibility::{Collaborators, EligibilityEngine};
pub use establishment_validation::{EstablishmentValidator, EstablishmentVerdict, VerdictSource};
pub use month_interval::{
    MonthIter, intersect, merge_intervals, months_in, normalize_interval, parse_month,
};
pub use role_check::{classify_role, fold_role_text, is_eligible_role};
pub use row_normalizer::{NormalizationContext, normalize_row, parse_weekly_hours};
pub use semesters::{RunEdge, SemesterCount, TierRun, count_semesters};
pub use tier::{classify_hours, meets_threshold};
