//! Core data models for the Eligibility Engine.
//!
//! This module contains all the domain models used throughout the engine.

mod audit;
mod canonical_row;
mod coverage;
mod employment_link;
mod month;
mod professional;
mod progress;
mod report;

pub use audit::{AuditStep, AuditTrace, AuditWarning};
pub use canonical_row::{CanonicalRow, RoleCategory};
pub use coverage::{MonthCoverage, Tier};
pub use employment_link::{
    ESTABLISHMENT_ID_WIDTH, EmploymentLinkRow, EstablishmentRef, normalize_establishment_id,
};
pub use month::{CanonicalMonth, MonthInterval};
pub use professional::{PROFESSIONAL_ID_DIGITS, ProfessionalId};
pub use progress::{ComputationStage, ProgressEvent};
pub use report::{EligibilityReport, EligibilityStatus, SemesterDetails};
