//! Normalized employment links and role categories.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::MonthInterval;

/// The eligible professional categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleCategory {
    /// Clinical physician.
    ClinicalPhysician,
    /// Generalist physician.
    GeneralistPhysician,
    /// Family and community medicine physician.
    FamilyMedicinePhysician,
}

impl fmt::Display for RoleCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoleCategory::ClinicalPhysician => write!(f, "Clinical physician"),
            RoleCategory::GeneralistPhysician => write!(f, "Generalist physician"),
            RoleCategory::FamilyMedicinePhysician => write!(f, "Family medicine physician"),
        }
    }
}

/// A validated, canonical employment link.
///
/// Rows with an ineligible role or an invalid establishment are still
/// represented here so they stay visible in the audit trail; the coverage
/// builder decides whether they contribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CanonicalRow {
    /// Position of the originating raw row.
    pub row_index: usize,
    /// Normalized establishment identifier.
    pub establishment_id: String,
    /// The matched role category, if the role is eligible.
    pub role_category: Option<RoleCategory>,
    /// Whether the role denotes an eligible professional category.
    pub role_eligible: bool,
    /// Weekly hour commitment.
    pub weekly_hours: Decimal,
    /// Months covered by the link (inclusive).
    pub interval: MonthInterval,
    /// Whether the establishment is of a recognized category.
    pub establishment_valid: bool,
}

impl CanonicalRow {
    /// Returns true when both the role and the establishment qualify.
    pub fn is_qualifying(&self) -> bool {
        self.role_eligible && self.establishment_valid
    }

    /// Returns true for family-medicine links.
    pub fn is_family_medicine(&self) -> bool {
        self.role_category == Some(RoleCategory::FamilyMedicinePhysician)
    }
}
