//! Configuration types for eligibility computation.
//!
//! This module contains the strongly-typed configuration structures that
//! are deserialized from YAML configuration files.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{RoleCategory, Tier};

/// Default number of months required for eligibility.
pub const DEFAULT_REQUIRED_MONTHS: u32 = 48;

/// Default number of contiguous months making up a semester.
pub const DEFAULT_SEMESTER_MONTHS: u32 = 6;

/// Domain policy knobs for an eligibility computation.
///
/// Loaded from `policy.yaml`. Missing fields take their default values.
///
/// # Example
///
/// ```
/// use eligibility_engine::config::EligibilityPolicy;
/// use eligibility_engine::models::Tier;
///
/// let policy = EligibilityPolicy::default();
/// assert_eq!(policy.required_months, 48);
/// assert!(policy.counts(Tier::Hours20));
/// assert!(!policy.counts(Tier::Hours10));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EligibilityPolicy {
    /// Months needed for an ELIGIBLE verdict.
    pub required_months: u32,
    /// Contiguous same-tier months making up one semester.
    pub semester_months: u32,
    /// Tiers whose semesters count toward `valid_months`.
    pub counted_tiers: Vec<Tier>,
    /// Whether leftover months of a run may join the next lower counted tier.
    pub cross_tier_absorption: bool,
    /// Largest plausible weekly hour commitment for a single row.
    pub max_weekly_hours: Decimal,
    /// Whether family-medicine links need a valid establishment to count.
    pub family_medicine_requires_valid_establishment: bool,
}

impl Default for EligibilityPolicy {
    fn default() -> Self {
        Self {
            required_months: DEFAULT_REQUIRED_MONTHS,
            semester_months: DEFAULT_SEMESTER_MONTHS,
            counted_tiers: vec![Tier::Hours40, Tier::Hours30, Tier::Hours20],
            cross_tier_absorption: false,
            max_weekly_hours: Decimal::new(168, 0),
            family_medicine_requires_valid_establishment: true,
        }
    }
}

impl EligibilityPolicy {
    /// Returns true if semesters of `tier` count toward `valid_months`.
    pub fn counts(&self, tier: Tier) -> bool {
        self.counted_tiers.contains(&tier)
    }

    /// The highest counted tier strictly below `tier`, if any.
    pub fn next_lower_counted(&self, tier: Tier) -> Option<Tier> {
        Tier::ALL
            .iter()
            .copied()
            .find(|candidate| *candidate < tier && self.counts(*candidate))
    }

    /// Checks internal consistency, returning a description of the first
    /// problem found.
    pub fn check(&self) -> Result<(), String> {
        if self.semester_months == 0 {
            return Err("semester_months must be greater than zero".to_string());
        }
        if self.counted_tiers.is_empty() {
            return Err("counted_tiers must name at least one tier".to_string());
        }
        if self.max_weekly_hours <= Decimal::ZERO {
            return Err("max_weekly_hours must be positive".to_string());
        }
        Ok(())
    }
}

/// Patterns identifying one eligible role category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RolePattern {
    /// The category these patterns identify.
    pub category: RoleCategory,
    /// Exact occupation codes.
    #[serde(default)]
    pub codes: Vec<String>,
    /// Term sets; a description matches when it contains every term of any set.
    #[serde(default)]
    pub term_sets: Vec<Vec<String>>,
}

/// The allow-list of eligible roles, loaded from `roles.yaml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleCatalog {
    /// Patterns in priority order.
    pub roles: Vec<RolePattern>,
}

impl Default for RoleCatalog {
    fn default() -> Self {
        let terms = |words: &[&str]| words.iter().map(|w| w.to_string()).collect::<Vec<_>>();
        Self {
            roles: vec![
                RolePattern {
                    category: RoleCategory::FamilyMedicinePhysician,
                    codes: vec!["225130".to_string(), "225142".to_string()],
                    term_sets: vec![terms(&["MEDICO", "FAMILIA"])],
                },
                RolePattern {
                    category: RoleCategory::ClinicalPhysician,
                    codes: vec!["225125".to_string()],
                    term_sets: vec![terms(&["MEDICO", "CLINICO"])],
                },
                RolePattern {
                    category: RoleCategory::GeneralistPhysician,
                    codes: vec!["225170".to_string()],
                    term_sets: vec![terms(&["MEDICO", "GENERALISTA"])],
                },
            ],
        }
    }
}

/// The complete engine configuration loaded from YAML files.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EngineConfig {
    policy: EligibilityPolicy,
    roles: RoleCatalog,
}

impl EngineConfig {
    /// Creates an EngineConfig from its component parts.
    pub fn new(policy: EligibilityPolicy, roles: RoleCatalog) -> Self {
        Self { policy, roles }
    }

    /// Returns the eligibility policy.
    pub fn policy(&self) -> &EligibilityPolicy {
        &self.policy
    }

    /// Returns the role allow-list.
    pub fn roles(&self) -> &RoleCatalog {
        &self.roles
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_lower_counted_skips_uncounted_tiers() {
        let policy = EligibilityPolicy {
            counted_tiers: vec![Tier::Hours40, Tier::Hours20],
            ..Default::default()
        };
        assert_eq!(policy.next_lower_counted(Tier::Hours40), Some(Tier::Hours20));
        assert_eq!(policy.next_lower_counted(Tier::Hours20), None);
    }

    #[test]
    fn test_check_rejects_zero_semester() {
        let policy = EligibilityPolicy {
            semester_months: 0,
            ..Default::default()
        };
        assert!(policy.check().is_err());
    }

    #[test]
    fn test_check_rejects_empty_counted_tiers() {
        let policy = EligibilityPolicy {
            counted_tiers: vec![],
            ..Default::default()
        };
        assert_eq!(
            policy.check().unwrap_err(),
            "counted_tiers must name at least one tier"
        );
    }

    #[test]
    fn test_partial_policy_yaml_uses_defaults() {
        let policy: EligibilityPolicy =
            serde_yaml::from_str("required_months: 36\ncross_tier_absorption: true\n").unwrap();
        assert_eq!(policy.required_months, 36);
        assert!(policy.cross_tier_absorption);
        assert_eq!(policy.semester_months, DEFAULT_SEMESTER_MONTHS);
        assert_eq!(policy.counted_tiers.len(), 3);
    }

    #[test]
    fn test_default_catalog_covers_all_categories() {
        let catalog = RoleCatalog::default();
        let categories: Vec<RoleCategory> = catalog.roles.iter().map(|r| r.category).collect();
        assert!(categories.contains(&RoleCategory::ClinicalPhysician));
        assert!(categories.contains(&RoleCategory::GeneralistPhysician));
        assert!(categories.contains(&RoleCategory::FamilyMedicinePhysician));
    }
}
