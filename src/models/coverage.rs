//! Hour tiers and the month-by-month coverage timeline.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::CanonicalMonth;

/// A weekly-hour qualification tier.
///
/// Tiers are ordered by threshold, so `Tier::Hours40 > Tier::Hours10`.
///
/// # Example
///
/// ```
/// use eligibility_engine::models::Tier;
/// use rust_decimal::Decimal;
///
/// assert_eq!(Tier::Hours30.threshold(), Decimal::new(30, 0));
/// assert_eq!(Tier::ALL[0], Tier::Hours40);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Tier {
    /// At least 10 hours per week.
    #[serde(rename = "10h")]
    Hours10,
    /// At least 20 hours per week.
    #[serde(rename = "20h")]
    Hours20,
    /// At least 30 hours per week.
    #[serde(rename = "30h")]
    Hours30,
    /// At least 40 hours per week.
    #[serde(rename = "40h")]
    Hours40,
}

impl Tier {
    /// Every tier, highest threshold first.
    pub const ALL: [Tier; 4] = [Tier::Hours40, Tier::Hours30, Tier::Hours20, Tier::Hours10];

    /// The inclusive weekly-hour threshold of the tier.
    pub fn threshold(&self) -> Decimal {
        match self {
            Tier::Hours40 => Decimal::new(40, 0),
            Tier::Hours30 => Decimal::new(30, 0),
            Tier::Hours20 => Decimal::new(20, 0),
            Tier::Hours10 => Decimal::new(10, 0),
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}h", self.threshold())
    }
}

/// Coverage for one calendar month.
///
/// `hours` is the maximum weekly commitment among the qualifying rows that
/// cover the month (never a sum), and `tier` the highest tier that value
/// meets. Months below the lowest tier are not part of the coverage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthCoverage {
    /// The calendar month.
    pub month: CanonicalMonth,
    /// Effective weekly hours for the month.
    pub hours: Decimal,
    /// The best tier met.
    pub tier: Tier,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tiers_are_ordered_by_threshold() {
        assert!(Tier::Hours40 > Tier::Hours30);
        assert!(Tier::Hours20 > Tier::Hours10);
        let mut sorted = Tier::ALL.to_vec();
        sorted.sort_by(|a, b| b.cmp(a));
        assert_eq!(sorted, Tier::ALL.to_vec());
    }

    #[test]
    fn test_tier_display_and_serialization() {
        assert_eq!(Tier::Hours20.to_string(), "20h");
        assert_eq!(serde_json::to_string(&Tier::Hours40).unwrap(), "\"40h\"");
        let tier: Tier = serde_json::from_str("\"10h\"").unwrap();
        assert_eq!(tier, Tier::Hours10);
    }

    #[test]
    fn test_month_coverage_serialization() {
        let coverage = MonthCoverage {
            month: CanonicalMonth::new(2024, 2).unwrap(),
            hours: Decimal::new(325, 1),
            tier: Tier::Hours30,
        };
        let json = serde_json::to_string(&coverage).unwrap();
        assert_eq!(json, r#"{"month":"2024-02","hours":"32.5","tier":"30h"}"#);
    }
}
