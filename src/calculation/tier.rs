//! Weekly-hour tier classification.
//!
//! Thresholds are inclusive: exactly 40 hours is a 40h month, 39.99 hours is
//! a 30h month.

use rust_decimal::Decimal;

use crate::models::Tier;

/// Returns true if `hours` meets the tier's threshold (inclusive).
pub fn meets_threshold(hours: Decimal, tier: Tier) -> bool {
    hours >= tier.threshold()
}

/// Classifies an effective weekly hour value into the highest tier it meets.
///
/// Returns `None` for anything below the lowest (10h) threshold.
///
/// # Example
///
/// ```
/// use eligibility_engine::calculation::classify_hours;
/// use eligibility_engine::models::Tier;
/// use rust_decimal::Decimal;
///
/// assert_eq!(classify_hours(Decimal::new(40, 0)), Some(Tier::Hours40));
/// assert_eq!(classify_hours(Decimal::new(3999, 2)), Some(Tier::Hours30));
/// assert_eq!(classify_hours(Decimal::new(9, 0)), None);
/// ```
pub fn classify_hours(hours: Decimal) -> Option<Tier> {
    Tier::ALL
        .iter()
        .copied()
        .find(|tier| meets_threshold(hours, *tier))
}
