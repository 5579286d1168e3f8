//! Raw row normalization.
//!
//! Converts an [`EmploymentLinkRow`] into a [`CanonicalRow`]: hours are parsed
//! and bounded, the interval is resolved, and the role and establishment are
//! tagged. Rows with an ineligible role or invalid establishment are still
//! normalized so they remain visible in the audit trail.

use std::str::FromStr;

use rust_decimal::Decimal;

use crate::config::{EligibilityPolicy, RoleCatalog};
use crate::error::{EngineError, EngineResult};
use crate::models::{CanonicalMonth, CanonicalRow, EmploymentLinkRow, normalize_establishment_id};

use super::month_interval::normalize_interval;
use super::role_check::classify_role;

/// Request-level inputs shared by every row normalization.
#[derive(Debug, Clone, Copy)]
pub struct NormalizationContext<'a> {
    /// Month ongoing links are resolved to.
    pub reference_month: CanonicalMonth,
    /// Policy supplying the plausible weekly bound.
    pub policy: &'a EligibilityPolicy,
    /// Role allow-list.
    pub roles: &'a RoleCatalog,
}

/// Parses a scraped weekly hour commitment.
///
/// Accepts a decimal comma (`"20,5"`). Fails with
/// [`EngineError::RowValidation`] when the value is blank, not a number,
/// negative, or above `max_weekly_hours`.
///
/// # Example
///
/// ```
/// use eligibility_engine::calculation::parse_weekly_hours;
/// use rust_decimal::Decimal;
///
/// let hours = parse_weekly_hours("20,5", 0, Decimal::new(168, 0)).unwrap();
/// assert_eq!(hours, Decimal::new(205, 1));
/// assert!(parse_weekly_hours("-1", 0, Decimal::new(168, 0)).is_err());
/// ```
pub fn parse_weekly_hours(
    raw: &str,
    row_index: usize,
    max_weekly_hours: Decimal,
) -> EngineResult<Decimal> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(EngineError::RowValidation {
            row_index,
            message: "weekly hours are missing".to_string(),
        });
    }

    let hours = Decimal::from_str(&trimmed.replace(',', ".")).map_err(|_| {
        EngineError::RowValidation {
            row_index,
            message: format!("weekly hours '{}' are not a number", trimmed),
        }
    })?;

    if hours < Decimal::ZERO {
        return Err(EngineError::RowValidation {
            row_index,
            message: format!("weekly hours cannot be negative, got {}", hours),
        });
    }

    if hours > max_weekly_hours {
        return Err(EngineError::RowValidation {
            row_index,
            message: format!(
                "weekly hours {} exceed the plausible bound of {}",
                hours, max_weekly_hours
            ),
        });
    }

    Ok(hours)
}

/// Normalizes a raw employment-link row.
///
/// `establishment_valid` is the verdict of the establishment validator for
/// the row's establishment. Errors are per-row: the caller drops the row and
/// carries on.
///
/// # Errors
///
/// - [`EngineError::RowValidation`] for a missing role or malformed hours
/// - [`EngineError::DateParse`] for an unparseable start or end date
/// - [`EngineError::InvalidInterval`] when the end precedes the start
pub fn normalize_row(
    row_index: usize,
    raw: &EmploymentLinkRow,
    establishment_valid: bool,
    context: &NormalizationContext<'_>,
) -> EngineResult<CanonicalRow> {
    if raw.role.trim().is_empty() {
        return Err(EngineError::RowValidation {
            row_index,
            message: "role is missing".to_string(),
        });
    }

    let establishment_id = normalize_establishment_id(&raw.establishment_id);
    if establishment_id.is_empty() {
        return Err(EngineError::RowValidation {
            row_index,
            message: "establishment identifier is missing".to_string(),
        });
    }

    let weekly_hours =
        parse_weekly_hours(&raw.weekly_hours, row_index, context.policy.max_weekly_hours)?;
    let interval = normalize_interval(
        &raw.start_date,
        raw.end_date.as_deref(),
        context.reference_month,
    )?;
    let role_category = classify_role(&raw.role, context.roles);

    Ok(CanonicalRow {
        row_index,
        establishment_id,
        role_category,
        role_eligible: role_category.is_some(),
        weekly_hours,
        interval,
        establishment_valid,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RoleCategory;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn raw(role: &str, hours: &str, start: &str, end: Option<&str>) -> EmploymentLinkRow {
        EmploymentLinkRow {
            establishment_id: "77485".to_string(),
            municipality_code: Some("355030".to_string()),
            establishment_name: Some("UBS CENTRAL".to_string()),
            role: role.to_string(),
            weekly_hours: hours.to_string(),
            start_date: start.to_string(),
            end_date: end.map(str::to_string),
        }
    }

    fn normalize(row: &EmploymentLinkRow, valid: bool) -> EngineResult<CanonicalRow> {
        let policy = EligibilityPolicy::default();
        let roles = RoleCatalog::default();
        let context = NormalizationContext {
            reference_month: CanonicalMonth::new(2024, 6).unwrap(),
            policy: &policy,
            roles: &roles,
        };
        normalize_row(4, row, valid, &context)
    }

    // ==========================================================================
    // RN-001: eligible row on a valid establishment
    // ==========================================================================
    #[test]
    fn test_rn_001_eligible_row() {
        let row = normalize(&raw("MEDICO CLINICO", "40", "01/2020", Some("12/2023")), true).unwrap();
        assert_eq!(row.row_index, 4);
        assert_eq!(row.establishment_id, "0077485");
        assert_eq!(row.role_category, Some(RoleCategory::ClinicalPhysician));
        assert!(row.role_eligible);
        assert_eq!(row.weekly_hours, dec("40"));
        assert_eq!(row.interval.len_months(), 48);
        assert!(row.is_qualifying());
    }

    // ==========================================================================
    // RN-002: ineligible role and invalid establishment are kept, not dropped
    // ==========================================================================
    #[test]
    fn test_rn_002_ineligible_rows_are_still_normalized() {
        let row = normalize(&raw("ENFERMEIRO", "40", "01/2020", None), false).unwrap();
        assert!(!row.role_eligible);
        assert!(!row.establishment_valid);
        assert_eq!(row.interval.end(), CanonicalMonth::new(2024, 6).unwrap());
    }

    #[test]
    fn test_decimal_comma_hours() {
        let row = normalize(&raw("225125", "32,5", "2024-01", Some("2024-02")), true).unwrap();
        assert_eq!(row.weekly_hours, dec("32.5"));
    }

    #[test]
    fn test_zero_hours_are_accepted() {
        let row = normalize(&raw("225125", "0", "2024-01", Some("2024-02")), true).unwrap();
        assert_eq!(row.weekly_hours, Decimal::ZERO);
    }

    // ==========================================================================
    // RN-003: hour validation failures
    // ==========================================================================
    #[test]
    fn test_rn_003_invalid_hours_fail_with_row_validation() {
        for hours in ["", "abc", "-4", "169"] {
            match normalize(&raw("225125", hours, "01/2020", None), true) {
                Err(EngineError::RowValidation { row_index, .. }) => assert_eq!(row_index, 4),
                other => panic!("Expected RowValidation for {:?}, got {:?}", hours, other),
            }
        }
    }

    #[test]
    fn test_missing_role_fails() {
        match normalize(&raw("  ", "40", "01/2020", None), true) {
            Err(EngineError::RowValidation { message, .. }) => {
                assert_eq!(message, "role is missing")
            }
            other => panic!("Expected RowValidation, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_establishment_fails() {
        let mut row = raw("225125", "40", "01/2020", None);
        row.establishment_id = " ".to_string();
        assert!(matches!(
            normalize(&row, true),
            Err(EngineError::RowValidation { .. })
        ));
    }

    #[test]
    fn test_bad_dates_surface_their_own_errors() {
        assert!(matches!(
            normalize(&raw("225125", "40", "never", None), true),
            Err(EngineError::DateParse { .. })
        ));
        assert!(matches!(
            normalize(&raw("225125", "40", "06/2023", Some("01/2023")), true),
            Err(EngineError::InvalidInterval { .. })
        ));
    }
}
