//! Role eligibility checks.
//!
//! Decides whether an occupation code or description denotes one of the
//! eligible physician categories. Matching ignores case and Portuguese
//! diacritics, so "Médico Clínico" and "MEDICO CLINICO" are the same role.
//! An unknown or malformed role is simply not eligible; it is never an error.

use crate::config::RoleCatalog;
use crate::models::RoleCategory;

/// Upper-cases text, strips Portuguese diacritics and collapses whitespace.
///
/// ```
/// use eligibility_engine::calculation::fold_role_text;
///
/// assert_eq!(fold_role_text("  Médico da  Família "), "MEDICO DA FAMILIA");
/// ```
pub fn fold_role_text(value: &str) -> String {
    let folded: String = value.chars().map(fold_char).collect();
    folded
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_uppercase()
}

fn fold_char(c: char) -> char {
    match c {
        'á' | 'à' | 'â' | 'ã' | 'ä' | 'Á' | 'À' | 'Â' | 'Ã' | 'Ä' => 'A',
        'é' | 'è' | 'ê' | 'ë' | 'É' | 'È' | 'Ê' | 'Ë' => 'E',
        'í' | 'ì' | 'î' | 'ï' | 'Í' | 'Ì' | 'Î' | 'Ï' => 'I',
        'ó' | 'ò' | 'ô' | 'õ' | 'ö' | 'Ó' | 'Ò' | 'Ô' | 'Õ' | 'Ö' => 'O',
        'ú' | 'ù' | 'û' | 'ü' | 'Ú' | 'Ù' | 'Û' | 'Ü' => 'U',
        'ç' | 'Ç' => 'C',
        'ñ' | 'Ñ' => 'N',
        other => other,
    }
}

/// Returns the eligible category a role belongs to, if any.
///
/// A role made only of digits and punctuation is treated as an occupation
/// code and compared against the catalog codes; anything else is treated as
/// a description and matched against the term sets.
///
/// # Example
///
/// ```
/// use eligibility_engine::calculation::classify_role;
/// use eligibility_engine::config::RoleCatalog;
/// use eligibility_engine::models::RoleCategory;
///
/// let catalog = RoleCatalog::default();
/// assert_eq!(
///     classify_role("Médico Clínico", &catalog),
///     Some(RoleCategory::ClinicalPhysician)
/// );
/// assert_eq!(
///     classify_role("2251-70", &catalog),
///     Some(RoleCategory::GeneralistPhysician)
/// );
/// assert_eq!(classify_role("ENFERMEIRO", &catalog), None);
/// ```
pub fn classify_role(role: &str, catalog: &RoleCatalog) -> Option<RoleCategory> {
    let folded = fold_role_text(role);
    if folded.is_empty() {
        return None;
    }

    if !folded.chars().any(char::is_alphabetic) {
        let code: String = folded.chars().filter(char::is_ascii_digit).collect();
        if code.is_empty() {
            return None;
        }
        return catalog
            .roles
            .iter()
            .find(|pattern| pattern.codes.iter().any(|c| *c == code))
            .map(|pattern| pattern.category);
    }

    catalog
        .roles
        .iter()
        .find(|pattern| {
            pattern.term_sets.iter().any(|terms| {
                !terms.is_empty()
                    && terms
                        .iter()
                        .all(|term| folded.contains(&fold_role_text(term)))
            })
        })
        .map(|pattern| pattern.category)
}

/// Returns true if the role denotes an eligible professional category.
pub fn is_eligible_role(role: &str, catalog: &RoleCatalog) -> bool {
    classify_role(role, catalog).is_some()
}
