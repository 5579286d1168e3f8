//! Raw employment-link rows and establishment references.
//!
//! An [`EmploymentLinkRow`] is the untouched record handed over by the row
//! source: hours and dates are still text exactly as they were scraped.

use serde::{Deserialize, Deserializer, Serialize};

/// Width of a zero-padded numeric establishment identifier.
pub const ESTABLISHMENT_ID_WIDTH: usize = 7;

/// A raw employment link between a professional and an establishment.
///
/// # Example
///
/// ```
/// use eligibility_engine::models::EmploymentLinkRow;
///
/// let row: EmploymentLinkRow = serde_json::from_str(r#"{
///     "establishment_id": "2077485",
///     "role": "MEDICO CLINICO",
///     "weekly_hours": 40,
///     "start_date": "01/2020",
///     "end_date": "12/2023"
/// }"#).unwrap();
/// assert_eq!(row.weekly_hours, "40");
/// assert!(row.municipality_code.is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmploymentLinkRow {
    /// Establishment identifier as published by the registry.
    pub establishment_id: String,
    /// Municipality code of the establishment, when known.
    #[serde(default)]
    pub municipality_code: Option<String>,
    /// Establishment name, used by the scraping fallback.
    #[serde(default)]
    pub establishment_name: Option<String>,
    /// Occupation code or free-text description.
    pub role: String,
    /// Weekly hour commitment as scraped (e.g. "40", "20,5").
    #[serde(deserialize_with = "hours_as_text")]
    pub weekly_hours: String,
    /// Start of the link.
    pub start_date: String,
    /// End of the link; `None` for an ongoing link.
    #[serde(default)]
    pub end_date: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum HoursText {
    Text(String),
    Integer(i64),
    Float(f64),
}

fn hours_as_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match HoursText::deserialize(deserializer)? {
        HoursText::Text(text) => text,
        HoursText::Integer(value) => value.to_string(),
        HoursText::Float(value) => value.to_string(),
    })
}

/// Identity of an establishment as seen by the lookup and scraping
/// collaborators.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EstablishmentRef {
    /// Normalized establishment identifier.
    pub id: String,
    /// Municipality code, when known.
    #[serde(default)]
    pub municipality_code: Option<String>,
    /// Establishment name, when known.
    #[serde(default)]
    pub name: Option<String>,
}

impl EstablishmentRef {
    /// Builds the reference for the establishment named by a raw row.
    pub fn from_row(row: &EmploymentLinkRow) -> Self {
        Self {
            id: normalize_establishment_id(&row.establishment_id),
            municipality_code: row
                .municipality_code
                .as_deref()
                .map(str::trim)
                .filter(|code| !code.is_empty())
                .map(str::to_string),
            name: row
                .establishment_name
                .as_deref()
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(str::to_string),
        }
    }

    /// The key used by the persistence collaborator: municipality code
    /// followed by the establishment id.
    pub fn lookup_key(&self) -> String {
        match &self.municipality_code {
            Some(code) => format!("{}{}", code, self.id),
            None => self.id.clone(),
        }
    }
}

/// Trims an establishment identifier and left-pads purely numeric ids with
/// zeros to [`ESTABLISHMENT_ID_WIDTH`] digits.
///
/// ```
/// use eligibility_engine::models::normalize_establishment_id;
///
/// assert_eq!(normalize_establishment_id(" 77485 "), "0077485");
/// assert_eq!(normalize_establishment_id("HOSP-1"), "HOSP-1");
/// ```
pub fn normalize_establishment_id(raw: &str) -> String {
    let trimmed = raw.trim();
    if !trimmed.is_empty() && trimmed.chars().all(|c| c.is_ascii_digit()) {
        format!("{:0>width$}", trimmed, width = ESTABLISHMENT_ID_WIDTH)
    } else {
        trimmed.to_string()
    }
}
