//! Professional identifier.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// Number of digits in a professional identifier.
pub const PROFESSIONAL_ID_DIGITS: usize = 11;

/// A validated professional identifier (11-digit taxpayer number).
///
/// # Example
///
/// ```
/// use eligibility_engine::models::ProfessionalId;
///
/// let id = ProfessionalId::parse("529.982.247-25").unwrap();
/// assert_eq!(id.as_str(), "52998224725");
/// assert!(ProfessionalId::parse("111.111.111-11").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ProfessionalId(String);

impl ProfessionalId {
    /// Strips punctuation and validates the remaining digits.
    pub fn parse(raw: &str) -> EngineResult<Self> {
        let digits: String = raw.chars().filter(char::is_ascii_digit).collect();

        if digits.len() != PROFESSIONAL_ID_DIGITS {
            return Err(EngineError::Validation {
                field: "professional_id".to_string(),
                message: format!(
                    "must have exactly {} digits, got {}",
                    PROFESSIONAL_ID_DIGITS,
                    digits.len()
                ),
            });
        }

        let first = digits.as_bytes()[0];
        if digits.bytes().all(|b| b == first) {
            return Err(EngineError::Validation {
                field: "professional_id".to_string(),
                message: "all digits are identical".to_string(),
            });
        }

        Ok(Self(digits))
    }

    /// The normalized digits.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProfessionalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for ProfessionalId {
    type Error = EngineError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ProfessionalId> for String {
    fn from(id: ProfessionalId) -> Self {
        id.0
    }
}
