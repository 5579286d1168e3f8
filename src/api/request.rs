//! Request types for the Eligibility Engine API.
//!
//! This module defines the JSON request structures for the `/eligibility`
//! endpoint.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::collaborators::InMemoryEstablishmentDirectory;
use crate::models::{EmploymentLinkRow, EstablishmentRef, normalize_establishment_id};

/// Request body for the `/eligibility` endpoint.
///
/// Carries the professional's raw employment-link rows together with the
/// establishment verdicts the caller already knows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EligibilityRequest {
    /// The professional's 11-digit identifier (punctuation allowed).
    pub professional_id: String,
    /// Month ongoing links resolve to. Defaults to the current month.
    #[serde(default)]
    pub reference_month: Option<String>,
    /// Raw employment-link rows, exactly as scraped.
    pub rows: Vec<EmploymentLinkRow>,
    /// Known establishment verdicts.
    #[serde(default)]
    pub establishments: Vec<EstablishmentVerdictRequest>,
}

/// A known establishment verdict in an eligibility request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EstablishmentVerdictRequest {
    /// The establishment identifier.
    pub establishment_id: String,
    /// Municipality code. When absent the verdict applies in any municipality.
    #[serde(default)]
    pub municipality_code: Option<String>,
    /// Whether the establishment is of a recognized category.
    pub valid: bool,
}

impl EligibilityRequest {
    /// Builds an establishment directory from the request's verdicts.
    ///
    /// A verdict without a municipality code is registered for every
    /// municipality the rows mention for that establishment.
    pub fn establishment_directory(&self) -> InMemoryEstablishmentDirectory {
        let referenced: BTreeSet<EstablishmentRef> =
            self.rows.iter().map(EstablishmentRef::from_row).collect();

        let mut directory = InMemoryEstablishmentDirectory::new();
        for verdict in &self.establishments {
            let id = normalize_establishment_id(&verdict.establishment_id);
            let municipality_code = verdict
                .municipality_code
                .as_deref()
                .map(str::trim)
                .filter(|code| !code.is_empty())
                .map(str::to_string);

            match municipality_code {
                Some(code) => {
                    let establishment = EstablishmentRef {
                        id,
                        municipality_code: Some(code),
                        name: None,
                    };
                    directory = directory.with_verdict(&establishment, verdict.valid);
                }
                None => {
                    let bare = EstablishmentRef {
                        id: id.clone(),
                        municipality_code: None,
                        name: None,
                    };
                    directory = directory.with_verdict(&bare, verdict.valid);
                    for establishment in referenced.iter().filter(|r| r.id == id) {
                        directory = directory.with_verdict(establishment, verdict.valid);
                    }
                }
            }
        }
        directory
    }
}
