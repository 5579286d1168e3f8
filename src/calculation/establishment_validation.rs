//! Establishment validation.
//!
//! Decides whether an establishment is of a recognized category by asking the
//! persistent lookup first and the online scraper only when the lookup does
//! not know it. Verdicts are memoized for the lifetime of the validator, so
//! each distinct establishment is resolved at most once per computation.
//!
//! Any collaborator failure fails closed: the establishment is treated as
//! invalid and a warning is added to the audit trace.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::{debug, warn};

use crate::collaborators::{EstablishmentLookup, EstablishmentScraper};
use crate::error::{CollaboratorError, EngineError};
use crate::models::{AuditStep, AuditTrace, EstablishmentRef};

/// Where an establishment verdict came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VerdictSource {
    /// The persistent lookup knew the establishment.
    Lookup,
    /// The online scraper decided.
    Scraper,
    /// A collaborator failed and the establishment was treated as invalid.
    FailedClosed,
}

/// A resolved establishment verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EstablishmentVerdict {
    /// Whether the establishment is of a recognized category.
    pub valid: bool,
    /// Where the verdict came from.
    pub source: VerdictSource,
}

/// Memoizing establishment validator for a single computation.
pub struct EstablishmentValidator<'a> {
    lookup: &'a dyn EstablishmentLookup,
    scraper: &'a dyn EstablishmentScraper,
    verdicts: BTreeMap<String, EstablishmentVerdict>,
}

impl<'a> EstablishmentValidator<'a> {
    /// Creates a validator over the given collaborators.
    pub fn new(lookup: &'a dyn EstablishmentLookup, scraper: &'a dyn EstablishmentScraper) -> Self {
        Self {
            lookup,
            scraper,
            verdicts: BTreeMap::new(),
        }
    }

    /// Returns true if the establishment is of a recognized category.
    ///
    /// The first call for an establishment records an audit step (and a
    /// warning when it fails closed); later calls reuse the memoized verdict.
    pub fn validate(&mut self, establishment: &EstablishmentRef, trace: &mut AuditTrace) -> bool {
        let key = establishment.lookup_key();
        if let Some(verdict) = self.verdicts.get(&key) {
            return verdict.valid;
        }

        let verdict = self.resolve(establishment, trace);
        trace.record(AuditStep {
            step_number: trace.next_step_number(),
            rule_id: "establishment_validation".to_string(),
            rule_name: "Establishment Validation".to_string(),
            input: serde_json::json!({
                "establishment_id": establishment.id,
                "municipality_code": establishment.municipality_code,
            }),
            output: serde_json::json!({
                "valid": verdict.valid,
                "source": verdict.source,
            }),
            reasoning: match verdict.source {
                VerdictSource::Lookup => format!(
                    "Establishment {} found in the directory (valid: {})",
                    establishment.id, verdict.valid
                ),
                VerdictSource::Scraper => format!(
                    "Establishment {} unknown to the directory; registry check returned valid: {}",
                    establishment.id, verdict.valid
                ),
                VerdictSource::FailedClosed => format!(
                    "Establishment {} could not be verified and is treated as invalid",
                    establishment.id
                ),
            },
        });

        self.verdicts.insert(key, verdict);
        verdict.valid
    }

    /// Returns the memoized verdict for an establishment, if it was validated.
    pub fn verdict(&self, establishment: &EstablishmentRef) -> Option<EstablishmentVerdict> {
        self.verdicts.get(&establishment.lookup_key()).copied()
    }

    /// Number of distinct establishments validated so far.
    pub fn validated_count(&self) -> usize {
        self.verdicts.len()
    }

    fn resolve(
        &self,
        establishment: &EstablishmentRef,
        trace: &mut AuditTrace,
    ) -> EstablishmentVerdict {
        match self.lookup.lookup(establishment) {
            Ok(Some(valid)) => {
                debug!(establishment_id = %establishment.id, valid, "Establishment found in directory");
                return EstablishmentVerdict {
                    valid,
                    source: VerdictSource::Lookup,
                };
            }
            Ok(None) => {
                debug!(establishment_id = %establishment.id, "Establishment unknown, consulting registry");
            }
            Err(error) => return Self::fail_closed(establishment, error, trace),
        }

        match self.scraper.validate_online(establishment) {
            Ok(valid) => {
                if let Err(error) = self.lookup.record(establishment, valid) {
                    warn!(
                        establishment_id = %establishment.id,
                        error = %error,
                        "Failed to store establishment verdict"
                    );
                }
                EstablishmentVerdict {
                    valid,
                    source: VerdictSource::Scraper,
                }
            }
            Err(error) => Self::fail_closed(establishment, error, trace),
        }
    }

    fn fail_closed(
        establishment: &EstablishmentRef,
        cause: CollaboratorError,
        trace: &mut AuditTrace,
    ) -> EstablishmentVerdict {
        let error = EngineError::EstablishmentLookup {
            establishment_id: establishment.id.clone(),
            message: cause.to_string(),
        };
        warn!(
            establishment_id = %establishment.id,
            error = %error,
            "Establishment could not be verified, treating as invalid"
        );
        trace.warn(
            "ESTABLISHMENT_UNVERIFIED",
            format!("{}; treated as invalid", error),
            "high",
        );
        EstablishmentVerdict {
            valid: false,
            source: VerdictSource::FailedClosed,
        }
    }
}
