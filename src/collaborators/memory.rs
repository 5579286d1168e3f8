//! In-memory collaborators.
//!
//! Provides `InMemoryRowSource`, `InMemoryEstablishmentDirectory` and
//! `UnavailableScraper`. The HTTP API builds them from the request payload;
//! tests use them to script lookups and failures.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Mutex, MutexGuard};

use crate::error::CollaboratorError;
use crate::models::{EmploymentLinkRow, EstablishmentRef, ProfessionalId};

use super::{EstablishmentLookup, EstablishmentScraper, RowSource};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

// ---------------------------------------------------------------------------
// InMemoryRowSource
// ---------------------------------------------------------------------------

/// Row source serving a fixed set of rows, optionally scripted to fail.
#[derive(Debug, Default)]
pub struct InMemoryRowSource {
    rows: BTreeMap<String, Vec<EmploymentLinkRow>>,
    failure: Option<String>,
}

impl InMemoryRowSource {
    /// Creates an empty source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the rows of a professional.
    pub fn with_rows(mut self, professional_id: &ProfessionalId, rows: Vec<EmploymentLinkRow>) -> Self {
        self.rows.insert(professional_id.as_str().to_string(), rows);
        self
    }

    /// Makes every fetch fail with the given message.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            rows: BTreeMap::new(),
            failure: Some(message.into()),
        }
    }
}

impl RowSource for InMemoryRowSource {
    fn fetch_rows(
        &self,
        professional_id: &ProfessionalId,
    ) -> Result<Vec<EmploymentLinkRow>, CollaboratorError> {
        if let Some(message) = &self.failure {
            return Err(CollaboratorError::new("row_source", message.clone()));
        }
        Ok(self
            .rows
            .get(professional_id.as_str())
            .cloned()
            .unwrap_or_default())
    }
}

// ---------------------------------------------------------------------------
// InMemoryEstablishmentDirectory
// ---------------------------------------------------------------------------

/// Establishment lookup backed by a map of verdicts.
///
/// Verdicts are keyed on [`EstablishmentRef::lookup_key`], so the
/// municipality code takes part in the match. Every lookup is counted.
#[derive(Debug, Default)]
pub struct InMemoryEstablishmentDirectory {
    verdicts: Mutex<BTreeMap<String, bool>>,
    failing: BTreeSet<String>,
    lookups: Mutex<Vec<String>>,
}

impl InMemoryEstablishmentDirectory {
    /// Creates an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a verdict for an establishment.
    pub fn with_verdict(self, establishment: &EstablishmentRef, valid: bool) -> Self {
        lock(&self.verdicts).insert(establishment.lookup_key(), valid);
        self
    }

    /// Makes lookups of an establishment fail.
    pub fn with_failure(mut self, establishment: &EstablishmentRef) -> Self {
        self.failing.insert(establishment.lookup_key());
        self
    }

    /// Returns the stored verdict for an establishment, if any.
    pub fn verdict(&self, establishment: &EstablishmentRef) -> Option<bool> {
        lock(&self.verdicts).get(&establishment.lookup_key()).copied()
    }

    /// Number of lookups performed for an establishment.
    pub fn lookup_count(&self, establishment: &EstablishmentRef) -> usize {
        let key = establishment.lookup_key();
        lock(&self.lookups).iter().filter(|k| **k == key).count()
    }
}

impl EstablishmentLookup for InMemoryEstablishmentDirectory {
    fn lookup(&self, establishment: &EstablishmentRef) -> Result<Option<bool>, CollaboratorError> {
        let key = establishment.lookup_key();
        lock(&self.lookups).push(key.clone());

        if self.failing.contains(&key) {
            return Err(CollaboratorError::new(
                "establishment_lookup",
                format!("lookup of establishment {} failed", establishment.id),
            ));
        }
        Ok(lock(&self.verdicts).get(&key).copied())
    }

    fn record(&self, establishment: &EstablishmentRef, valid: bool) -> Result<(), CollaboratorError> {
        lock(&self.verdicts).insert(establishment.lookup_key(), valid);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Scrapers
// ---------------------------------------------------------------------------

/// Scraper that can never reach the registry.
///
/// Unknown establishments therefore fail closed.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableScraper;

impl EstablishmentScraper for UnavailableScraper {
    fn validate_online(&self, establishment: &EstablishmentRef) -> Result<bool, CollaboratorError> {
        Err(CollaboratorError::new(
            "establishment_scraper",
            format!("registry unavailable for establishment {}", establishment.id),
        ))
    }
}
