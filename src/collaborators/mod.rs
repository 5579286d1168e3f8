//! Collaborator interfaces the engine depends on.
//!
//! The engine never scrapes, queries a database, or streams progress itself.
//! It talks to these traits, and callers hand it whatever implementations
//! fit their host: the in-memory versions in [`memory`] and [`progress`] are
//! used by the HTTP API and the test suite.

pub mod memory;
pub mod progress;

use crate::error::CollaboratorError;
use crate::models::{EmploymentLinkRow, EstablishmentRef, ProfessionalId, ProgressEvent};

pub use memory::{InMemoryEstablishmentDirectory, InMemoryRowSource, UnavailableScraper};
pub use progress::{NoopProgress, ProgressLog, TracingProgress};

/// Supplies the raw employment-link rows of a professional.
pub trait RowSource: Send + Sync {
    /// Fetches every row recorded for the professional.
    fn fetch_rows(
        &self,
        professional_id: &ProfessionalId,
    ) -> Result<Vec<EmploymentLinkRow>, CollaboratorError>;
}

/// Persistent store of establishment validity verdicts.
pub trait EstablishmentLookup: Send + Sync {
    /// Returns `Some(valid)` for a known establishment, `None` when unknown.
    fn lookup(&self, establishment: &EstablishmentRef) -> Result<Option<bool>, CollaboratorError>;

    /// Stores a verdict obtained elsewhere. Stores that cannot learn ignore it.
    fn record(
        &self,
        _establishment: &EstablishmentRef,
        _valid: bool,
    ) -> Result<(), CollaboratorError> {
        Ok(())
    }
}

/// Online fallback consulted when the lookup does not know an establishment.
pub trait EstablishmentScraper: Send + Sync {
    /// Decides whether the establishment is of a recognized category.
    fn validate_online(&self, establishment: &EstablishmentRef) -> Result<bool, CollaboratorError>;
}

/// Receives progress checkpoints while a computation runs.
pub trait ProgressSink: Send + Sync {
    /// Observes one event. Sinks must not fail the computation.
    fn emit(&self, event: &ProgressEvent);
}
