//! Error types for the Eligibility Engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for all error conditions that can occur during an eligibility computation.
//! Per-row errors ([`EngineError::DateParse`], [`EngineError::InvalidInterval`],
//! [`EngineError::RowValidation`]) are recovered by dropping the row; the
//! request-level errors abort the computation.

use thiserror::Error;

/// The main error type for the Eligibility Engine.
///
/// # Example
///
/// ```
/// use eligibility_engine::error::EngineError;
///
/// let error = EngineError::DateParse {
///     value: "13/2024".to_string(),
/// };
/// assert_eq!(error.to_string(), "Invalid date '13/2024'");
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// A date string could not be parsed into a calendar month.
    #[error("Invalid date '{value}'")]
    DateParse {
        /// The raw date string.
        value: String,
    },

    /// An interval ended before it started.
    #[error("Invalid interval: end {end} is before start {start}")]
    InvalidInterval {
        /// The interval start, formatted as MM/YYYY.
        start: String,
        /// The interval end, formatted as MM/YYYY.
        end: String,
    },

    /// A raw employment-link row carried malformed hours or role data.
    #[error("Invalid row {row_index}: {message}")]
    RowValidation {
        /// Position of the row in the source sequence.
        row_index: usize,
        /// A description of what made the row invalid.
        message: String,
    },

    /// An establishment collaborator failed while verifying an establishment.
    #[error("Establishment lookup failed for '{establishment_id}': {message}")]
    EstablishmentLookup {
        /// The establishment being verified.
        establishment_id: String,
        /// A description of the collaborator failure.
        message: String,
    },

    /// The upstream row source was unavailable.
    #[error("Failed to retrieve employment links for '{professional_id}': {message}")]
    DataRetrieval {
        /// The professional whose rows were requested.
        professional_id: String,
        /// A description of the retrieval failure.
        message: String,
    },

    /// The request itself was malformed (identifier or row set).
    #[error("Validation failed for '{field}': {message}")]
    Validation {
        /// The offending field.
        field: String,
        /// A description of the validation failure.
        message: String,
    },

    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },
}

impl EngineError {
    /// Returns true when retrying the same request may succeed.
    ///
    /// Only upstream retrieval failures are transient; malformed input
    /// fails the same way every time.
    pub fn is_retryable(&self) -> bool {
        matches!(self, EngineError::DataRetrieval { .. })
    }

    /// A stable machine-readable code for the error kind.
    pub fn code(&self) -> &'static str {
        match self {
            EngineError::DateParse { .. } => "DATE_PARSE_ERROR",
            EngineError::InvalidInterval { .. } => "INVALID_INTERVAL",
            EngineError::RowValidation { .. } => "ROW_VALIDATION_ERROR",
            EngineError::EstablishmentLookup { .. } => "ESTABLISHMENT_LOOKUP_ERROR",
            EngineError::DataRetrieval { .. } => "DATA_RETRIEVAL_ERROR",
            EngineError::Validation { .. } => "VALIDATION_ERROR",
            EngineError::ConfigNotFound { .. } | EngineError::ConfigParseError { .. } => {
                "CONFIG_ERROR"
            }
        }
    }
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;

/// Failure reported by an external collaborator (row source, establishment
/// lookup or scraper).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{collaborator} failed: {message}")]
pub struct CollaboratorError {
    /// Which collaborator failed (e.g. "establishment_lookup").
    pub collaborator: String,
    /// A description of the failure.
    pub message: String,
}

impl CollaboratorError {
    /// Creates a new collaborator error.
    pub fn new(collaborator: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            collaborator: collaborator.into(),
            message: message.into(),
        }
    }
}
