//! HTTP API module for the Eligibility Engine.
//!
//! This module provides the REST endpoints for computing a professional's
//! certification eligibility from their employment-link rows.

mod handlers;
mod request;
mod response;
mod state;

pub use handlers::create_router;
pub use request::{EligibilityRequest, EstablishmentVerdictRequest};
pub use response::{ApiError, EligibilityResponse};
pub use state::AppState;
