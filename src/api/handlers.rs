//! HTTP request handlers for the Eligibility Engine API.
//!
//! This module contains the handler functions for all API endpoints.

use std::time::Instant;

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::{StatusCode, header},
    response::IntoResponse,
    routing::{get, post},
};
use tracing::{info, warn};
use uuid::Uuid;

use crate::calculation::{Collaborators, EligibilityEngine, parse_month};
use crate::collaborators::{InMemoryRowSource, TracingProgress, UnavailableScraper};
use crate::error::EngineResult;
use crate::models::{CanonicalMonth, EligibilityReport, ProfessionalId};

use super::request::EligibilityRequest;
use super::response::{ApiError, ApiErrorResponse, EligibilityResponse};
use super::state::AppState;

/// Creates the API router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/eligibility", post(eligibility_handler))
        .with_state(state)
}

/// Handler for GET /health.
async fn health_handler() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "healthy" }))
}

/// Handler for POST /eligibility endpoint.
///
/// Accepts the professional's rows and known establishment verdicts and
/// returns the eligibility report.
async fn eligibility_handler(
    State(state): State<AppState>,
    payload: Result<Json<EligibilityRequest>, JsonRejection>,
) -> impl IntoResponse {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing eligibility request");

    let request = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => {
            let error = match rejection {
                JsonRejection::JsonDataError(err) => {
                    let body_text = err.body_text();
                    warn!(
                        correlation_id = %correlation_id,
                        error = %body_text,
                        "JSON data error"
                    );
                    if body_text.contains("missing field") {
                        ApiError::validation_error(body_text)
                    } else {
                        ApiError::malformed_json(body_text)
                    }
                }
                JsonRejection::JsonSyntaxError(err) => {
                    warn!(
                        correlation_id = %correlation_id,
                        error = %err,
                        "JSON syntax error"
                    );
                    ApiError::malformed_json(format!("Invalid JSON syntax: {}", err))
                }
                JsonRejection::MissingJsonContentType(_) => {
                    ApiError::new("MISSING_CONTENT_TYPE", "Content-Type must be application/json")
                }
                _ => ApiError::malformed_json("Failed to parse request body"),
            };
            return (
                StatusCode::BAD_REQUEST,
                [(header::CONTENT_TYPE, "application/json")],
                Json(error),
            )
                .into_response();
        }
    };

    let start_time = Instant::now();
    match evaluate_request(&state, &request, correlation_id) {
        Ok(report) => {
            info!(
                correlation_id = %correlation_id,
                rows = request.rows.len(),
                valid_months = report.valid_months,
                status = ?report.status,
                duration_us = start_time.elapsed().as_micros(),
                "Eligibility computed successfully"
            );
            (
                StatusCode::OK,
                [(header::CONTENT_TYPE, "application/json")],
                Json(EligibilityResponse::new(report)),
            )
                .into_response()
        }
        Err(err) => {
            warn!(
                correlation_id = %correlation_id,
                code = err.code(),
                error = %err,
                "Eligibility computation failed"
            );
            let api_error: ApiErrorResponse = err.into();
            (
                api_error.status,
                [(header::CONTENT_TYPE, "application/json")],
                Json(api_error.error),
            )
                .into_response()
        }
    }
}

/// Runs the engine over the collaborators described by the request.
fn evaluate_request(
    state: &AppState,
    request: &EligibilityRequest,
    correlation_id: Uuid,
) -> EngineResult<EligibilityReport> {
    let professional = ProfessionalId::parse(&request.professional_id)?;
    let reference_month = match request.reference_month.as_deref() {
        Some(value) if !value.trim().is_empty() => parse_month(value)?,
        _ => CanonicalMonth::current(),
    };

    let source = InMemoryRowSource::new().with_rows(&professional, request.rows.clone());
    let directory = request.establishment_directory();
    let engine = EligibilityEngine::new(
        state.config().config(),
        Collaborators {
            rows: &source,
            lookup: &directory,
            scraper: &UnavailableScraper,
        },
    )
    .with_reference_month(reference_month);

    let progress = TracingProgress::with_correlation_id(correlation_id.to_string());
    engine.compute_eligibility(professional.as_str(), &progress)
}
