//! Integration tests for the Eligibility Engine.
//!
//! This test suite covers the end-to-end scenarios through the HTTP API:
//! - Single qualifying link (eligible)
//! - Partial semester
//! - Overlapping links across establishments
//! - Ineligible roles
//! - Fail-closed establishments
//! - Malformed rows and fatal input errors

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use serde_json::{Value, json};
use tower::ServiceExt;

use eligibility_engine::api::{AppState, create_router};
use eligibility_engine::config::ConfigLoader;

// =============================================================================
// Test Helpers
// =============================================================================

const PROFESSIONAL: &str = "529.982.247-25";

fn create_router_for_test() -> Router {
    let config = ConfigLoader::load("./config/default").expect("Failed to load config");
    create_router(AppState::new(config))
}

fn link(establishment: &str, role: &str, hours: Value, start: &str, end: Option<&str>) -> Value {
    json!({
        "establishment_id": establishment,
        "municipality_code": "355030",
        "establishment_name": "UBS CENTRAL",
        "role": role,
        "weekly_hours": hours,
        "start_date": start,
        "end_date": end,
    })
}

fn valid(establishment: &str) -> Value {
    json!({ "establishment_id": establishment, "valid": true })
}

fn request(rows: Vec<Value>, establishments: Vec<Value>) -> Value {
    json!({
        "professional_id": PROFESSIONAL,
        "reference_month": "06/2024",
        "rows": rows,
        "establishments": establishments,
    })
}

async fn post_eligibility(router: Router, body: Value) -> (StatusCode, Value) {
    let response = router
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/eligibility")
                .header("Content-Type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: Value = serde_json::from_slice(&body).unwrap();
    (status, json)
}

fn warning_codes(body: &Value) -> Vec<String> {
    body["report"]["audit_trace"]["warnings"]
        .as_array()
        .unwrap()
        .iter()
        .map(|w| w["code"].as_str().unwrap().to_string())
        .collect()
}

// =============================================================================
// Eligibility scenarios
// =============================================================================

#[tokio::test]
async fn test_single_qualifying_link_is_eligible() {
    let body = request(
        vec![link("1234567", "MEDICO CLINICO", json!(40), "01/2020", Some("12/2023"))],
        vec![valid("1234567")],
    );
    let (status, json) = post_eligibility(create_router_for_test(), body).await;

    assert_eq!(status, StatusCode::OK);
    let report = &json["report"];
    assert_eq!(report["professional_id"], "52998224725");
    assert_eq!(report["valid_months"], 48);
    assert_eq!(report["status"], "ELIGIBLE");
    assert_eq!(report["pending_months"], 0);
    assert_eq!(report["details"]["semesters_40"], 8);
    assert_eq!(report["coverage"].as_array().unwrap().len(), 48);
    assert!(json["calculation_id"].is_string());
    assert!(json["timestamp"].is_string());
}

#[tokio::test]
async fn test_partial_semester_is_not_counted() {
    let body = request(
        vec![link("1234567", "225125", json!("40"), "01/2020", Some("08/2023"))],
        vec![valid("1234567")],
    );
    let (status, json) = post_eligibility(create_router_for_test(), body).await;

    assert_eq!(status, StatusCode::OK);
    let report = &json["report"];
    assert_eq!(report["details"]["semesters_40"], 7);
    assert_eq!(report["valid_months"], 42);
    assert_eq!(report["status"], "NOT_ELIGIBLE");
    assert_eq!(report["pending_months"], 6);
}

#[tokio::test]
async fn test_mixed_tiers_count_independently() {
    // 24 months at 40h followed by 24 months at 20h in another establishment.
    let body = request(
        vec![
            link("1", "MEDICO CLINICO", json!(40), "01/2020", Some("12/2021")),
            link("2", "MEDICO GENERALISTA", json!("20"), "01/2022", Some("12/2023")),
        ],
        vec![valid("1"), valid("2")],
    );
    let (_, json) = post_eligibility(create_router_for_test(), body).await;

    let report = &json["report"];
    assert_eq!(report["details"]["semesters_40"], 4);
    assert_eq!(report["details"]["semesters_20"], 4);
    assert_eq!(report["valid_months"], 48);
    assert_eq!(report["status"], "ELIGIBLE");
}

#[tokio::test]
async fn test_overlapping_links_take_the_higher_tier() {
    // Same 24 months at 20h and at 40h: the months count once, at 40h.
    let body = request(
        vec![
            link("1", "MEDICO CLINICO", json!(20), "01/2022", Some("12/2023")),
            link("2", "MEDICO CLINICO", json!(40), "01/2022", Some("12/2023")),
        ],
        vec![valid("1"), valid("2")],
    );
    let (_, json) = post_eligibility(create_router_for_test(), body).await;

    let report = &json["report"];
    assert_eq!(report["details"]["semesters_40"], 4);
    assert_eq!(report["details"]["semesters_20"], 0);
    assert_eq!(report["valid_months"], 24);
}

#[tokio::test]
async fn test_ongoing_link_resolves_to_reference_month() {
    let body = request(
        vec![link("1", "MEDICO CLINICO", json!(40), "07/2020", None)],
        vec![valid("1")],
    );
    let (_, json) = post_eligibility(create_router_for_test(), body).await;

    let report = &json["report"];
    assert_eq!(report["reference_month"], "2024-06");
    assert_eq!(report["valid_months"], 48);
    let coverage = report["coverage"].as_array().unwrap();
    assert_eq!(coverage.last().unwrap()["month"], "2024-06");
}

#[tokio::test]
async fn test_ineligible_role_is_excluded() {
    let body = request(
        vec![link("1", "ENFERMEIRO", json!(40), "01/2020", Some("12/2023"))],
        vec![valid("1")],
    );
    let (status, json) = post_eligibility(create_router_for_test(), body).await;

    assert_eq!(status, StatusCode::OK);
    let report = &json["report"];
    assert_eq!(report["valid_months"], 0);
    assert_eq!(report["status"], "NOT_ELIGIBLE");
    assert_eq!(report["pending_months"], 48);
}

#[tokio::test]
async fn test_future_months_of_a_closed_link_are_not_credited() {
    // Contract runs to 12/2027 but the computation is for 06/2024.
    let body = request(
        vec![link("1", "MEDICO CLINICO", json!(40), "01/2021", Some("12/2027"))],
        vec![valid("1")],
    );
    let (status, json) = post_eligibility(create_router_for_test(), body).await;

    assert_eq!(status, StatusCode::OK);
    let report = &json["report"];
    assert_eq!(report["valid_months"], 42);
    assert_eq!(report["status"], "NOT_ELIGIBLE");
    let coverage = report["coverage"].as_array().unwrap();
    assert_eq!(coverage.last().unwrap()["month"], "2024-06");
    assert!(warning_codes(&json).contains(&"INTERVAL_CLIPPED".to_string()));
}

#[tokio::test]
async fn test_ineligible_role_does_not_need_establishment_verdict() {
    let body = request(
        vec![link("1", "ENFERMEIRO", json!(40), "01/2020", Some("12/2023"))],
        vec![],
    );
    let (status, json) = post_eligibility(create_router_for_test(), body).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["report"]["valid_months"], 0);
    assert!(warning_codes(&json).is_empty());
}

#[tokio::test]
async fn test_unknown_establishment_fails_closed() {
    let body = request(
        vec![link("1", "MEDICO CLINICO", json!(40), "01/2020", Some("12/2023"))],
        vec![],
    );
    let (status, json) = post_eligibility(create_router_for_test(), body).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["report"]["valid_months"], 0);
    assert!(warning_codes(&json).contains(&"ESTABLISHMENT_UNVERIFIED".to_string()));
}

#[tokio::test]
async fn test_establishment_marked_invalid_is_excluded() {
    let body = request(
        vec![link("1", "MEDICO CLINICO", json!(40), "01/2020", Some("12/2023"))],
        vec![json!({ "establishment_id": "1", "valid": false })],
    );
    let (_, json) = post_eligibility(create_router_for_test(), body).await;

    assert_eq!(json["report"]["valid_months"], 0);
    assert!(warning_codes(&json).is_empty());
}

#[tokio::test]
async fn test_malformed_rows_are_dropped_with_warning() {
    let body = request(
        vec![
            link("1", "MEDICO CLINICO", json!(40), "01/2020", Some("12/2023")),
            link("1", "MEDICO CLINICO", json!("-10"), "01/2019", Some("12/2019")),
            link("1", "MEDICO CLINICO", json!(40), "dez/19", Some("jan/19")),
        ],
        vec![valid("1")],
    );
    let (status, json) = post_eligibility(create_router_for_test(), body).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["report"]["valid_months"], 48);
    let rejected = warning_codes(&json)
        .iter()
        .filter(|code| *code == "ROW_REJECTED")
        .count();
    assert_eq!(rejected, 2);
}

#[tokio::test]
async fn test_report_is_deterministic_across_requests() {
    let body = request(
        vec![
            link("1", "MEDICO CLINICO", json!(40), "01/2020", Some("12/2021")),
            link("2", "MEDICO DE FAMILIA E COMUNIDADE", json!("30,5"), "06/2021", None),
        ],
        vec![valid("1"), valid("2")],
    );
    let (_, first) = post_eligibility(create_router_for_test(), body.clone()).await;
    let (_, second) = post_eligibility(create_router_for_test(), body).await;

    assert_eq!(first["report"], second["report"]);
    assert_ne!(first["calculation_id"], second["calculation_id"]);
}

// =============================================================================
// Error cases
// =============================================================================

#[tokio::test]
async fn test_empty_rows_returns_400() {
    let (status, json) =
        post_eligibility(create_router_for_test(), request(vec![], vec![])).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert!(json["message"].as_str().unwrap().contains("rows"));
}

#[tokio::test]
async fn test_all_rows_rejected_returns_400() {
    let body = request(
        vec![link("1", "MEDICO CLINICO", json!("abc"), "01/2020", None)],
        vec![valid("1")],
    );
    let (status, json) = post_eligibility(create_router_for_test(), body).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_invalid_professional_id_returns_400() {
    let mut body = request(
        vec![link("1", "MEDICO CLINICO", json!(40), "01/2020", None)],
        vec![valid("1")],
    );
    body["professional_id"] = json!("111.111.111-11");
    let (status, json) = post_eligibility(create_router_for_test(), body).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_missing_field_returns_validation_error() {
    let body = json!({ "professional_id": PROFESSIONAL });
    let (status, json) = post_eligibility(create_router_for_test(), body).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_missing_content_type_returns_400() {
    let response = create_router_for_test()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/eligibility")
                .body(Body::from(request(vec![], vec![]).to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
