//! Performance benchmarks for the Eligibility Engine.
//!
//! This benchmark suite tracks:
//! - A full computation for professionals with 1, 10 and 50 links
//! - A single `/eligibility` request through the HTTP router
//!
//! Run with: `cargo bench`
//! HTML reports are generated in `target/criterion/`

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};

use eligibility_engine::api::{AppState, create_router};
use eligibility_engine::calculation::{Collaborators, EligibilityEngine};
use eligibility_engine::collaborators::{
    InMemoryEstablishmentDirectory, InMemoryRowSource, NoopProgress, UnavailableScraper,
};
use eligibility_engine::config::{ConfigLoader, EngineConfig};
use eligibility_engine::models::{
    CanonicalMonth, EmploymentLinkRow, EstablishmentRef, ProfessionalId,
};

use axum::{body::Body, http::Request};
use tower::ServiceExt;

const PROFESSIONAL: &str = "52998224725";

/// Creates `count` overlapping two-year links spread across ten establishments.
fn create_rows(count: usize) -> Vec<EmploymentLinkRow> {
    (0..count)
        .map(|i| EmploymentLinkRow {
            establishment_id: format!("{}", 1000 + i % 10),
            municipality_code: Some("355030".to_string()),
            establishment_name: None,
            role: if i % 4 == 0 { "225170" } else { "MEDICO CLINICO" }.to_string(),
            weekly_hours: ["40", "30", "20", "12"][i % 4].to_string(),
            start_date: format!("{:02}/{}", i % 12 + 1, 2014 + i % 8),
            end_date: Some(format!("{:02}/{}", i % 12 + 1, 2016 + i % 8)),
        })
        .collect()
}

/// Benchmark: Full engine computation by number of links.
fn bench_compute_eligibility(c: &mut Criterion) {
    let professional = ProfessionalId::parse(PROFESSIONAL).unwrap();
    let config = EngineConfig::default();
    let mut group = c.benchmark_group("compute_eligibility");

    for count in [1usize, 10, 50] {
        let rows = create_rows(count);
        let directory = rows.iter().fold(InMemoryEstablishmentDirectory::new(), |d, row| {
            d.with_verdict(&EstablishmentRef::from_row(row), true)
        });
        let source = InMemoryRowSource::new().with_rows(&professional, rows);
        let engine = EligibilityEngine::new(
            &config,
            Collaborators {
                rows: &source,
                lookup: &directory,
                scraper: &UnavailableScraper,
            },
        )
        .with_reference_month(CanonicalMonth::new(2024, 6).unwrap());

        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, _| {
            b.iter(|| {
                black_box(
                    engine
                        .compute_eligibility(PROFESSIONAL, &NoopProgress)
                        .unwrap(),
                )
            })
        });
    }
    group.finish();
}

/// Benchmark: Single request through the router.
fn bench_api_request(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let config = ConfigLoader::load("./config/default").expect("Failed to load config");
    let router = create_router(AppState::new(config));
    let body = serde_json::json!({
        "professional_id": PROFESSIONAL,
        "reference_month": "06/2024",
        "rows": create_rows(10),
        "establishments": (0..10)
            .map(|i| serde_json::json!({"establishment_id": format!("{}", 1000 + i), "valid": true}))
            .collect::<Vec<_>>(),
    })
    .to_string();

    c.bench_function("api_eligibility_10_links", |b| {
        b.to_async(&rt).iter(|| async {
            let router = router.clone();
            let response = router
                .oneshot(
                    Request::builder()
                        .method("POST")
                        .uri("/eligibility")
                        .header("Content-Type", "application/json")
                        .body(Body::from(body.clone()))
                        .unwrap(),
                )
                .await
                .unwrap();
            black_box(response)
        })
    });
}

criterion_group!(benches, bench_compute_eligibility, bench_api_request);
criterion_main!(benches);
