//! Integration tests for the REST API feature.

#![cfg(feature = "api")]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use tower::util::ServiceExt;

use utility_billing::api::{AppState, router};
use utility_billing::config::ScenarioConfig;
use utility_billing::sim::runner::PeriodRunner;

/// Run the baseline period and return the API state.
fn build_api_state() -> Arc<AppState> {
    let report = PeriodRunner::new(ScenarioConfig::baseline())
        .run()
        .expect("baseline should run");
    Arc::new(AppState {
        rates: report.rates.snapshot(),
        statement: report.statement,
    })
}

async fn get(uri: &str) -> (StatusCode, serde_json::Value) {
    let app = router(build_api_state());
    let req = Request::builder().uri(uri).body(Body::empty()).unwrap();
    let resp = app.oneshot(req).await.unwrap();
    let status = resp.status();
    let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&body).unwrap())
}

#[tokio::test]
async fn bills_match_statement_line_count() {
    let state = build_api_state();
    let expected = state.statement.lines().len();

    let (status, json) = get("/bills").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json.as_array().map(Vec::len), Some(expected));
}

#[tokio::test]
async fn filtered_bills_only_contain_requested_utility() {
    let (status, json) = get("/bills?utility=electricity").await;
    assert_eq!(status, StatusCode::OK);
    let rows = json.as_array().unwrap();
    assert_eq!(rows.len(), 3);
    assert!(rows.iter().all(|r| r["utility"] == "electricity"));
    assert!(rows.iter().all(|r| r["generation"].is_number()));
}

#[tokio::test]
async fn summary_net_total_matches_statement() {
    let state = build_api_state();
    let (status, json) = get("/summary").await;
    assert_eq!(status, StatusCode::OK);
    let net = json["net_total"].as_f64().unwrap();
    assert!((net - state.statement.net_total()).abs() < 1e-9);
    assert_eq!(json["by_utility"].as_array().map(Vec::len), Some(4));
}

#[tokio::test]
async fn rates_expose_internet_catalog() {
    let (status, json) = get("/rates").await;
    assert_eq!(status, StatusCode::OK);
    let fiber = &json["internet"]["plans"]["business_fiber"];
    assert_eq!(fiber["base_cost"], 1500.0);
    assert!(fiber["data_cap_gb"].is_null());
}

#[tokio::test]
async fn unknown_utility_is_rejected() {
    let (status, json) = get("/bills?utility=steam").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].as_str().unwrap().contains("steam"));
}
