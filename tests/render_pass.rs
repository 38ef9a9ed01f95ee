//! End-to-end render passes through the HTTP front-end

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use listing_price_classifier::config::AppConfig;
use listing_price_classifier::metrics::PredictionMetrics;
use listing_price_classifier::models::inference::InferenceEngine;
use listing_price_classifier::server::{create_router, AppState};
use listing_price_classifier::ArtifactError;
use std::path::Path;
use std::sync::Arc;
use tower::ServiceExt;

fn fixture_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.artifacts.dir = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures/artifacts")
        .to_string_lossy()
        .into_owned();
    config
}

fn state_for(config: &AppConfig) -> AppState {
    let engine = InferenceEngine::new(config).expect("fixtures load");
    AppState::new(Arc::new(engine), Arc::new(PredictionMetrics::new()))
}

fn state() -> AppState {
    state_for(&fixture_config())
}

async fn get(state: AppState, uri: &str) -> (StatusCode, String) {
    let response = create_router(state)
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, String::from_utf8(body.to_vec()).unwrap())
}

#[tokio::test]
async fn default_page_renders_three_results() {
    let (status, html) = get(state(), "/").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(html.matches(r#"<div class="model-result">high price</div>"#).count(), 3);
    assert!(!html.contains("Model probabilities"));
}

#[tokio::test]
async fn boundary_minimums_render_complete_page() {
    let (status, html) = get(
        state(),
        "/?minimum_nights=1&number_of_reviews=0&reviews_per_month=0.0&probabilities=on",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(html.matches(r#"<div class="model-result">low price</div>"#).count(), 3);
    assert!(html.contains("Logistic Regression: <b>4.74%</b>"));
    assert!(html.contains("Random Forest: <b>30.00%</b>"));
    assert!(html.contains("Probabilities not available for SVM."));
}

#[tokio::test]
async fn calibrated_svm_renders_every_probability() {
    let mut config = fixture_config();
    config.artifacts.svm_file = "svm_calibrated.onnx".to_string();
    let state = state_for(&config);

    let (status, html) = get(state.clone(), "/?probabilities=on").await;
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("Logistic Regression: <b>66.82%</b>"));
    assert!(html.contains("Random Forest: <b>75.00%</b>"));
    assert!(html.contains("SVM: <b>57.44%</b>"));
    assert!(!html.contains(r#"class="warning""#));

    let (_, body) = get(state, "/health").await;
    let json: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["models"][2]["supports_probability"], true);
    assert_eq!(json["metrics"]["probability_warnings"], 0);
}

#[tokio::test]
async fn below_minimum_inputs_are_clamped() {
    let (status, body) = get(
        state(),
        "/api/predict?minimum_nights=-3&number_of_reviews=-1&reviews_per_month=-2",
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let json: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["features"]["minimum_nights"], 1);
    assert_eq!(json["features"]["number_of_reviews"], 0);
    assert_eq!(json["features"]["reviews_per_month"], 0.0);
}

#[tokio::test]
async fn json_passes_are_deterministic() {
    let state = state();
    let uri = "/api/predict?minimum_nights=3&number_of_reviews=10&reviews_per_month=1.2&probabilities=on";

    let (_, first) = get(state.clone(), uri).await;
    let (_, second) = get(state, uri).await;

    let first: serde_json::Value = serde_json::from_str(&first).unwrap();
    let second: serde_json::Value = serde_json::from_str(&second).unwrap();

    assert_eq!(first["predictions"], second["predictions"]);
    assert_eq!(first["probabilities"], second["probabilities"]);
    assert_eq!(first["probabilities"][0]["high_price_pct"], 66.82);
    assert_eq!(first["probabilities"][1]["high_price_pct"], 75.0);
    assert_eq!(first["probabilities"][2]["status"], "unavailable");
}

#[tokio::test]
async fn health_reports_capabilities_and_passes() {
    let state = state();
    get(state.clone(), "/?probabilities=on").await;

    let (status, body) = get(state, "/health").await;
    assert_eq!(status, StatusCode::OK);

    let json: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["models"][2]["model"], "svm");
    assert_eq!(json["models"][2]["supports_probability"], false);
    assert_eq!(json["metrics"]["passes_rendered"], 1);
    assert_eq!(json["metrics"]["probability_warnings"], 1);
}

#[test]
fn missing_artifact_directory_is_fatal() {
    let mut config = AppConfig::default();
    config.artifacts.dir = "/nonexistent/artifacts".to_string();

    let err = InferenceEngine::new(&config).err().expect("load must fail");
    assert!(matches!(err, ArtifactError::Read { .. }));
}
