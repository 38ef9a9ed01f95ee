//! HTTP front-end
//!
//! Every request is one render pass over the shared, immutable inference
//! engine. Changing a form control resubmits the page.

use crate::error::InferenceError;
use crate::metrics::{MetricsSnapshot, PredictionMetrics};
use crate::models::inference::InferenceEngine;
use crate::render::render_page;
use crate::types::listing::ListingInput;
use crate::types::prediction::PredictionReport;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tower_http::trace::TraceLayer;

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<InferenceEngine>,
    pub metrics: Arc<PredictionMetrics>,
}

impl AppState {
    pub fn new(engine: Arc<InferenceEngine>, metrics: Arc<PredictionMetrics>) -> Self {
        Self { engine, metrics }
    }

    /// Collect input, run the pass and record it
    fn render_pass(&self, input: &ListingInput) -> Result<PredictionReport, InferenceError> {
        let start_time = Instant::now();
        let features = input.collect();
        let report = self.engine.run_pass(&features, input.show_probabilities())?;
        self.metrics.record_pass(&report, start_time.elapsed());
        Ok(report)
    }
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(prediction_page))
        .route("/api/predict", get(predict_json))
        .route("/health", get(health_check))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

impl IntoResponse for InferenceError {
    fn into_response(self) -> Response {
        let message = self.to_string();
        tracing::error!(message = %message, "Render pass failed");
        (StatusCode::INTERNAL_SERVER_ERROR, message).into_response()
    }
}

/// HTML page for the submitted form values
pub async fn prediction_page(
    State(state): State<AppState>,
    Query(input): Query<ListingInput>,
) -> Result<Html<String>, InferenceError> {
    let report = state.render_pass(&input)?;
    Ok(Html(render_page(&report)))
}

/// Same pass as the page, as JSON
pub async fn predict_json(
    State(state): State<AppState>,
    Query(input): Query<ListingInput>,
) -> Result<Json<PredictionReport>, InferenceError> {
    Ok(Json(state.render_pass(&input)?))
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub models: Vec<ModelStatus>,
    pub metrics: MetricsSnapshot,
}

#[derive(Debug, Serialize)]
pub struct ModelStatus {
    pub model: &'static str,
    pub name: &'static str,
    pub supports_probability: bool,
}

pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let models = state
        .engine
        .models()
        .iter()
        .map(|m| ModelStatus {
            model: m.kind.key(),
            name: m.kind.display_name(),
            supports_probability: m.supports_probability,
        })
        .collect();

    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        models,
        metrics: state.metrics.snapshot(),
    })
}
