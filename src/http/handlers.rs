//! Request handlers for the metrics and probe endpoints.

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
};

use crate::health::{HealthState, Liveness, Readiness};
use crate::http::server::AppState;
use crate::observability::metrics::PROMETHEUS_CONTENT_TYPE;

/// `GET /metrics`
pub async fn metrics(State(state): State<AppState>) -> impl IntoResponse {
    let body = state.renderer.render(&state.exporter);
    ([(header::CONTENT_TYPE, PROMETHEUS_CONTENT_TYPE)], body)
}

/// `GET /healthz`
pub async fn liveness(State(state): State<AppState>) -> impl IntoResponse {
    match HealthState::of(&state.exporter).liveness() {
        Liveness::Healthy => (StatusCode::OK, "OK"),
    }
}

/// `GET /ready`
pub async fn readiness(State(state): State<AppState>) -> impl IntoResponse {
    match HealthState::of(&state.exporter).readiness() {
        Readiness::Ready => (StatusCode::OK, "READY".to_string()),
        Readiness::NotReady(reason) => {
            tracing::debug!(reason = %reason, "Readiness probe failed");
            (StatusCode::SERVICE_UNAVAILABLE, format!("NOT READY: {}", reason))
        }
    }
}

pub async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, "Not Found")
}
