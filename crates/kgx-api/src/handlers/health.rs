//! Health check handlers
//!
//! Author: hephaex@gmail.com

use crate::state::AppState;
use axum::{extract::State, response::IntoResponse, Json};
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;

/// Health check response
#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub build_info: BuildInfo,
}

#[derive(Serialize, ToSchema)]
pub struct BuildInfo {
    pub name: String,
    pub rust_version: String,
}

/// Liveness probe - basic health check
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Service is alive", body = HealthResponse)
    )
)]
pub async fn health_check() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        build_info: BuildInfo {
            name: env!("CARGO_PKG_NAME").to_string(),
            rust_version: "1.75+".to_string(),
        },
    })
}

/// JSON metrics response
#[derive(Serialize, ToSchema)]
pub struct MetricsResponse {
    pub uptime_seconds: u64,
    pub total_requests: u64,
    pub requests_per_second: f64,
    /// "service" or "pattern"
    pub recognizer: String,
    pub knowledge_facts: usize,
}

#[utoipa::path(
    get,
    path = "/metrics",
    tag = "health",
    responses(
        (status = 200, description = "Server counters", body = MetricsResponse)
    )
)]
pub async fn metrics(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let uptime = state.uptime_secs();
    let total_requests = state.get_request_count();
    let rps = if uptime > 0 {
        total_requests as f64 / uptime as f64
    } else {
        0.0
    };

    Json(MetricsResponse {
        uptime_seconds: uptime,
        total_requests,
        requests_per_second: rps,
        recognizer: state.pipeline.recognizer_name().to_string(),
        knowledge_facts: state.knowledge.len(),
    })
}
