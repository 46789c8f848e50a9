//! API route definitions
//!
//! Author: hephaex@gmail.com

use crate::handlers::{extract, health, knowledge};
use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

/// HTML form and form-encoded endpoints
pub fn page_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(extract::index))
        .route("/extract", post(extract::extract_page))
        .route("/process", post(knowledge::process))
}

/// JSON endpoints
pub fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/metrics", get(health::metrics))
        .route("/api/extract", post(extract::extract_json))
        .route("/api/query", post(knowledge::query))
        .route("/api/knowledge-graph", get(knowledge::knowledge_graph))
}
