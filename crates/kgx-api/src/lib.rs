//! KGX API - HTTP server
//!
//! Serves entity extraction, interactive graph pages, and knowledge base
//! queries.
//!
//! Author: hephaex@gmail.com

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod state;

use axum::{extract::DefaultBodyLimit, middleware as axum_middleware, routing::get, Json, Router};
use kgx_core::LoggingConfig;
use state::AppState;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

/// OpenAPI document
#[derive(OpenApi)]
#[openapi(
    info(title = "KGX API", description = "Entity extraction and knowledge graph rendering"),
    paths(
        handlers::health::health_check,
        handlers::health::metrics,
        handlers::extract::index,
        handlers::extract::extract_page,
        handlers::extract::extract_json,
        handlers::knowledge::query,
        handlers::knowledge::process,
        handlers::knowledge::knowledge_graph,
    ),
    components(schemas(
        error::ApiError,
        handlers::health::HealthResponse,
        handlers::health::BuildInfo,
        handlers::health::MetricsResponse,
        handlers::extract::ExtractRequest,
        handlers::extract::ExtractResponse,
        handlers::extract::TextForm,
        handlers::knowledge::QueryRequest,
        handlers::knowledge::QueryResponse,
        handlers::knowledge::ProcessResponse,
    )),
    tags(
        (name = "health", description = "Liveness and counters"),
        (name = "extraction", description = "Entity extraction and graph rendering"),
        (name = "knowledge", description = "Static knowledge base")
    )
)]
pub struct ApiDoc;

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// Create the router with all routes and middleware
pub fn create_router(state: Arc<AppState>) -> Router {
    let server = state.config.server.clone();

    let router = Router::new()
        .merge(routes::page_routes())
        .merge(routes::api_routes())
        .route("/api-docs/openapi.json", get(openapi_json))
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::count_requests,
        ))
        .layer(DefaultBodyLimit::max(server.max_body_size))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    if server.cors_enabled {
        router.layer(middleware::cors_layer(&server.cors_origins))
    } else {
        router
    }
}

/// Router over [`AppState::for_testing`]
pub fn create_router_for_testing() -> Router {
    create_router(Arc::new(AppState::for_testing()))
}

/// Install the global tracing subscriber
pub fn init_tracing(logging: &LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!(
            "kgx_api={level},kgx_graph={level},kgx_extractor={level},tower_http=debug",
            level = logging.level
        )
        .into()
    });

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_file(logging.include_location)
        .with_line_number(logging.include_location);

    if logging.json_format {
        builder.json().init();
    } else {
        builder.init();
    }
}
