//! KGX API Server
//!
//! HTTP server for entity extraction and knowledge graph rendering.
//!
//! Author: hephaex@gmail.com

use kgx_api::{create_router, init_tracing, state::AppState};
use kgx_core::config::AppConfig;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration: optional TOML file, environment on top
    let config = match std::env::var("KGX_CONFIG") {
        Ok(path) => AppConfig::from_file(path)?.with_env_override()?,
        Err(_) => AppConfig::from_env()?,
    };

    init_tracing(&config.logging);

    let addr = format!("{}:{}", config.server.host, config.server.port);

    // Create application state (probes the NER service, loads the knowledge base)
    let state = Arc::new(AppState::from_config(config).await);
    tracing::info!(
        recognizer = state.pipeline.recognizer_name(),
        facts = state.knowledge.len(),
        "Pipeline ready"
    );

    let app = create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("KGX API Server starting on http://{}", addr);
    tracing::info!("OpenAPI document at http://{}/api-docs/openapi.json", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
