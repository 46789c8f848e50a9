//! Knowledge base handlers
//!
//! Author: hephaex@gmail.com

use crate::error::AppError;
use crate::handlers::extract::TextForm;
use crate::state::AppState;
use axum::{extract::State, Form, Json};
use kgx_graph::GraphPayload;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

/// Knowledge base query
#[derive(Debug, Deserialize, ToSchema)]
pub struct QueryRequest {
    #[serde(default)]
    #[schema(example = "Who founded SpaceX?")]
    pub query: String,
}

/// Knowledge base answer
#[derive(Debug, Serialize, ToSchema)]
pub struct QueryResponse {
    /// Matching fact, or the fixed no-answer sentence
    pub answer: String,
    /// Values of all facts sharing a word with the query
    pub context: String,
}

/// Entities plus the knowledge-guided response for a form submission
#[derive(Debug, Serialize, ToSchema)]
pub struct ProcessResponse {
    /// (surface text, category label) pairs
    #[schema(value_type = Vec<Vec<String>>)]
    pub entities: Vec<(String, String)>,
    pub response: String,
    /// Number of statements describing the founded facts
    pub graph_size: usize,
}

/// Answer a question from the knowledge base
#[utoipa::path(
    post,
    path = "/api/query",
    tag = "knowledge",
    request_body = QueryRequest,
    responses(
        (status = 200, description = "Answer and supporting context", body = QueryResponse)
    )
)]
pub async fn query(
    State(state): State<Arc<AppState>>,
    Json(req): Json<QueryRequest>,
) -> Json<QueryResponse> {
    let answer = state.knowledge.answer(&req.query).to_string();
    let context = state.knowledge.relevant_context(&req.query);
    tracing::debug!(query = %req.query, "Knowledge base query");

    Json(QueryResponse { answer, context })
}

/// Extract entities and answer from the knowledge base in one step
#[utoipa::path(
    post,
    path = "/process",
    tag = "knowledge",
    request_body(content = TextForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Entities and knowledge-guided response", body = ProcessResponse)
    )
)]
pub async fn process(
    State(state): State<Arc<AppState>>,
    Form(form): Form<TextForm>,
) -> Json<ProcessResponse> {
    let text = form.input_text;
    let buckets = state.pipeline.extract(&text).await;

    let entities = buckets
        .entities()
        .into_iter()
        .map(|e| (e.text, e.category.as_label().to_string()))
        .collect();

    let response = match state.knowledge.lookup(&text) {
        Some(fact) => fact.to_string(),
        None => state.knowledge.relevant_context(&text),
    };

    Json(ProcessResponse {
        entities,
        response,
        graph_size: state.knowledge.founded_triples().len(),
    })
}

/// The Person --founded--> Organization graph of the knowledge base
#[utoipa::path(
    get,
    path = "/api/knowledge-graph",
    tag = "knowledge",
    responses(
        (status = 200, description = "Nodes, edges, adjacency, colors, positions, and node types"),
        (status = 500, description = "Layout failed", body = crate::error::ApiError)
    )
)]
pub async fn knowledge_graph(
    State(state): State<Arc<AppState>>,
) -> Result<Json<GraphPayload>, AppError> {
    let graph = state.knowledge.founded_graph();
    let payload = GraphPayload::from_graph(&graph, state.pipeline.layout())?;
    Ok(Json(payload))
}
