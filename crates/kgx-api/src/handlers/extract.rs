//! Entity extraction handlers
//!
//! Author: hephaex@gmail.com

use crate::error::AppError;
use crate::state::AppState;
use axum::{
    extract::State,
    response::Html,
    Form, Json,
};
use kgx_core::Relationship;
use kgx_graph::{escape_html, GraphPayload};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use utoipa::ToSchema;

/// JSON extraction request
#[derive(Debug, Deserialize, ToSchema)]
pub struct ExtractRequest {
    /// Free text to analyse; missing or blank yields empty results
    #[serde(default)]
    #[schema(example = "Elon Musk founded SpaceX in California.")]
    pub text: String,
}

/// Form body shared by the HTML endpoints
#[derive(Debug, Deserialize, ToSchema)]
pub struct TextForm {
    #[serde(rename = "inputText", default)]
    pub input_text: String,
}

/// JSON extraction response
#[derive(Debug, Serialize, ToSchema)]
pub struct ExtractResponse {
    /// Category label -> surface texts
    pub entities: BTreeMap<String, Vec<String>>,

    /// Nodes, edges, adjacency, colors, positions, and node types
    #[schema(value_type = Object)]
    pub graph: GraphPayload,

    /// Inferred relationships with their labels
    #[schema(value_type = Vec<Object>)]
    pub relationships: Vec<Relationship>,
}

/// Extract entities and relationships as JSON
#[utoipa::path(
    post,
    path = "/api/extract",
    tag = "extraction",
    request_body = ExtractRequest,
    responses(
        (status = 200, description = "Entities and graph", body = ExtractResponse),
        (status = 500, description = "Graph could not be built", body = crate::error::ApiError)
    )
)]
pub async fn extract_json(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ExtractRequest>,
) -> Result<Json<ExtractResponse>, AppError> {
    let analysis = state.pipeline.analyze(&req.text).await?;

    tracing::info!(
        entities = analysis.entities.len(),
        relationships = analysis.relationships.len(),
        "Extraction completed"
    );

    Ok(Json(ExtractResponse {
        entities: analysis.entities.to_label_map(),
        graph: analysis.graph,
        relationships: analysis.relationships,
    }))
}

const PAGE_HEAD: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Knowledge Graph Explorer</title>
<style>
body { font-family: sans-serif; margin: 2rem auto; max-width: 880px; color: #222; }
textarea { width: 100%; min-height: 8rem; font-size: 1rem; }
.kgx-graph-empty, .kgx-graph-error { padding: 1rem; border: 1px dashed #bbb; color: #666; }
.kgx-graph svg { border: 1px solid #eee; background: #fafafa; }
</style>
</head>
<body>
<h1>Knowledge Graph Explorer</h1>
"#;

fn page(text: &str, result: Option<&str>) -> String {
    let mut html = String::from(PAGE_HEAD);
    html.push_str("<form method=\"post\" action=\"/extract\">\n<textarea name=\"inputText\" placeholder=\"Elon Musk founded SpaceX in California.\">");
    html.push_str(&escape_html(text));
    html.push_str("</textarea>\n<p><button type=\"submit\">Extract</button></p>\n</form>\n");
    if let Some(result) = result {
        html.push_str("<section class=\"result\">\n");
        html.push_str(result);
        html.push_str("\n</section>\n");
    }
    html.push_str("</body>\n</html>\n");
    html
}

/// Input form
#[utoipa::path(
    get,
    path = "/",
    tag = "extraction",
    responses(
        (status = 200, description = "HTML input form", content_type = "text/html", body = String)
    )
)]
pub async fn index() -> Html<String> {
    Html(page("", None))
}

/// Render the graph of the submitted text as an HTML page
#[utoipa::path(
    post,
    path = "/extract",
    tag = "extraction",
    request_body(content = TextForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "HTML page with the interactive graph", content_type = "text/html", body = String)
    )
)]
pub async fn extract_page(
    State(state): State<Arc<AppState>>,
    Form(form): Form<TextForm>,
) -> Html<String> {
    let graph = state.pipeline.analyze_html(&form.input_text).await;
    Html(page(&form.input_text, Some(&graph)))
}
