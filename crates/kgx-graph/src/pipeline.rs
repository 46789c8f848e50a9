//! End-to-end text pipeline: extract, infer, assemble, lay out, render

use serde::Serialize;

use kgx_core::{AppConfig, EntityBuckets, Relationship, Result};
use kgx_extractor::{EntityExtractor, RelationshipInferencer};

use crate::graph::EntityGraph;
use crate::layout::SpringLayout;
use crate::payload::GraphPayload;
use crate::render::{diagnostic, GraphRenderer};

/// Result of analysing one text
#[derive(Debug, Clone, Default, Serialize)]
pub struct Analysis {
    pub entities: EntityBuckets,
    pub relationships: Vec<Relationship>,
    pub graph: GraphPayload,
}

/// Immutable, shareable pipeline built once at startup
pub struct KnowledgePipeline {
    extractor: EntityExtractor,
    inferencer: RelationshipInferencer,
    layout: SpringLayout,
    renderer: GraphRenderer,
}

impl KnowledgePipeline {
    pub fn new(
        extractor: EntityExtractor,
        inferencer: RelationshipInferencer,
        layout: SpringLayout,
    ) -> Self {
        Self {
            extractor,
            inferencer,
            layout,
            renderer: GraphRenderer::default(),
        }
    }

    /// Pattern extraction only; no network access
    pub fn pattern_only(config: &AppConfig) -> Self {
        Self::new(
            EntityExtractor::pattern_only(&config.extraction),
            RelationshipInferencer::new(&config.extraction),
            SpringLayout::from_config(&config.layout),
        )
    }

    /// Select the recognizer from configuration (probes the NER service)
    pub async fn from_config(config: &AppConfig) -> Self {
        Self::new(
            EntityExtractor::from_config(&config.ner, &config.extraction).await,
            RelationshipInferencer::new(&config.extraction),
            SpringLayout::from_config(&config.layout),
        )
    }

    pub fn with_renderer(mut self, renderer: GraphRenderer) -> Self {
        self.renderer = renderer;
        self
    }

    pub fn layout(&self) -> &SpringLayout {
        &self.layout
    }

    pub fn renderer(&self) -> &GraphRenderer {
        &self.renderer
    }

    pub fn recognizer_name(&self) -> &'static str {
        self.extractor.recognizer_name()
    }

    /// Entity extraction only
    pub async fn extract(&self, text: &str) -> EntityBuckets {
        self.extractor.extract(text).await
    }

    /// Extract entities, infer relationships, and lay out the graph
    pub async fn analyze(&self, text: &str) -> Result<Analysis> {
        if text.trim().is_empty() {
            return Ok(Analysis::default());
        }

        let entities = self.extractor.extract(text).await;
        let relationships = self.inferencer.infer(&entities, text);
        let graph = EntityGraph::build(&entities.entities(), &relationships);
        let payload = GraphPayload::from_graph(&graph, &self.layout)?;

        tracing::debug!(
            entities = entities.len(),
            relationships = relationships.len(),
            "Analysed text"
        );

        Ok(Analysis {
            entities,
            relationships,
            graph: payload,
        })
    }

    /// Render the analysis of `text`; failures become an inline diagnostic
    pub async fn analyze_html(&self, text: &str) -> String {
        self.analyze(text)
            .await
            .and_then(|analysis| self.renderer.render(&analysis.graph))
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Graph rendering failed");
                diagnostic(&e)
            })
    }
}
