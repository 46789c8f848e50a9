//! Serializable graph payload consumed by the renderer and the JSON API

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use kgx_core::{EntityCategory, Result};

use crate::graph::EntityGraph;
use crate::layout::{Position, SpringLayout};

/// Node color by category
pub fn color_for(category: EntityCategory) -> &'static str {
    match category {
        EntityCategory::Person => "#FF6B6B",
        EntityCategory::Organization => "#4ECDC4",
        EntityCategory::Place => "#45B7D1",
        EntityCategory::Product => "#96CEB4",
        EntityCategory::Unknown => "#CCCCCC",
    }
}

/// A labelled edge
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeRelation {
    pub source: String,
    pub target: String,
    pub label: String,
}

/// Graph data for client-side interaction.
///
/// Per-node lists (`nodes`, `originalColors`) share the same order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphPayload {
    pub nodes: Vec<String>,
    pub edges: Vec<(String, String)>,
    pub relations: Vec<EdgeRelation>,
    pub adjacency: BTreeMap<String, Vec<String>>,
    pub original_colors: Vec<String>,
    pub positions: BTreeMap<String, Position>,
    pub node_types: BTreeMap<String, String>,
}

impl GraphPayload {
    /// Lay out `graph` and flatten it
    pub fn from_graph(graph: &EntityGraph, layout: &SpringLayout) -> Result<Self> {
        let coordinates = layout.compute(graph)?;

        let mut payload = Self {
            adjacency: graph.adjacency(),
            ..Self::default()
        };

        for (node, position) in graph.nodes().zip(coordinates) {
            payload.nodes.push(node.text.clone());
            payload
                .original_colors
                .push(color_for(node.category).to_string());
            payload.positions.insert(node.text.clone(), position);
            payload
                .node_types
                .insert(node.text.clone(), node.category.as_label().to_string());
        }

        for (source, target, label) in graph.edges() {
            payload.edges.push((source.to_string(), target.to_string()));
            payload.relations.push(EdgeRelation {
                source: source.to_string(),
                target: target.to_string(),
                label: label.to_string(),
            });
        }

        Ok(payload)
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Position of a node by surface text
    pub fn position(&self, text: &str) -> Option<Position> {
        self.positions.get(text).copied()
    }
}
