//! KGX Graph - Graph assembly, layout, and rendering
//!
//! Turns entities and relationships into an in-memory graph (petgraph),
//! places the nodes with a seeded spring layout, and renders an
//! interactive HTML view. Also hosts the static knowledge base and the
//! end-to-end text pipeline.

pub mod graph;
pub mod knowledge;
pub mod layout;
pub mod payload;
pub mod pipeline;
pub mod render;

pub use graph::{EntityGraph, GraphNode};
pub use knowledge::{KnowledgeBase, NO_ANSWER};
pub use layout::{Position, SpringLayout};
pub use payload::{color_for, EdgeRelation, GraphPayload};
pub use pipeline::{Analysis, KnowledgePipeline};
pub use render::{diagnostic, escape_html, GraphRenderer, EMPTY_GRAPH_MESSAGE};
