//! In-memory entity graph using petgraph UnGraph.
//!
//! One node per unique surface text, one edge per relationship. Nodes
//! keep insertion order, which is also the order of every per-node list
//! in the rendered payload.

use std::collections::{BTreeMap, HashMap};

use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::visit::EdgeRef;
use serde::{Deserialize, Serialize};

use kgx_core::{Entity, EntityCategory, Relationship};

/// Node data in the entity graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
    /// Entity surface text.
    pub text: String,
    /// Entity category, used for coloring.
    pub category: EntityCategory,
}

/// The graph type: node = entity, edge weight = relation label.
pub type EntityUnGraph = UnGraph<GraphNode, String>;

/// Undirected entity graph with lookup by surface text.
#[derive(Debug, Clone, Default)]
pub struct EntityGraph {
    graph: EntityUnGraph,
    text_index: HashMap<String, NodeIndex>,
}

impl EntityGraph {
    /// Assemble a graph.
    ///
    /// Entities with no relationship stay as isolated nodes. Relationships
    /// pointing at unknown entities, self-loops, and repeats of an
    /// already-connected pair are dropped.
    pub fn build(entities: &[Entity], relationships: &[Relationship]) -> Self {
        let mut graph = Self::default();
        for entity in entities {
            graph.add_entity(entity);
        }
        for relationship in relationships {
            graph.add_relationship(relationship);
        }
        graph
    }

    /// Add an entity node, returning its index.
    ///
    /// A surface text already present keeps its first category.
    pub fn add_entity(&mut self, entity: &Entity) -> NodeIndex {
        if let Some(idx) = self.text_index.get(&entity.text) {
            return *idx;
        }
        let idx = self.graph.add_node(GraphNode {
            text: entity.text.clone(),
            category: entity.category,
        });
        self.text_index.insert(entity.text.clone(), idx);
        idx
    }

    /// Add a relationship edge.
    ///
    /// Returns true if the edge was added.
    pub fn add_relationship(&mut self, relationship: &Relationship) -> bool {
        if relationship.is_self_loop() {
            tracing::warn!(entity = %relationship.source, "Dropping self-loop relationship");
            return false;
        }

        let (Some(source), Some(target)) = (
            self.find(&relationship.source),
            self.find(&relationship.target),
        ) else {
            tracing::warn!(
                source = %relationship.source,
                target = %relationship.target,
                "Dropping relationship with unknown endpoint"
            );
            return false;
        };

        if self.graph.find_edge(source, target).is_some() {
            return false;
        }
        self.graph
            .add_edge(source, target, relationship.label.clone());
        true
    }

    /// Find a node by surface text.
    pub fn find(&self, text: &str) -> Option<NodeIndex> {
        self.text_index.get(text).copied()
    }

    /// Get the number of nodes in the graph.
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Get the number of edges in the graph.
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Nodes in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &GraphNode> + '_ {
        self.graph.node_weights()
    }

    /// Edges as (source text, target text, label) in insertion order.
    pub fn edges(&self) -> Vec<(&str, &str, &str)> {
        self.graph
            .edge_references()
            .map(|e| {
                (
                    self.graph[e.source()].text.as_str(),
                    self.graph[e.target()].text.as_str(),
                    e.weight().as_str(),
                )
            })
            .collect()
    }

    /// Direct neighbours of a node, by surface text.
    pub fn neighbors(&self, text: &str) -> Vec<&str> {
        let Some(idx) = self.find(text) else {
            return Vec::new();
        };
        let mut neighbors: Vec<&str> = self
            .graph
            .neighbors(idx)
            .map(|n| self.graph[n].text.as_str())
            .collect();
        // petgraph walks the adjacency list newest-first
        neighbors.reverse();
        neighbors
    }

    /// Neighbour lists for every node, isolated nodes included.
    pub fn adjacency(&self) -> BTreeMap<String, Vec<String>> {
        self.nodes()
            .map(|node| {
                let neighbors = self
                    .neighbors(&node.text)
                    .into_iter()
                    .map(str::to_string)
                    .collect();
                (node.text.clone(), neighbors)
            })
            .collect()
    }

    /// Dense adjacency matrix indexed by node order.
    pub fn adjacency_matrix(&self) -> Vec<Vec<bool>> {
        let n = self.node_count();
        let mut matrix = vec![vec![false; n]; n];
        for edge in self.graph.edge_references() {
            let (a, b) = (edge.source().index(), edge.target().index());
            matrix[a][b] = true;
            matrix[b][a] = true;
        }
        matrix
    }

    /// Borrow the underlying petgraph graph.
    pub fn inner(&self) -> &EntityUnGraph {
        &self.graph
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kgx_core::RelationOrigin;

    fn sample() -> EntityGraph {
        let entities = vec![
            Entity::new("Elon Musk", EntityCategory::Person),
            Entity::new("SpaceX", EntityCategory::Organization),
            Entity::new("California", EntityCategory::Place),
        ];
        let relationships = vec![Relationship::new(
            "Elon Musk",
            "SpaceX",
            "founded",
            RelationOrigin::Founding,
        )];
        EntityGraph::build(&entities, &relationships)
    }

    #[test]
    fn test_build_keeps_isolated_nodes() {
        let graph = sample();
        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.edge_count(), 1);
        assert!(graph.neighbors("California").is_empty());
        assert_eq!(graph.edges(), vec![("Elon Musk", "SpaceX", "founded")]);
    }

    #[test]
    fn test_invalid_edges_dropped() {
        let mut graph = sample();
        let origin = RelationOrigin::Proximity;

        assert!(!graph.add_relationship(&Relationship::new("SpaceX", "SpaceX", "x", origin)));
        assert!(!graph.add_relationship(&Relationship::new("SpaceX", "Mars", "x", origin)));
        assert!(!graph.add_relationship(&Relationship::new("SpaceX", "Elon Musk", "x", origin)));
        assert_eq!(graph.edge_count(), 1);
    }

    #[test]
    fn test_duplicate_entity_keeps_first_category() {
        let entities = vec![
            Entity::new("Apple", EntityCategory::Organization),
            Entity::new("Apple", EntityCategory::Product),
        ];
        let graph = EntityGraph::build(&entities, &[]);
        assert_eq!(graph.node_count(), 1);
        assert_eq!(
            graph.nodes().next().map(|n| n.category),
            Some(EntityCategory::Organization)
        );
    }

    #[test]
    fn test_adjacency_is_symmetric() {
        let graph = sample();
        let adjacency = graph.adjacency();
        assert_eq!(adjacency["Elon Musk"], vec!["SpaceX"]);
        assert_eq!(adjacency["SpaceX"], vec!["Elon Musk"]);
        assert!(adjacency["California"].is_empty());

        let matrix = graph.adjacency_matrix();
        assert!(matrix[0][1] && matrix[1][0]);
        assert!(!matrix[0][2]);
    }
}
