//! Property tests for graph assembly and layout

use kgx_core::{Entity, EntityCategory, RelationOrigin, Relationship};
use kgx_graph::{EntityGraph, GraphPayload, SpringLayout};
use proptest::prelude::*;

/// Up to 8 named nodes plus arbitrary index pairs, self-loops included
fn topology() -> impl Strategy<Value = (Vec<Entity>, Vec<Relationship>)> {
    (1usize..8).prop_flat_map(|n| {
        let entities: Vec<Entity> = (0..n)
            .map(|i| Entity::new(format!("Node {i}"), EntityCategory::Person))
            .collect();
        prop::collection::vec((0..n, 0..n), 0..16).prop_map(move |pairs| {
            let relationships = pairs
                .into_iter()
                .map(|(a, b)| {
                    Relationship::new(
                        format!("Node {a}"),
                        format!("Node {b}"),
                        "related",
                        RelationOrigin::Proximity,
                    )
                })
                .collect();
            (entities.clone(), relationships)
        })
    })
}

proptest! {
    #[test]
    fn layout_is_deterministic((entities, relationships) in topology(), seed in any::<u64>()) {
        let layout = SpringLayout::new(50, seed);
        let first = EntityGraph::build(&entities, &relationships);
        let second = EntityGraph::build(&entities, &relationships);

        prop_assert_eq!(layout.compute(&first).unwrap(), layout.compute(&second).unwrap());
    }

    #[test]
    fn graphs_have_no_self_loops((entities, relationships) in topology()) {
        let graph = EntityGraph::build(&entities, &relationships);
        prop_assert_eq!(graph.node_count(), entities.len());
        for (source, target, _) in graph.edges() {
            prop_assert_ne!(source, target);
        }

        let payload = GraphPayload::from_graph(&graph, &SpringLayout::default()).unwrap();
        for (source, target) in &payload.edges {
            prop_assert_ne!(source, target);
        }
        for (node, neighbours) in &payload.adjacency {
            prop_assert!(!neighbours.contains(node));
        }
    }
}
