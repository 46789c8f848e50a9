//! Static knowledge base
//!
//! A flat fact table loaded once from JSON (`{"key": "value", ...}`).
//! Keys of the form "<subject> founded <object>" also feed the simple
//! founded graph, which bypasses the heuristic inferencer.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use kgx_core::{
    Entity, EntityBuckets, EntityCategory, KgError, RelationOrigin, Relationship, Result,
};

use crate::graph::EntityGraph;

/// Answer when no fact matches
pub const NO_ANSWER: &str = "No relevant information found.";

const FOUNDED_SEPARATOR: &str = " founded ";

/// Read-only fact table
#[derive(Debug, Clone, Default)]
pub struct KnowledgeBase {
    facts: BTreeMap<String, String>,
}

impl KnowledgeBase {
    /// Load the table, falling back to an empty one on any error
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::try_load(path) {
            Ok(kb) => {
                tracing::info!(path = %path.display(), facts = kb.len(), "Loaded knowledge base");
                kb
            }
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "Knowledge base unavailable, using empty table"
                );
                Self::default()
            }
        }
    }

    /// Load the table, reporting missing or malformed files
    pub fn try_load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            KgError::KnowledgeBaseError(format!("failed to read {}: {e}", path.display()))
        })?;
        let facts: BTreeMap<String, String> = serde_json::from_str(&content).map_err(|e| {
            KgError::KnowledgeBaseError(format!("failed to parse {}: {e}", path.display()))
        })?;
        Ok(Self { facts })
    }

    pub fn from_facts<K, V>(facts: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            facts: facts
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.facts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.facts.is_empty()
    }

    pub fn facts(&self) -> &BTreeMap<String, String> {
        &self.facts
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.facts.get(key).map(String::as_str)
    }

    /// Find the fact a query refers to.
    ///
    /// Tried in order: exact key; for queries mentioning "founded", the
    /// first "founded" key whose last word appears in the query; the
    /// first key contained in the query (case-insensitive).
    pub fn lookup(&self, query: &str) -> Option<&str> {
        let query = query.trim();
        if query.is_empty() {
            return None;
        }
        if let Some(value) = self.get(query) {
            return Some(value);
        }

        let lower = query.to_lowercase();
        if lower.contains("founded") {
            let founded = self.facts.iter().find(|(key, _)| {
                let key = key.to_lowercase();
                key.contains("founded")
                    && key
                        .split_whitespace()
                        .last()
                        .is_some_and(|last| lower.contains(last))
            });
            if let Some((_, value)) = founded {
                return Some(value);
            }
        }

        self.facts
            .iter()
            .find(|(key, _)| lower.contains(&key.to_lowercase()))
            .map(|(_, value)| value.as_str())
    }

    /// Lookup with the fixed fallback sentence
    pub fn answer(&self, query: &str) -> &str {
        self.lookup(query).unwrap_or(NO_ANSWER)
    }

    /// Values of every fact sharing a word with the query, space-joined.
    ///
    /// Falls back to all values when nothing matches.
    pub fn relevant_context(&self, query: &str) -> String {
        let lower = query.to_lowercase();
        let relevant: Vec<&str> = self
            .facts
            .iter()
            .filter(|(key, _)| {
                key.split_whitespace()
                    .any(|word| lower.contains(&word.to_lowercase()))
            })
            .map(|(_, value)| value.as_str())
            .collect();

        if relevant.is_empty() {
            self.facts
                .values()
                .map(String::as_str)
                .collect::<Vec<_>>()
                .join(" ")
        } else {
            relevant.join(" ")
        }
    }

    /// Entities and "founded" relationships parsed from the keys
    pub fn founded_relations(&self) -> (Vec<Entity>, Vec<Relationship>) {
        let mut buckets = EntityBuckets::new();
        let mut relationships = Vec::new();

        for key in self.facts.keys() {
            let Some((subject, object)) = key.split_once(FOUNDED_SEPARATOR) else {
                tracing::debug!(key = %key, "Skipping fact without a founded clause");
                continue;
            };
            let (subject, object) = (subject.trim(), object.trim());
            if subject.is_empty() || object.is_empty() {
                continue;
            }

            buckets.insert(EntityCategory::Person, subject);
            buckets.insert(EntityCategory::Organization, object);
            relationships.push(Relationship::new(
                subject,
                object,
                "founded",
                RelationOrigin::KnowledgeBase,
            ));
        }

        (buckets.entities(), relationships)
    }

    /// Distinct (subject, predicate, object) statements describing the
    /// founded facts: a type and a name for each endpoint plus the link
    pub fn founded_triples(&self) -> BTreeSet<(String, &'static str, String)> {
        let (_, relationships) = self.founded_relations();
        let mut triples = BTreeSet::new();

        for rel in relationships {
            triples.insert((rel.source.clone(), "type", "Person".to_string()));
            triples.insert((rel.source.clone(), "name", rel.source.clone()));
            triples.insert((rel.target.clone(), "type", "Company".to_string()));
            triples.insert((rel.target.clone(), "name", rel.target.clone()));
            triples.insert((rel.source, "founded", rel.target));
        }

        triples
    }

    /// The simple Person --founded--> Organization graph
    pub fn founded_graph(&self) -> EntityGraph {
        let (entities, relationships) = self.founded_relations();
        EntityGraph::build(&entities, &relationships)
    }
}
