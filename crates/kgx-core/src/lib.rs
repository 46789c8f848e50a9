//! KGX Core - Domain models, errors, and shared types
//!
//! This crate defines the core abstractions used throughout the KGX system:
//! - Entity categories and per-request entity buckets
//! - Relationships between entities and the heuristic that produced them
//! - Common error types
//! - Configuration management

pub mod config;

pub use config::{
    AppConfig, ConfigError, ExtractionConfig, KnowledgeConfig, LayoutConfig, LoggingConfig,
    NerConfig, ServerConfig,
};

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

/// Core error types for KGX operations
#[derive(Error, Debug)]
pub enum KgError {
    #[error("Recognizer error: {0}")]
    RecognizerError(String),

    #[error("Inference error: {0}")]
    InferenceError(String),

    #[error("Graph error: {0}")]
    GraphError(String),

    #[error("Layout error: {0}")]
    LayoutError(String),

    #[error("Render error: {0}")]
    RenderError(String),

    #[error("Knowledge base error: {0}")]
    KnowledgeBaseError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, KgError>;

// ============================================================================
// Entity Models
// ============================================================================

/// Category of a named span.
///
/// Wire labels follow the usual NER convention (`PERSON`, `ORG`, `GPE`,
/// `PRODUCT`) so payloads line up with what external recognizers emit.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum EntityCategory {
    #[serde(rename = "PERSON")]
    Person,
    #[serde(rename = "ORG")]
    Organization,
    #[serde(rename = "GPE")]
    Place,
    #[serde(rename = "PRODUCT")]
    Product,
    #[default]
    #[serde(rename = "UNKNOWN")]
    Unknown,
}

impl EntityCategory {
    /// Get the wire label
    pub fn as_label(&self) -> &'static str {
        match self {
            Self::Person => "PERSON",
            Self::Organization => "ORG",
            Self::Place => "GPE",
            Self::Product => "PRODUCT",
            Self::Unknown => "UNKNOWN",
        }
    }

    /// Map an NER label onto a supported category.
    ///
    /// `LOC` is folded into [`EntityCategory::Place`]; anything else
    /// (`NORP`, `DATE`, ...) is unsupported and yields `None`.
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_uppercase().as_str() {
            "PERSON" | "PER" => Some(Self::Person),
            "ORG" | "ORGANIZATION" => Some(Self::Organization),
            "GPE" | "LOC" | "LOCATION" => Some(Self::Place),
            "PRODUCT" => Some(Self::Product),
            _ => None,
        }
    }

    /// Whether this category takes part in extraction output
    pub fn is_supported(&self) -> bool {
        !matches!(self, Self::Unknown)
    }
}

impl std::fmt::Display for EntityCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_label())
    }
}

/// A categorized text span
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Entity {
    /// Surface text as it appeared in the source
    pub text: String,

    /// Entity category
    pub category: EntityCategory,
}

impl Entity {
    /// Create a new entity
    pub fn new(text: impl Into<String>, category: EntityCategory) -> Self {
        Self {
            text: text.into(),
            category,
        }
    }
}

/// Extraction output: category -> set of surface texts.
///
/// Only non-empty categories are stored, so the serialized form is
/// `{"PERSON": ["Elon Musk"], "ORG": ["SpaceX"]}`. Reading a missing
/// category yields an empty set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityBuckets {
    buckets: BTreeMap<EntityCategory, BTreeSet<String>>,
}

impl EntityBuckets {
    /// Create empty buckets
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a surface text to a category.
    ///
    /// Returns `false` for blank text, unsupported categories, and
    /// texts already present in the category.
    pub fn insert(&mut self, category: EntityCategory, text: impl AsRef<str>) -> bool {
        let text = text.as_ref().trim();
        if text.is_empty() || !category.is_supported() {
            return false;
        }
        self.buckets
            .entry(category)
            .or_default()
            .insert(text.to_string())
    }

    /// Surface texts of a category (empty if none were found)
    pub fn texts(&self, category: EntityCategory) -> Vec<&str> {
        self.buckets
            .get(&category)
            .map(|set| set.iter().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// Check membership
    pub fn contains(&self, category: EntityCategory, text: &str) -> bool {
        self.buckets
            .get(&category)
            .map(|set| set.contains(text))
            .unwrap_or(false)
    }

    /// True when no category holds any text
    pub fn is_empty(&self) -> bool {
        self.buckets.values().all(BTreeSet::is_empty)
    }

    /// Total number of (category, text) entries
    pub fn len(&self) -> usize {
        self.buckets.values().map(BTreeSet::len).sum()
    }

    /// Unique entities, one per surface text.
    ///
    /// A text present in several categories keeps the first one in
    /// category order (Person, Organization, Place, Product).
    pub fn entities(&self) -> Vec<Entity> {
        let mut seen = HashSet::new();
        let mut entities = Vec::with_capacity(self.len());
        for (category, texts) in &self.buckets {
            for text in texts {
                if seen.insert(text.as_str()) {
                    entities.push(Entity::new(text.clone(), *category));
                }
            }
        }
        entities
    }

    /// Label-keyed map for wire output
    pub fn to_label_map(&self) -> BTreeMap<String, Vec<String>> {
        self.buckets
            .iter()
            .filter(|(_, set)| !set.is_empty())
            .map(|(category, set)| (category.as_label().to_string(), set.iter().cloned().collect()))
            .collect()
    }
}

// ============================================================================
// Relationship Models
// ============================================================================

/// Which heuristic (or data source) produced a relationship
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationOrigin {
    /// Founding verb between a person and an organization
    Founding,
    /// Employment verb between a person and an organization
    Employment,
    /// Family phrasing templates
    Family,
    /// Co-occurrence within one sentence
    Sentence,
    /// Word-proximity fallback
    Proximity,
    /// Static knowledge-base fact
    KnowledgeBase,
}

impl RelationOrigin {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Founding => "founding",
            Self::Employment => "employment",
            Self::Family => "family",
            Self::Sentence => "sentence",
            Self::Proximity => "proximity",
            Self::KnowledgeBase => "knowledge_base",
        }
    }
}

impl std::fmt::Display for RelationOrigin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A labeled connection between two entities
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relationship {
    /// Source entity surface text
    pub source: String,

    /// Target entity surface text
    pub target: String,

    /// Relation label (e.g. "founded", "family", "related")
    pub label: String,

    /// Heuristic that produced this relationship
    pub origin: RelationOrigin,
}

impl Relationship {
    /// Create a new relationship
    pub fn new(
        source: impl Into<String>,
        target: impl Into<String>,
        label: impl Into<String>,
        origin: RelationOrigin,
    ) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            label: label.into(),
            origin,
        }
    }

    /// Order-independent key for the entity pair
    pub fn pair_key(&self) -> (String, String) {
        pair_key(&self.source, &self.target)
    }

    /// True if both ends are the same entity
    pub fn is_self_loop(&self) -> bool {
        self.source == self.target
    }
}

/// Order-independent key for an entity pair
pub fn pair_key(a: &str, b: &str) -> (String, String) {
    if a <= b {
        (a.to_string(), b.to_string())
    } else {
        (b.to_string(), a.to_string())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_labels() {
        assert_eq!(EntityCategory::Person.as_label(), "PERSON");
        assert_eq!(EntityCategory::Place.to_string(), "GPE");
        assert_eq!(EntityCategory::from_label("org"), Some(EntityCategory::Organization));
        assert_eq!(EntityCategory::from_label("LOC"), Some(EntityCategory::Place));
        assert_eq!(EntityCategory::from_label("NORP"), None);
    }

    #[test]
    fn test_buckets_deduplicate() {
        let mut buckets = EntityBuckets::new();
        assert!(buckets.insert(EntityCategory::Person, "Elon Musk"));
        assert!(!buckets.insert(EntityCategory::Person, "Elon Musk"));
        assert!(!buckets.insert(EntityCategory::Person, "   "));
        assert!(!buckets.insert(EntityCategory::Unknown, "Thing"));

        assert_eq!(buckets.texts(EntityCategory::Person), vec!["Elon Musk"]);
        assert!(buckets.texts(EntityCategory::Product).is_empty());
        assert_eq!(buckets.len(), 1);
    }

    #[test]
    fn test_buckets_serialize_labels() {
        let mut buckets = EntityBuckets::new();
        buckets.insert(EntityCategory::Organization, "SpaceX");
        buckets.insert(EntityCategory::Person, "Elon Musk");

        let json = serde_json::to_value(&buckets).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"PERSON": ["Elon Musk"], "ORG": ["SpaceX"]})
        );
    }

    #[test]
    fn test_entities_first_category_wins() {
        let mut buckets = EntityBuckets::new();
        buckets.insert(EntityCategory::Product, "Apple");
        buckets.insert(EntityCategory::Organization, "Apple");
        buckets.insert(EntityCategory::Person, "Steve Jobs");

        let entities = buckets.entities();
        assert_eq!(entities.len(), 2);
        assert_eq!(entities[0], Entity::new("Steve Jobs", EntityCategory::Person));
        assert_eq!(entities[1], Entity::new("Apple", EntityCategory::Organization));
    }

    #[test]
    fn test_pair_key_is_order_independent() {
        let a = Relationship::new("B", "A", "related", RelationOrigin::Proximity);
        assert_eq!(a.pair_key(), pair_key("A", "B"));
        assert!(!a.is_self_loop());
        assert!(Relationship::new("A", "A", "x", RelationOrigin::Sentence).is_self_loop());
    }
}
