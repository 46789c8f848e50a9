//! KGX Extractor - Knowledge extraction pipeline
//!
//! Implements Named Entity Recognition (NER) and relationship
//! inference for building knowledge graphs from free text.

use async_trait::async_trait;
use kgx_core::{EntityBuckets, Result};

/// Capability interface for named-entity recognition.
///
/// Implementations are chosen once at startup: either an external
/// service or the built-in pattern cascade.
#[async_trait]
pub trait EntityRecognizer: Send + Sync {
    /// Recognizer name for logging
    fn name(&self) -> &'static str;

    /// Bucket the named spans of `text` by category
    async fn recognize(&self, text: &str) -> Result<EntityBuckets>;
}

pub mod ner;
pub mod relation;

pub use ner::{select_recognizer, EntityExtractor, PatternRecognizer, ServiceRecognizer};
pub use relation::{HeuristicLayer, InferenceContext, LinkSet, RelationshipInferencer};
