//! Application state management
//!
//! Author: hephaex@gmail.com

use kgx_core::config::AppConfig;
use kgx_graph::{KnowledgeBase, KnowledgePipeline};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

/// Application state shared across handlers.
///
/// Everything here is built once at startup and only read afterwards,
/// apart from the request counter.
pub struct AppState {
    /// Application configuration
    pub config: AppConfig,
    /// Extraction, inference, layout, and rendering
    pub pipeline: KnowledgePipeline,
    /// Static fact table
    pub knowledge: KnowledgeBase,
    /// Server start time
    pub start_time: Instant,
    /// Request counter
    pub request_count: AtomicU64,
}

impl AppState {
    pub fn new(config: AppConfig, pipeline: KnowledgePipeline, knowledge: KnowledgeBase) -> Self {
        Self {
            config,
            pipeline,
            knowledge,
            start_time: Instant::now(),
            request_count: AtomicU64::new(0),
        }
    }

    /// Select the recognizer and load the knowledge base
    pub async fn from_config(config: AppConfig) -> Self {
        let pipeline = KnowledgePipeline::from_config(&config).await;
        let knowledge = KnowledgeBase::load(&config.knowledge.path);
        Self::new(config, pipeline, knowledge)
    }

    /// Pattern recognizer and an empty knowledge base; no I/O
    pub fn for_testing() -> Self {
        let config = AppConfig::default();
        let pipeline = KnowledgePipeline::pattern_only(&config);
        Self::new(config, pipeline, KnowledgeBase::default())
    }

    /// Increment request counter
    pub fn increment_requests(&self) -> u64 {
        self.request_count.fetch_add(1, Ordering::SeqCst)
    }

    /// Get total request count
    pub fn get_request_count(&self) -> u64 {
        self.request_count.load(Ordering::SeqCst)
    }

    /// Get uptime in seconds
    pub fn uptime_secs(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}
