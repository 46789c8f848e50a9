//! KGX Configuration Management
//!
//! Handles configuration from environment variables and config files
//! with sensible defaults for development.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Server configuration
    pub server: ServerConfig,

    /// External NER service
    pub ner: NerConfig,

    /// Fallback extraction and inference tuning
    pub extraction: ExtractionConfig,

    /// Graph layout
    pub layout: LayoutConfig,

    /// Static knowledge base
    pub knowledge: KnowledgeConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        // Server
        if let Ok(host) = std::env::var("API_HOST") {
            config.server.host = host;
        }
        if let Ok(port) = std::env::var("API_PORT") {
            config.server.port = parse_var("API_PORT", port)?;
        }

        // CORS origins from environment variable (comma-separated)
        if let Ok(origins) = std::env::var("CORS_ORIGINS") {
            config.server.cors_origins = origins
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }

        // NER service
        if let Ok(endpoint) = std::env::var("NER_ENDPOINT") {
            let endpoint = endpoint.trim().to_string();
            config.ner.endpoint = (!endpoint.is_empty()).then_some(endpoint);
        }
        if let Ok(timeout) = std::env::var("NER_TIMEOUT_SECS") {
            config.ner.timeout_secs = parse_var("NER_TIMEOUT_SECS", timeout)?;
        }

        // Layout
        if let Ok(seed) = std::env::var("LAYOUT_SEED") {
            config.layout.seed = parse_var("LAYOUT_SEED", seed)?;
        }
        if let Ok(iterations) = std::env::var("LAYOUT_ITERATIONS") {
            config.layout.iterations = parse_var("LAYOUT_ITERATIONS", iterations)?;
        }

        // Knowledge base
        if let Ok(path) = std::env::var("KNOWLEDGE_BASE_PATH") {
            config.knowledge.path = PathBuf::from(path);
        }

        // Logging
        if let Ok(level) = std::env::var("LOG_LEVEL") {
            config.logging.level = level;
        }
        if let Ok(json) = std::env::var("LOG_JSON") {
            config.logging.json_format = parse_var("LOG_JSON", json)?;
        }

        Ok(config)
    }

    /// Load from a TOML file
    pub fn from_file(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let content = std::fs::read_to_string(&path).map_err(|e| ConfigError::FileReadError {
            path: path.clone(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path,
            message: e.to_string(),
        })
    }

    /// Merge with environment variables (env takes precedence)
    pub fn with_env_override(mut self) -> Result<Self, ConfigError> {
        let env_config = Self::from_env()?;

        // Only override if env values differ from defaults
        if env_config.server.host != ServerConfig::default().host {
            self.server.host = env_config.server.host;
        }
        if env_config.server.port != ServerConfig::default().port {
            self.server.port = env_config.server.port;
        }
        if !env_config.server.cors_origins.is_empty() {
            self.server.cors_origins = env_config.server.cors_origins;
        }
        if env_config.ner.endpoint.is_some() {
            self.ner.endpoint = env_config.ner.endpoint;
        }
        if env_config.ner.timeout_secs != NerConfig::default().timeout_secs {
            self.ner.timeout_secs = env_config.ner.timeout_secs;
        }
        if env_config.layout.seed != LayoutConfig::default().seed {
            self.layout.seed = env_config.layout.seed;
        }
        if env_config.layout.iterations != LayoutConfig::default().iterations {
            self.layout.iterations = env_config.layout.iterations;
        }
        if env_config.knowledge.path != KnowledgeConfig::default().path {
            self.knowledge.path = env_config.knowledge.path;
        }
        if env_config.logging.level != LoggingConfig::default().level {
            self.logging.level = env_config.logging.level;
        }
        if env_config.logging.json_format != LoggingConfig::default().json_format {
            self.logging.json_format = env_config.logging.json_format;
        }

        Ok(self)
    }
}

fn parse_var<T: std::str::FromStr>(key: &str, value: String) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        value,
    })
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,

    /// Port to listen on
    pub port: u16,

    /// Maximum request body size in bytes
    pub max_body_size: usize,

    /// Enable CORS
    pub cors_enabled: bool,

    /// Allowed origins for CORS
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            max_body_size: 1024 * 1024, // 1MB
            cors_enabled: true,
            // Empty by default for security - set via CORS_ORIGINS env var
            cors_origins: vec![],
        }
    }
}

/// External named-entity recognition service
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NerConfig {
    /// Endpoint accepting `{"text": ...}` and answering `[{"text", "label"}]`.
    /// `None` selects the pattern recognizer.
    pub endpoint: Option<String>,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for NerConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            timeout_secs: 10,
        }
    }
}

/// Pattern extraction and relationship inference tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Characters on each side of a single capitalized word searched
    /// for a family/relationship keyword
    pub context_window: usize,

    /// Maximum token distance for the proximity fallback
    pub proximity_window: usize,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            context_window: 50,
            proximity_window: 5,
        }
    }
}

/// Force-directed layout configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LayoutConfig {
    /// Number of spring iterations
    pub iterations: usize,

    /// Seed for the initial positions
    pub seed: u64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            iterations: 50,
            seed: 42,
        }
    }
}

/// Static knowledge base configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KnowledgeConfig {
    /// Path to the JSON fact table
    pub path: PathBuf,
}

impl Default for KnowledgeConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("knowledge_base.json"),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// JSON format for logs
    pub json_format: bool,

    /// Include file/line in logs
    pub include_location: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
            include_location: false,
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    FileReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },
}

impl From<ConfigError> for crate::KgError {
    fn from(err: ConfigError) -> Self {
        crate::KgError::ConfigError(err.to_string())
    }
}
