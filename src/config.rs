//! TOML configuration.
//!
//! Every section is optional; a missing file section falls back to the
//! defaults below. [`load_config`] validates ranges and provider settings
//! before anything is constructed.
//!
//! ```toml
//! [retrieval]
//! max_results = 5
//! min_relevance = 0.3
//!
//! [embedding]
//! provider = "openai"
//! model = "text-embedding-ada-002"
//!
//! [generation]
//! provider = "openai"
//! model = "gpt-4-turbo-preview"
//!
//! [index]
//! url = "http://localhost:8000"
//! collection = "youtube_transcripts"
//!
//! [channels]
//! "Lex Fridman" = true
//! "Huberman Lab" = true
//! "Diary of a CEO" = false
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    #[serde(default)]
    pub embedding: EmbeddingConfig,
    #[serde(default)]
    pub generation: GenerationConfig,
    #[serde(default)]
    pub index: IndexConfig,
    /// Default channel allow-list; unlisted channels are included.
    #[serde(default)]
    pub channels: HashMap<String, bool>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RetrievalConfig {
    #[serde(default = "default_max_results")]
    pub max_results: usize,
    #[serde(default = "default_min_relevance")]
    pub min_relevance: f64,
    #[serde(default = "default_max_age_days")]
    pub max_age_days: i64,
    #[serde(default)]
    pub explain: bool,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            max_results: default_max_results(),
            min_relevance: default_min_relevance(),
            max_age_days: default_max_age_days(),
            explain: false,
        }
    }
}

fn default_max_results() -> usize {
    5
}
fn default_min_relevance() -> f64 {
    0.3
}
fn default_max_age_days() -> i64 {
    365
}

#[derive(Debug, Deserialize, Clone)]
pub struct EmbeddingConfig {
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default)]
    pub model: Option<String>,
    /// Base URL override for OpenAI-compatible endpoints.
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default = "default_embedding_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_embedding_max_retries")]
    pub max_retries: u32,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: None,
            url: None,
            timeout_secs: default_embedding_timeout_secs(),
            max_retries: default_embedding_max_retries(),
        }
    }
}

impl EmbeddingConfig {
    pub fn is_enabled(&self) -> bool {
        self.provider != "disabled"
    }
}

fn default_provider() -> String {
    "disabled".to_string()
}
fn default_embedding_timeout_secs() -> u64 {
    30
}
fn default_embedding_max_retries() -> u32 {
    5
}

#[derive(Debug, Deserialize, Clone)]
pub struct GenerationConfig {
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default = "default_generation_model")]
    pub model: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default = "default_generation_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_generation_max_retries")]
    pub max_retries: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: default_generation_model(),
            url: None,
            timeout_secs: default_generation_timeout_secs(),
            max_retries: default_generation_max_retries(),
        }
    }
}

impl GenerationConfig {
    pub fn is_enabled(&self) -> bool {
        self.provider != "disabled"
    }
}

fn default_generation_model() -> String {
    "gpt-4-turbo-preview".to_string()
}
fn default_generation_timeout_secs() -> u64 {
    60
}
fn default_generation_max_retries() -> u32 {
    3
}

#[derive(Debug, Deserialize, Clone)]
pub struct IndexConfig {
    #[serde(default = "default_index_url")]
    pub url: String,
    #[serde(default = "default_collection")]
    pub collection: String,
    #[serde(default = "default_index_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            url: default_index_url(),
            collection: default_collection(),
            timeout_secs: default_index_timeout_secs(),
        }
    }
}

fn default_index_url() -> String {
    "http://localhost:8000".to_string()
}
fn default_collection() -> String {
    "youtube_transcripts".to_string()
}
fn default_index_timeout_secs() -> u64 {
    30
}

/// Read, parse, and validate a config file.
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    parse_config(&content)
}

/// Parse and validate config from a TOML string.
pub fn parse_config(content: &str) -> Result<Config> {
    let config: Config = toml::from_str(content).with_context(|| "Failed to parse config file")?;
    validate(&config)?;
    Ok(config)
}

fn validate(config: &Config) -> Result<()> {
    // Validate retrieval
    if config.retrieval.max_results < 1 {
        anyhow::bail!("retrieval.max_results must be >= 1");
    }

    if !(0.0..=1.0).contains(&config.retrieval.min_relevance) {
        anyhow::bail!("retrieval.min_relevance must be in [0.0, 1.0]");
    }

    if config.retrieval.max_age_days < 1 {
        anyhow::bail!("retrieval.max_age_days must be >= 1");
    }

    // Validate providers
    match config.embedding.provider.as_str() {
        "disabled" | "openai" => {}
        other => anyhow::bail!(
            "Unknown embedding provider: '{}'. Must be disabled or openai.",
            other
        ),
    }

    if config.embedding.is_enabled() && config.embedding.model.is_none() {
        anyhow::bail!(
            "embedding.model must be specified when provider is '{}'",
            config.embedding.provider
        );
    }

    match config.generation.provider.as_str() {
        "disabled" | "openai" => {}
        other => anyhow::bail!(
            "Unknown generation provider: '{}'. Must be disabled or openai.",
            other
        ),
    }

    if config.generation.model.trim().is_empty() {
        anyhow::bail!("generation.model must not be empty");
    }

    if config.index.collection.trim().is_empty() {
        anyhow::bail!("index.collection must not be empty");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let cfg = parse_config("").unwrap();
        assert_eq!(cfg.retrieval.max_results, 5);
        assert_eq!(cfg.retrieval.min_relevance, 0.3);
        assert_eq!(cfg.retrieval.max_age_days, 365);
        assert!(!cfg.embedding.is_enabled());
        assert!(!cfg.generation.is_enabled());
        assert_eq!(cfg.generation.model, "gpt-4-turbo-preview");
        assert_eq!(cfg.index.collection, "youtube_transcripts");
        assert!(cfg.channels.is_empty());
    }

    #[test]
    fn test_full_config() {
        let cfg = parse_config(
            r#"
            [retrieval]
            max_results = 8
            min_relevance = 0.2
            explain = true

            [embedding]
            provider = "openai"
            model = "text-embedding-ada-002"

            [generation]
            provider = "openai"
            url = "http://localhost:9999"

            [index]
            url = "http://chroma:8000"

            [channels]
            "Lex Fridman" = true
            "Diary of a CEO" = false
            "#,
        )
        .unwrap();
        assert_eq!(cfg.retrieval.max_results, 8);
        assert!(cfg.retrieval.explain);
        assert_eq!(cfg.embedding.model.as_deref(), Some("text-embedding-ada-002"));
        assert_eq!(cfg.generation.url.as_deref(), Some("http://localhost:9999"));
        assert_eq!(cfg.index.url, "http://chroma:8000");
        assert_eq!(cfg.channels.get("Diary of a CEO"), Some(&false));
    }

    #[test]
    fn test_rejects_bad_ranges() {
        assert!(parse_config("[retrieval]\nmax_results = 0").is_err());
        assert!(parse_config("[retrieval]\nmin_relevance = 1.5").is_err());
        assert!(parse_config("[retrieval]\nmax_age_days = 0").is_err());
    }

    #[test]
    fn test_rejects_unknown_provider() {
        let err = parse_config("[embedding]\nprovider = \"cohere\"").unwrap_err();
        assert!(err.to_string().contains("Unknown embedding provider"));
        assert!(parse_config("[generation]\nprovider = \"anthropic\"").is_err());
    }

    #[test]
    fn test_embedding_model_required_when_enabled() {
        let err = parse_config("[embedding]\nprovider = \"openai\"").unwrap_err();
        assert!(err.to_string().contains("embedding.model"));
    }
}
