//! Wiring from [`Config`] to a ready [`QueryPipeline`].
//!
//! Also holds the CLI-side helpers shared by `ask` and `search`: channel
//! flag parsing and the per-request option overrides.

use anyhow::{bail, Result};
use std::collections::HashMap;
use std::sync::Arc;

use podcast_insights_core::pipeline::{AskRequest, PipelineOptions, QueryPipeline};

use crate::chroma::ChromaIndex;
use crate::config::Config;
use crate::embedding::create_provider;
use crate::generation::create_generator;

/// Per-invocation overrides of the `[retrieval]` and `[channels]` config.
#[derive(Debug, Clone, Default)]
pub struct QueryArgs {
    pub max_sources: Option<usize>,
    pub min_relevance: Option<f64>,
    pub channels: Vec<(String, bool)>,
    pub style: Option<String>,
    pub explain: bool,
}

/// Build the pipeline described by `config`.
///
/// `explain` forces score breakdowns on regardless of `retrieval.explain`.
pub fn build_pipeline(config: &Config, explain: bool) -> Result<QueryPipeline> {
    let embedder = create_provider(&config.embedding)?;
    let generator = create_generator(&config.generation)?;
    let index = Arc::new(ChromaIndex::new(&config.index)?);

    tracing::debug!(
        embedding = embedder.model_name(),
        generation = generator.model_name(),
        collection = %config.index.collection,
        "pipeline ready"
    );

    let options = PipelineOptions {
        max_age_days: config.retrieval.max_age_days,
        explain: explain || config.retrieval.explain,
    };
    Ok(QueryPipeline::new(embedder, index, generator, options))
}

/// Resolve CLI overrides against the config into a single request.
pub fn build_request(config: &Config, query: &str, args: &QueryArgs) -> Result<AskRequest> {
    let max_sources = args.max_sources.unwrap_or(config.retrieval.max_results);
    if max_sources < 1 {
        bail!("--max-sources must be >= 1");
    }

    let min_relevance = args.min_relevance.unwrap_or(config.retrieval.min_relevance);
    if !(0.0..=1.0).contains(&min_relevance) {
        bail!("--min-relevance must be in [0.0, 1.0]");
    }

    Ok(AskRequest {
        query: query.to_string(),
        max_sources,
        min_relevance,
        channels: merge_channels(&config.channels, &args.channels),
        response_style: args.style.clone(),
    })
}

/// Config channels first, then command-line flags on top.
pub fn merge_channels(
    configured: &HashMap<String, bool>,
    overrides: &[(String, bool)],
) -> HashMap<String, bool> {
    let mut channels = configured.clone();
    for (name, include) in overrides {
        channels.insert(name.clone(), *include);
    }
    channels
}

/// Parse a `--channel` value: `NAME`, `NAME=true`, or `NAME=false`.
///
/// A suffix that is not a boolean is treated as part of the name.
pub fn parse_channel(s: &str) -> Result<(String, bool), String> {
    let (name, include) = match s.rsplit_once('=') {
        Some((name, value)) => match value.trim().to_lowercase().as_str() {
            "true" | "yes" | "1" => (name, true),
            "false" | "no" | "0" => (name, false),
            _ => (s, true),
        },
        None => (s, true),
    };

    let name = name.trim();
    if name.is_empty() {
        return Err(format!("invalid channel '{}': empty name", s));
    }
    Ok((name.to_string(), include))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_channel() {
        assert_eq!(parse_channel("Lex Fridman").unwrap(), ("Lex Fridman".into(), true));
        assert_eq!(
            parse_channel("Diary of a CEO=false").unwrap(),
            ("Diary of a CEO".into(), false)
        );
        assert_eq!(parse_channel("Huberman Lab=TRUE").unwrap(), ("Huberman Lab".into(), true));
        assert_eq!(parse_channel("a=b").unwrap(), ("a=b".into(), true));
        assert!(parse_channel("=false").is_err());
    }

    #[test]
    fn test_merge_channels_overrides_config() {
        let configured = HashMap::from([
            ("Lex Fridman".to_string(), true),
            ("Diary of a CEO".to_string(), false),
        ]);
        let merged = merge_channels(&configured, &[("Lex Fridman".to_string(), false)]);
        assert_eq!(merged.get("Lex Fridman"), Some(&false));
        assert_eq!(merged.get("Diary of a CEO"), Some(&false));
    }

    #[test]
    fn test_build_request_uses_config_defaults() {
        let config = Config::default();
        let request = build_request(&config, "what is ai", &QueryArgs::default()).unwrap();
        assert_eq!(request.max_sources, 5);
        assert_eq!(request.min_relevance, 0.3);
        assert!(request.channels.is_empty());
        assert_eq!(request.response_style, None);
    }

    #[test]
    fn test_build_request_rejects_bad_overrides() {
        let config = Config::default();
        let zero = QueryArgs {
            max_sources: Some(0),
            ..QueryArgs::default()
        };
        assert!(build_request(&config, "q", &zero).is_err());

        let high = QueryArgs {
            min_relevance: Some(1.5),
            ..QueryArgs::default()
        };
        assert!(build_request(&config, "q", &high).is_err());
    }

    #[test]
    fn test_build_pipeline_with_disabled_providers() {
        let pipeline = build_pipeline(&Config::default(), true);
        assert!(pipeline.is_ok());
    }
}
