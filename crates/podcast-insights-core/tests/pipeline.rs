//! End-to-end tests for the query pipeline.
//!
//! These tests drive [`QueryPipeline`] against an [`InMemoryIndex`] and
//! scripted providers, covering the happy path, the no-results path,
//! channel filtering, and each class of failure.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use anyhow::{bail, Result};
use async_trait::async_trait;
use podcast_insights_core::answer::SYNTHESIS_SYSTEM_PROMPT;
use podcast_insights_core::index::memory::InMemoryIndex;
use podcast_insights_core::intent::CLASSIFIER_SYSTEM_PROMPT;
use podcast_insights_core::models::{QueryType, UNKNOWN_TITLE};
use podcast_insights_core::pipeline::{AskRequest, PipelineOptions, QueryPipeline, NO_RESULTS_MESSAGE};
use podcast_insights_core::provider::{EmbeddingProvider, GenerativeProvider};
use serde_json::json;

// ─── Test Providers ─────────────────────────────────────────────────

const VOCAB: [&str; 3] = ["ai", "sleep", "coffee"];

/// Embeds text as keyword presence over a tiny vocabulary.
struct KeywordEmbedder;

fn keyword_vector(text: &str) -> Vec<f32> {
    let lower = text.to_lowercase();
    let mut v: Vec<f32> = VOCAB
        .iter()
        .map(|w| if lower.contains(w) { 1.0 } else { 0.0 })
        .collect();
    v.push(0.1);
    v
}

#[async_trait]
impl EmbeddingProvider for KeywordEmbedder {
    fn model_name(&self) -> &str {
        "keyword"
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        Ok(keyword_vector(text))
    }
}

struct BrokenEmbedder;

#[async_trait]
impl EmbeddingProvider for BrokenEmbedder {
    fn model_name(&self) -> &str {
        "broken"
    }

    async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
        bail!("connection refused")
    }
}

/// Replies to classification and synthesis prompts and records every call.
struct ScriptedGenerator {
    classification: Option<String>,
    fail: bool,
    calls: Mutex<Vec<(String, String)>>,
}

impl ScriptedGenerator {
    fn answering(classification: serde_json::Value) -> Arc<Self> {
        Arc::new(Self {
            classification: Some(classification.to_string()),
            fail: false,
            calls: Mutex::new(Vec::new()),
        })
    }

    fn failing() -> Arc<Self> {
        Arc::new(Self {
            classification: None,
            fail: true,
            calls: Mutex::new(Vec::new()),
        })
    }

    fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl GenerativeProvider for ScriptedGenerator {
    fn model_name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, system_prompt: &str, user_prompt: &str) -> Result<String> {
        self.calls
            .lock()
            .unwrap()
            .push((system_prompt.to_string(), user_prompt.to_string()));
        if self.fail {
            bail!("model overloaded");
        }
        if system_prompt == CLASSIFIER_SYSTEM_PROMPT {
            return Ok(self.classification.clone().unwrap_or_default());
        }
        Ok("AI consciousness is debated. [Source 1]".to_string())
    }
}

fn corpus() -> Arc<InMemoryIndex> {
    let index = InMemoryIndex::new();
    let docs = [
        (
            json!("AI consciousness debate"),
            Some(json!({"title": "AI Ethics Today", "channel": "Lex Fridman", "published_at": "2024-01-01"})),
        ),
        (
            json!("sleep and adenosine"),
            Some(json!({"title": "Sleep Toolkit", "channel": "Huberman Lab", "published_at": "2023-05-01"})),
        ),
        (
            json!("coffee and ai productivity"),
            Some(json!({"title": "Morning Routines", "channel": "Diary of a CEO"})),
        ),
        (json!({"text": "ai safety"}), None),
    ];
    for (doc, meta) in docs {
        let vector = keyword_vector(&podcast_insights_core::models::coerce_content(&doc));
        index.add(doc, meta, vector).unwrap();
    }
    Arc::new(index)
}

fn classification() -> serde_json::Value {
    json!({
        "query_type": "factual",
        "topics": ["AI"],
        "context_needs": ["definitions"],
        "expected_sources": ["Lex Fridman"],
        "time_relevance": "any_time",
        "summary_format": "short answer",
        "complexity_level": "intermediate",
        "key_terms": ["ai", "consciousness"]
    })
}

fn pipeline(embedder: Arc<dyn EmbeddingProvider>, generator: Arc<ScriptedGenerator>) -> QueryPipeline {
    QueryPipeline::new(embedder, corpus(), generator, PipelineOptions::default())
}

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

// ─── Tests ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_ask_ranks_and_answers() {
    let generator = ScriptedGenerator::answering(classification());
    let p = pipeline(Arc::new(KeywordEmbedder), generator.clone());

    let mut request = AskRequest::new("What does AI consciousness mean?");
    request.max_sources = 2;
    request.response_style = Some("Concise".to_string());
    let resp = p.ask(&request).await.unwrap();

    assert_eq!(resp.results.len(), 2);
    assert_eq!(resp.results[0].metadata.title, "AI Ethics Today");
    // 0.5*0.3 + 1.0*0.2 + 0.2*0.3 + 0.2*0.1 + 0.5*0.1
    assert!(approx(resp.results[0].relevance_score, 0.48));
    // "ai safety" and the coffee episode tie at 0.23; index order wins.
    assert_eq!(resp.results[1].content, "ai safety");
    assert_eq!(resp.results[1].metadata.title, UNKNOWN_TITLE);
    assert!(approx(resp.results[1].relevance_score, 0.23));

    assert_eq!(resp.intent.results_found, 2);
    assert!(approx(resp.intent.avg_relevance, (0.48 + 0.23) / 2.0));
    assert_eq!(resp.intent.response_style.as_deref(), Some("Concise"));
    assert!(!resp.intent_fallback);
    assert!(resp.answer.starts_with("AI consciousness is debated."));

    let calls = generator.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].0, CLASSIFIER_SYSTEM_PROMPT);
    assert_eq!(calls[1].0, SYNTHESIS_SYSTEM_PROMPT);
    assert!(calls[1].1.contains("**Source 1:**"));
    assert!(calls[1].1.contains("**Source 2:**"));
    assert!(!calls[1].1.contains("**Source 3:**"));
    assert!(calls[1].1.contains("Concise style"));
}

#[tokio::test]
async fn test_no_results_skips_synthesis() {
    let generator = ScriptedGenerator::answering(classification());
    let p = pipeline(Arc::new(KeywordEmbedder), generator.clone());

    let mut request = AskRequest::new("What does AI consciousness mean?");
    request.min_relevance = 0.9;
    let resp = p.ask(&request).await.unwrap();

    assert!(resp.results.is_empty());
    assert_eq!(resp.answer, NO_RESULTS_MESSAGE);
    assert_eq!(resp.intent.results_found, 0);
    assert_eq!(resp.intent.avg_relevance, 0.0);
    assert_eq!(generator.calls().len(), 1, "only the classification call");
}

#[tokio::test]
async fn test_channel_filter_excludes_disabled_channels() {
    let generator = ScriptedGenerator::answering(classification());
    let p = pipeline(Arc::new(KeywordEmbedder), generator);

    let mut channels = HashMap::new();
    channels.insert("Lex Fridman".to_string(), false);
    channels.insert("Huberman Lab".to_string(), true);

    let (ranked, stats) = p
        .process("What does AI consciousness mean?", 2, 0.0, Some(&channels), None)
        .await
        .unwrap();

    let contents: Vec<&str> = ranked.results.iter().map(|c| c.content.as_str()).collect();
    assert_eq!(contents, vec!["ai safety", "coffee and ai productivity"]);
    assert_eq!(stats.results_found, 2);
    assert_eq!(stats.response_style, None);
}

#[tokio::test]
async fn test_process_results_sorted_and_bounded() {
    let generator = ScriptedGenerator::answering(classification());
    let p = pipeline(Arc::new(KeywordEmbedder), generator);

    for max in 1..=4 {
        let (ranked, _) = p.process("ai", max, 0.2, None, None).await.unwrap();
        assert!(ranked.len() <= max);
        assert!(ranked
            .results
            .windows(2)
            .all(|w| w[0].relevance_score >= w[1].relevance_score));
        assert!(ranked.results.iter().all(|c| c.relevance_score >= 0.2));
    }
}

#[tokio::test]
async fn test_classifier_failure_degrades_to_fallback() {
    let generator = ScriptedGenerator::failing();
    let p = pipeline(Arc::new(KeywordEmbedder), generator);

    let (ranked, stats) = p
        .process("AI Consciousness", 3, 0.0, None, None)
        .await
        .unwrap();

    assert_eq!(stats.intent.query_type, QueryType::Factual);
    assert_eq!(stats.intent.key_terms, vec!["ai", "consciousness"]);
    assert_eq!(stats.intent.topics, vec!["ai consciousness"]);
    assert_eq!(ranked.results[0].content, "AI consciousness debate");
    // 0.5*0.3 + 0 + 0.2*0.3 + 0 + 0.5*0.1
    assert!(approx(ranked.results[0].relevance_score, 0.26));
}

#[tokio::test]
async fn test_generation_failure_is_fatal_to_ask() {
    let generator = ScriptedGenerator::failing();
    let p = pipeline(Arc::new(KeywordEmbedder), generator);

    let err = p.ask(&AskRequest::new("AI Consciousness")).await.unwrap_err();
    assert!(format!("{:#}", err).contains("model overloaded"));
}

#[tokio::test]
async fn test_embedding_failure_is_fatal() {
    let generator = ScriptedGenerator::answering(classification());
    let p = pipeline(Arc::new(BrokenEmbedder), generator);

    let err = p.process("ai", 5, 0.0, None, None).await.unwrap_err();
    assert!(format!("{:#}", err).contains("connection refused"));
}

#[tokio::test]
async fn test_explain_populates_breakdown() {
    let generator = ScriptedGenerator::answering(classification());
    let p = QueryPipeline::new(
        Arc::new(KeywordEmbedder),
        corpus(),
        generator,
        PipelineOptions {
            explain: true,
            ..PipelineOptions::default()
        },
    );

    let (ranked, _) = p.process("ai", 1, 0.0, None, None).await.unwrap();
    let breakdown = ranked.results[0].breakdown.as_ref().unwrap();
    assert!(approx(breakdown.title_match, 1.0));
    assert!(approx(breakdown.source_score, 0.2));
}

#[tokio::test]
async fn test_concurrent_queries_share_pipeline() {
    let generator = ScriptedGenerator::answering(classification());
    let p = pipeline(Arc::new(KeywordEmbedder), generator.clone());

    let a = AskRequest::new("ai");
    let b = AskRequest::new("sleep");
    let (ra, rb) = tokio::join!(p.ask(&a), p.ask(&b));
    assert!(ra.is_ok());
    assert!(rb.is_ok());
    assert_eq!(generator.calls().len(), 4);
}
