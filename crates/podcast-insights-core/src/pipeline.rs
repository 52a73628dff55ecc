//! End-to-end query pipeline.
//!
//! ```text
//! ask(request)
//!   ├─ process()
//!   │    ├─ classify()   → QueryIntent (fallback on failure)
//!   │    ├─ retrieve()   → 2× candidates, scored
//!   │    └─ rank()       → RankedResults + stats on the intent
//!   └─ answer()          → generated text, skipped when nothing ranked
//! ```
//!
//! Stages run strictly in sequence. Only provider failures (embedding,
//! index, generation) surface as errors.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::answer::AnswerSynthesizer;
use crate::index::VectorIndex;
use crate::intent::{Classification, QueryIntentClassifier};
use crate::models::{Candidate, IntentWithStats, RankedResults};
use crate::provider::{EmbeddingProvider, GenerativeProvider};
use crate::rank::rank;
use crate::relevance::RelevanceScorer;
use crate::retrieve::ResultRetriever;
use crate::temporal::DEFAULT_MAX_AGE_DAYS;

/// Returned by [`QueryPipeline::ask`] when ranking leaves nothing to cite.
pub const NO_RESULTS_MESSAGE: &str =
    "No relevant results found. Try lowering the relevance threshold or rephrasing your query.";

/// Tuning knobs that are fixed for the lifetime of a pipeline.
#[derive(Debug, Clone, Copy)]
pub struct PipelineOptions {
    /// Age window for the temporal relevance factor.
    pub max_age_days: i64,
    /// If true, populate a score breakdown on each candidate.
    pub explain: bool,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            max_age_days: DEFAULT_MAX_AGE_DAYS,
            explain: false,
        }
    }
}

/// A single question from a caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AskRequest {
    pub query: String,
    #[serde(default = "default_max_sources")]
    pub max_sources: usize,
    #[serde(default)]
    pub min_relevance: f64,
    /// Per-channel allow-list; unlisted channels are included.
    #[serde(default)]
    pub channels: HashMap<String, bool>,
    #[serde(default)]
    pub response_style: Option<String>,
}

fn default_max_sources() -> usize {
    5
}

impl AskRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            max_sources: default_max_sources(),
            min_relevance: 0.0,
            channels: HashMap::new(),
            response_style: None,
        }
    }
}

/// Everything produced for one question.
#[derive(Debug, Clone, Serialize)]
pub struct AskResponse {
    pub results: Vec<Candidate>,
    pub intent: IntentWithStats,
    /// Generated answer, or [`NO_RESULTS_MESSAGE`] when `results` is empty.
    pub answer: String,
    /// True when the intent is the deterministic fallback.
    pub intent_fallback: bool,
}

/// Orchestrates classification, retrieval, ranking, and synthesis.
///
/// Holds shared provider handles; one pipeline can serve many concurrent
/// queries.
#[derive(Clone)]
pub struct QueryPipeline {
    classifier: QueryIntentClassifier,
    retriever: ResultRetriever,
    synthesizer: AnswerSynthesizer,
}

impl QueryPipeline {
    pub fn new(
        embedder: Arc<dyn EmbeddingProvider>,
        index: Arc<dyn VectorIndex>,
        generator: Arc<dyn GenerativeProvider>,
        options: PipelineOptions,
    ) -> Self {
        let scorer = RelevanceScorer::new(options.max_age_days);
        Self {
            classifier: QueryIntentClassifier::new(generator.clone()),
            retriever: ResultRetriever::new(embedder, index, scorer).with_explain(options.explain),
            synthesizer: AnswerSynthesizer::new(generator),
        }
    }

    /// Classify, retrieve, and rank.
    ///
    /// Returns the ranked results and the intent augmented with
    /// `results_found`, `avg_relevance`, and `response_style`.
    pub async fn process(
        &self,
        query: &str,
        max_results: usize,
        min_relevance: f64,
        channels: Option<&HashMap<String, bool>>,
        response_style: Option<&str>,
    ) -> Result<(RankedResults, IntentWithStats)> {
        let classification = self.classifier.classify(query).await;
        self.process_classified(query, classification, max_results, min_relevance, channels, response_style)
            .await
            .map(|(ranked, stats, _)| (ranked, stats))
    }

    async fn process_classified(
        &self,
        query: &str,
        classification: Classification,
        max_results: usize,
        min_relevance: f64,
        channels: Option<&HashMap<String, bool>>,
        response_style: Option<&str>,
    ) -> Result<(RankedResults, IntentWithStats, bool)> {
        let fallback = classification.is_fallback();
        let intent = classification.into_intent();

        let candidates = self.retriever.retrieve(query, max_results, &intent).await?;
        let retrieved = candidates.len();
        let ranked = rank(candidates, min_relevance, channels, max_results);

        tracing::info!(
            query_type = intent.query_type.as_str(),
            retrieved,
            kept = ranked.len(),
            avg_relevance = ranked.avg_relevance,
            "ranked results"
        );

        let stats = IntentWithStats {
            intent,
            results_found: ranked.len(),
            avg_relevance: ranked.avg_relevance,
            response_style: response_style.map(str::to_string),
        };
        Ok((ranked, stats, fallback))
    }

    /// Generate an answer for already-ranked results.
    pub async fn answer(
        &self,
        query: &str,
        results: &[Candidate],
        intent: &IntentWithStats,
    ) -> Result<String> {
        self.synthesizer.synthesize(query, results, intent).await
    }

    /// Run the whole pipeline for one request.
    ///
    /// When ranking keeps nothing, the answer is [`NO_RESULTS_MESSAGE`] and
    /// the generative provider is not asked to synthesize.
    pub async fn ask(&self, request: &AskRequest) -> Result<AskResponse> {
        let classification = self.classifier.classify(&request.query).await;
        let channels = (!request.channels.is_empty()).then_some(&request.channels);
        let (ranked, intent, intent_fallback) = self
            .process_classified(
                &request.query,
                classification,
                request.max_sources,
                request.min_relevance,
                channels,
                request.response_style.as_deref(),
            )
            .await?;

        if ranked.is_empty() {
            tracing::warn!(query = %request.query, "no relevant results found");
            return Ok(AskResponse {
                results: Vec::new(),
                intent,
                answer: NO_RESULTS_MESSAGE.to_string(),
                intent_fallback,
            });
        }

        let answer = self.answer(&request.query, &ranked.results, &intent).await?;
        Ok(AskResponse {
            results: ranked.results,
            intent,
            answer,
            intent_fallback,
        })
    }
}
