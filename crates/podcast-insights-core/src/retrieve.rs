//! Candidate retrieval: embed the query, fetch neighbours, score them.
//!
//! The index is asked for [`OVERSAMPLE_FACTOR`]× the requested result count
//! so that relevance-threshold and channel filtering still leave enough
//! candidates. Provider and index errors are fatal to the query and are
//! returned to the caller; a single candidate that fails to score is kept
//! with a score of `0.0`.

use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Utc;

use crate::index::VectorIndex;
use crate::models::{coerce_content, Candidate, QueryIntent, TranscriptMetadata};
use crate::provider::EmbeddingProvider;
use crate::relevance::{Relevance, RelevanceScorer};

/// How many candidates to fetch per requested result.
pub const OVERSAMPLE_FACTOR: usize = 2;

/// Retrieves and scores transcript passages for a query.
#[derive(Clone)]
pub struct ResultRetriever {
    embedder: Arc<dyn EmbeddingProvider>,
    index: Arc<dyn VectorIndex>,
    scorer: RelevanceScorer,
    explain: bool,
}

impl ResultRetriever {
    pub fn new(
        embedder: Arc<dyn EmbeddingProvider>,
        index: Arc<dyn VectorIndex>,
        scorer: RelevanceScorer,
    ) -> Self {
        Self {
            embedder,
            index,
            scorer,
            explain: false,
        }
    }

    /// Attach a [`ScoreBreakdown`](crate::models::ScoreBreakdown) to every candidate.
    pub fn with_explain(mut self, explain: bool) -> Self {
        self.explain = explain;
        self
    }

    /// Fetch up to `2 × max_results` candidates in index order, each scored
    /// against `intent`.
    pub async fn retrieve(
        &self,
        query: &str,
        max_results: usize,
        intent: &QueryIntent,
    ) -> Result<Vec<Candidate>> {
        let vector = self
            .embedder
            .embed(query)
            .await
            .with_context(|| format!("Failed to embed query with {}", self.embedder.model_name()))?;

        let k = max_results.saturating_mul(OVERSAMPLE_FACTOR);
        let response = self
            .index
            .query(&vector, k)
            .await
            .context("Vector index query failed")?;
        response.validate()?;

        tracing::info!(requested = k, returned = response.len(), "retrieved candidates");

        let now = Utc::now();
        let candidates = response
            .documents
            .into_iter()
            .zip(response.metadatas)
            .zip(response.distances)
            .map(|((document, raw_meta), distance)| {
                let metadata = TranscriptMetadata::from_raw(raw_meta.as_ref());
                let content = coerce_content(&document);
                let relevance = self.scorer.score_at(&content, &metadata, intent, now);

                if let Relevance::Fallback { reason } = &relevance {
                    tracing::warn!(title = %metadata.title, %reason, "relevance scoring failed, scoring 0.0");
                }
                tracing::debug!(
                    title = %metadata.title,
                    channel = %metadata.channel,
                    distance,
                    score = relevance.score(),
                    "scored candidate"
                );

                let relevance_score = relevance.score();
                Candidate {
                    content,
                    metadata,
                    distance,
                    relevance_score,
                    breakdown: if self.explain {
                        relevance.into_breakdown()
                    } else {
                        None
                    },
                }
            })
            .collect();

        Ok(candidates)
    }
}
