//! Multi-factor content relevance scoring.
//!
//! # Scoring Formula
//!
//! Each candidate is scored from five factors, combined with a weight
//! tuple chosen by the query type:
//!
//! | Factor | Value |
//! |--------|-------|
//! | semantic | constant `0.5` |
//! | title | fraction of intent topics found in the title |
//! | term | `0.1` per key term found in the text, capped at `0.8` |
//! | source | `0.2` if any expected source appears in the channel name |
//! | temporal | [`temporal_score_at`](crate::temporal::temporal_score_at) |
//!
//! | Query type | semantic | title | term | source | temporal |
//! |------------|----------|-------|------|--------|----------|
//! | factual | 0.3 | 0.2 | 0.3 | 0.1 | 0.1 |
//! | opinion | 0.2 | 0.2 | 0.2 | 0.3 | 0.1 |
//! | comparison | 0.3 | 0.2 | 0.2 | 0.2 | 0.1 |
//! | procedural | 0.2 | 0.3 | 0.3 | 0.1 | 0.1 |
//! | conceptual | 0.3 | 0.2 | 0.2 | 0.2 | 0.1 |
//!
//! Unrecognized query types use the factual tuple. The weighted sum is
//! clamped to `[0.0, 1.0]`. All matching is case-insensitive substring
//! matching.

use chrono::{DateTime, Utc};

use crate::models::{QueryIntent, QueryType, ScoreBreakdown, TranscriptMetadata, Weights};
use crate::temporal::{temporal_score_at, DEFAULT_MAX_AGE_DAYS};

/// Fixed semantic contribution. The index distance is not folded in.
pub const SEMANTIC_BASELINE: f64 = 0.5;
/// Score added per matched key term.
pub const TERM_MATCH_STEP: f64 = 0.1;
/// Upper bound on the key-term factor.
pub const TERM_SCORE_CAP: f64 = 0.8;
/// Source factor when an expected source matches the channel.
pub const SOURCE_MATCH_SCORE: f64 = 0.2;

impl Weights {
    pub const FACTUAL: Weights = Weights::new(0.3, 0.2, 0.3, 0.1, 0.1);
    pub const OPINION: Weights = Weights::new(0.2, 0.2, 0.2, 0.3, 0.1);
    pub const COMPARISON: Weights = Weights::new(0.3, 0.2, 0.2, 0.2, 0.1);
    pub const PROCEDURAL: Weights = Weights::new(0.2, 0.3, 0.3, 0.1, 0.1);
    pub const CONCEPTUAL: Weights = Weights::new(0.3, 0.2, 0.2, 0.2, 0.1);

    const fn new(semantic: f64, title: f64, term: f64, source: f64, temporal: f64) -> Self {
        Self {
            semantic,
            title,
            term,
            source,
            temporal,
        }
    }

    /// Weight tuple for a query type.
    pub fn for_query_type(query_type: &QueryType) -> Self {
        match query_type {
            QueryType::Factual => Self::FACTUAL,
            QueryType::Opinion => Self::OPINION,
            QueryType::Comparison => Self::COMPARISON,
            QueryType::Procedural => Self::PROCEDURAL,
            QueryType::Conceptual => Self::CONCEPTUAL,
            QueryType::Other(_) => Self::FACTUAL,
        }
    }

    pub fn total(&self) -> f64 {
        self.semantic + self.title + self.term + self.source + self.temporal
    }
}

/// Outcome of scoring one candidate.
///
/// A failed computation is an explicit [`Relevance::Fallback`] worth `0.0`
/// rather than an error, so one bad passage cannot abort a query.
#[derive(Debug, Clone, PartialEq)]
pub enum Relevance {
    Scored(ScoreBreakdown),
    Fallback { reason: String },
}

impl Relevance {
    /// The score to rank by: the clamped score, or `0.0` for a fallback.
    pub fn score(&self) -> f64 {
        match self {
            Relevance::Scored(b) => b.score,
            Relevance::Fallback { .. } => 0.0,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Relevance::Fallback { .. })
    }

    pub fn into_breakdown(self) -> Option<ScoreBreakdown> {
        match self {
            Relevance::Scored(b) => Some(b),
            Relevance::Fallback { .. } => None,
        }
    }
}

/// Scores transcript passages against a classified query.
#[derive(Debug, Clone, Copy)]
pub struct RelevanceScorer {
    /// Age window passed to the temporal factor.
    pub max_age_days: i64,
}

impl Default for RelevanceScorer {
    fn default() -> Self {
        Self {
            max_age_days: DEFAULT_MAX_AGE_DAYS,
        }
    }
}

impl RelevanceScorer {
    pub fn new(max_age_days: i64) -> Self {
        Self { max_age_days }
    }

    /// Score `text` relative to the current time.
    pub fn score(&self, text: &str, metadata: &TranscriptMetadata, intent: &QueryIntent) -> Relevance {
        self.score_at(text, metadata, intent, Utc::now())
    }

    /// Score `text` with the temporal factor evaluated at `now`.
    pub fn score_at(
        &self,
        text: &str,
        metadata: &TranscriptMetadata,
        intent: &QueryIntent,
        now: DateTime<Utc>,
    ) -> Relevance {
        let title_match = title_match(&metadata.title, &intent.topics);
        let term_score = term_score(text, &intent.key_terms);
        let source_score = source_score(&metadata.channel, &intent.expected_sources);
        let temporal = temporal_score_at(Some(&metadata.published_at), self.max_age_days, now);
        let weights = Weights::for_query_type(&intent.query_type);

        combine(weights, title_match, term_score, source_score, temporal)
    }
}

/// Weighted sum of the five factors, clamped to `[0.0, 1.0]`.
///
/// A non-finite sum (a NaN or infinite factor) yields
/// [`Relevance::Fallback`] instead of a score.
pub fn combine(
    weights: Weights,
    title_match: f64,
    term_score: f64,
    source_score: f64,
    temporal: f64,
) -> Relevance {
    let raw = SEMANTIC_BASELINE * weights.semantic
        + title_match * weights.title
        + term_score * weights.term
        + source_score * weights.source
        + temporal * weights.temporal;

    if !raw.is_finite() {
        return Relevance::Fallback {
            reason: format!(
                "non-finite relevance (title={}, term={}, source={}, temporal={})",
                title_match, term_score, source_score, temporal
            ),
        };
    }

    Relevance::Scored(ScoreBreakdown {
        score: raw.clamp(0.0, 1.0),
        semantic: SEMANTIC_BASELINE,
        title_match,
        term_score,
        source_score,
        temporal,
        weights,
    })
}

/// Fraction of `topics` that occur in `title`.
pub fn title_match(title: &str, topics: &[String]) -> f64 {
    let title = title.to_lowercase();
    let hits = topics
        .iter()
        .filter(|t| title.contains(&t.to_lowercase()))
        .count();
    hits as f64 / topics.len().max(1) as f64
}

/// Key-term factor: `0.1` per term present in `text`, capped at `0.8`.
pub fn term_score(text: &str, key_terms: &[String]) -> f64 {
    let text = text.to_lowercase();
    let hits = key_terms
        .iter()
        .filter(|k| text.contains(&k.to_lowercase()))
        .count();
    (hits as f64 * TERM_MATCH_STEP).min(TERM_SCORE_CAP)
}

/// Source factor: [`SOURCE_MATCH_SCORE`] if any expected source is part of
/// the channel name.
pub fn source_score(channel: &str, expected_sources: &[String]) -> f64 {
    let channel = channel.to_lowercase();
    if expected_sources
        .iter()
        .any(|s| channel.contains(&s.to_lowercase()))
    {
        SOURCE_MATCH_SCORE
    } else {
        0.0
    }
}
