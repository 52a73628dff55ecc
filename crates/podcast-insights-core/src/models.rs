//! Core data models used throughout Podcast Insights.
//!
//! These types represent the classified query intent, transcript metadata,
//! and scored candidates that flow through the retrieval and ranking
//! pipeline. None of them outlive a single query.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Sentinel title substituted when the index has no title for a passage.
pub const UNKNOWN_TITLE: &str = "Unknown Title";
/// Sentinel date substituted when the index has no publication date.
pub const UNKNOWN_DATE: &str = "Unknown Date";
/// Sentinel channel substituted when the index has no channel.
pub const UNKNOWN_CHANNEL: &str = "Unknown Channel";

// ═══════════════════════════════════════════════════════════════════════
// Query intent
// ═══════════════════════════════════════════════════════════════════════

/// Kind of question being asked. Selects the relevance weight tuple.
///
/// Any string outside the five known kinds is kept verbatim as
/// [`QueryType::Other`] and weighted like [`QueryType::Factual`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum QueryType {
    Factual,
    Opinion,
    Comparison,
    Procedural,
    Conceptual,
    Other(String),
}

impl QueryType {
    pub fn as_str(&self) -> &str {
        match self {
            QueryType::Factual => "factual",
            QueryType::Opinion => "opinion",
            QueryType::Comparison => "comparison",
            QueryType::Procedural => "procedural",
            QueryType::Conceptual => "conceptual",
            QueryType::Other(s) => s,
        }
    }
}

impl From<String> for QueryType {
    fn from(s: String) -> Self {
        match s.trim().to_lowercase().as_str() {
            "factual" => QueryType::Factual,
            "opinion" => QueryType::Opinion,
            "comparison" => QueryType::Comparison,
            "procedural" => QueryType::Procedural,
            "conceptual" => QueryType::Conceptual,
            _ => QueryType::Other(s),
        }
    }
}

impl From<QueryType> for String {
    fn from(t: QueryType) -> Self {
        t.as_str().to_string()
    }
}

/// How recent the supporting material needs to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", try_from = "String")]
pub enum TimeRelevance {
    RecentOnly,
    AnyTime,
    Historical,
}

impl TryFrom<String> for TimeRelevance {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        match s.trim().to_lowercase().replace([' ', '-'], "_").as_str() {
            "recent_only" => Ok(TimeRelevance::RecentOnly),
            "any_time" | "anytime" => Ok(TimeRelevance::AnyTime),
            "historical" => Ok(TimeRelevance::Historical),
            other => Err(format!("unknown time_relevance: {}", other)),
        }
    }
}

/// Expected sophistication of the answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum ComplexityLevel {
    Basic,
    Intermediate,
    Advanced,
}

impl TryFrom<String> for ComplexityLevel {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        match s.trim().to_lowercase().as_str() {
            "basic" => Ok(ComplexityLevel::Basic),
            "intermediate" => Ok(ComplexityLevel::Intermediate),
            "advanced" => Ok(ComplexityLevel::Advanced),
            other => Err(format!("unknown complexity_level: {}", other)),
        }
    }
}

/// Structured classification of a user's question.
///
/// Produced once per query by
/// [`QueryIntentClassifier`](crate::intent::QueryIntentClassifier) and
/// read-only afterwards. Every field except `expected_sources` is required
/// when parsing a classifier response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryIntent {
    pub query_type: QueryType,
    #[serde(deserialize_with = "string_list")]
    pub topics: Vec<String>,
    #[serde(deserialize_with = "string_list")]
    pub context_needs: Vec<String>,
    #[serde(
        default = "default_expected_sources",
        deserialize_with = "string_list"
    )]
    pub expected_sources: Vec<String>,
    pub time_relevance: TimeRelevance,
    #[serde(deserialize_with = "free_text")]
    pub summary_format: String,
    pub complexity_level: ComplexityLevel,
    #[serde(deserialize_with = "string_list")]
    pub key_terms: Vec<String>,
}

fn default_expected_sources() -> Vec<String> {
    vec!["any".to_string()]
}

impl QueryIntent {
    /// Deterministic intent used whenever classification fails.
    ///
    /// The whole lower-cased query becomes the single topic and its
    /// whitespace-separated tokens become the key terms.
    pub fn fallback(query: &str) -> Self {
        let lowered = query.to_lowercase();
        Self {
            query_type: QueryType::Factual,
            topics: vec![lowered.clone()],
            context_needs: vec!["general information".to_string()],
            expected_sources: default_expected_sources(),
            time_relevance: TimeRelevance::AnyTime,
            summary_format: "general".to_string(),
            complexity_level: ComplexityLevel::Intermediate,
            key_terms: lowered.split_whitespace().map(str::to_string).collect(),
        }
    }
}

/// A [`QueryIntent`] augmented with statistics from the ranking stage.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IntentWithStats {
    #[serde(flatten)]
    pub intent: QueryIntent,
    pub results_found: usize,
    pub avg_relevance: f64,
    pub response_style: Option<String>,
}

/// Accepts a JSON array of scalars (or a lone string) as a list of strings.
///
/// Non-string elements are rendered with their JSON representation.
/// Anything else (objects, numbers, null) is rejected.
fn string_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Array(items) => Ok(items.into_iter().map(value_to_text).collect()),
        Value::String(s) => Ok(vec![s]),
        other => Err(serde::de::Error::custom(format!(
            "expected a list of strings, found {}",
            other
        ))),
    }
}

fn free_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(value_to_text(Value::deserialize(deserializer)?))
}

fn value_to_text(value: Value) -> String {
    match value {
        Value::String(s) => s,
        other => other.to_string(),
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Transcripts and candidates
// ═══════════════════════════════════════════════════════════════════════

/// Typed view of the metadata stored alongside a transcript passage.
///
/// Built with [`TranscriptMetadata::from_raw`], which substitutes the
/// `Unknown *` sentinels so scoring never sees absent fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TranscriptMetadata {
    pub channel: String,
    pub title: String,
    pub published_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
}

impl Default for TranscriptMetadata {
    fn default() -> Self {
        Self {
            channel: UNKNOWN_CHANNEL.to_string(),
            title: UNKNOWN_TITLE.to_string(),
            published_at: UNKNOWN_DATE.to_string(),
            filename: None,
            date: None,
        }
    }
}

impl TranscriptMetadata {
    /// Build metadata from the raw map returned by a vector index.
    ///
    /// Absent, null, or non-object metadata falls back to the sentinels;
    /// non-string scalars are stringified.
    pub fn from_raw(raw: Option<&Value>) -> Self {
        let field = |key: &str| -> Option<String> {
            match raw?.get(key)? {
                Value::Null => None,
                Value::String(s) => Some(s.clone()),
                other => Some(other.to_string()),
            }
        };

        Self {
            channel: field("channel").unwrap_or_else(|| UNKNOWN_CHANNEL.to_string()),
            title: field("title").unwrap_or_else(|| UNKNOWN_TITLE.to_string()),
            published_at: field("published_at").unwrap_or_else(|| UNKNOWN_DATE.to_string()),
            filename: field("filename"),
            date: field("date"),
        }
    }
}

/// Coerce a stored document into plain text.
///
/// Strings pass through, objects contribute their `text` field, null is
/// empty, and everything else uses its JSON representation.
pub fn coerce_content(document: &Value) -> String {
    match document {
        Value::String(s) => s.clone(),
        Value::Object(map) => match map.get("text") {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Null) | None => String::new(),
            Some(other) => other.to_string(),
        },
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Weight tuple applied to the five relevance factors.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Weights {
    pub semantic: f64,
    pub title: f64,
    pub term: f64,
    pub source: f64,
    pub temporal: f64,
}

/// Per-factor scoring breakdown for a candidate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreBreakdown {
    /// Final clamped score.
    pub score: f64,
    pub semantic: f64,
    pub title_match: f64,
    pub term_score: f64,
    pub source_score: f64,
    pub temporal: f64,
    /// The weight tuple selected by the query type.
    pub weights: Weights,
}

/// One retrieved transcript passage with its computed relevance.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Candidate {
    pub content: String,
    pub metadata: TranscriptMetadata,
    /// Embedding-space distance reported by the index. Not used in scoring.
    pub distance: f64,
    /// Relevance score in `[0.0, 1.0]`.
    pub relevance_score: f64,
    /// Scoring breakdown (populated when explain is enabled).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub breakdown: Option<ScoreBreakdown>,
}

/// Filtered, sorted, truncated candidates plus their mean score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedResults {
    pub results: Vec<Candidate>,
    pub avg_relevance: f64,
}

impl RankedResults {
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }
}
