//! Query intent classification.
//!
//! One generative request per query asks for the eight [`QueryIntent`]
//! fields as a JSON object. Anything short of a complete, well-typed
//! object (provider error, prose, a missing field) degrades to
//! [`QueryIntent::fallback`]; classification never fails a query.

use std::sync::Arc;

use anyhow::{Context, Result};

use crate::models::QueryIntent;
use crate::provider::GenerativeProvider;

/// System prompt for classification requests.
pub const CLASSIFIER_SYSTEM_PROMPT: &str =
    "You are an expert at analyzing queries about podcast content. Respond only with JSON.";

/// Build the user prompt asking for a structured classification of `query`.
pub fn classification_prompt(query: &str) -> String {
    format!(
        "Analyze this transcript-related query and classify it.\n\
         Query: {query}\n\n\
         Respond with a single JSON object containing:\n\
         1. query_type: one of [factual, opinion, comparison, procedural, conceptual]\n\
         2. topics: list of main topics and subtopics\n\
         3. context_needs: specific types of information needed\n\
         4. expected_sources: relevant content or creators\n\
         5. time_relevance: one of [recent_only, any_time, historical]\n\
         6. summary_format: suggested response structure\n\
         7. complexity_level: one of [basic, intermediate, advanced]\n\
         8. key_terms: important terms or concepts to focus on"
    )
}

/// Outcome of classifying a query.
#[derive(Debug, Clone, PartialEq)]
pub enum Classification {
    /// The provider returned a complete intent.
    Parsed(QueryIntent),
    /// Classification failed; `intent` is the deterministic fallback.
    Fallback { intent: QueryIntent, reason: String },
}

impl Classification {
    pub fn intent(&self) -> &QueryIntent {
        match self {
            Classification::Parsed(intent) => intent,
            Classification::Fallback { intent, .. } => intent,
        }
    }

    pub fn into_intent(self) -> QueryIntent {
        match self {
            Classification::Parsed(intent) => intent,
            Classification::Fallback { intent, .. } => intent,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Classification::Fallback { .. })
    }
}

/// Parse a classifier response into a [`QueryIntent`].
///
/// Tolerates a surrounding markdown code fence (```` ```json ... ``` ````).
pub fn parse_intent(raw: &str) -> Result<QueryIntent> {
    let body = strip_code_fence(raw);
    serde_json::from_str(body).context("classifier response is not a valid intent object")
}

fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string (e.g. `json`). It may be followed by a newline
    // or, on a one-line fence, directly by the payload.
    let rest = rest.trim_start_matches(|c: char| c.is_ascii_alphanumeric());
    let rest = rest.trim();
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

/// Classifies queries through a [`GenerativeProvider`].
#[derive(Clone)]
pub struct QueryIntentClassifier {
    generator: Arc<dyn GenerativeProvider>,
}

impl QueryIntentClassifier {
    pub fn new(generator: Arc<dyn GenerativeProvider>) -> Self {
        Self { generator }
    }

    /// Classify `query`, falling back to [`QueryIntent::fallback`] on any failure.
    pub async fn classify(&self, query: &str) -> Classification {
        let result = self
            .generator
            .complete(CLASSIFIER_SYSTEM_PROMPT, &classification_prompt(query))
            .await
            .context("classification request failed")
            .and_then(|raw| parse_intent(&raw));

        match result {
            Ok(intent) => {
                tracing::debug!(query_type = intent.query_type.as_str(), "query classified");
                Classification::Parsed(intent)
            }
            Err(e) => {
                let reason = format!("{:#}", e);
                tracing::warn!(error = %reason, "query classification failed, using fallback intent");
                Classification::Fallback {
                    intent: QueryIntent::fallback(query),
                    reason,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{QueryType, TimeRelevance};
    use anyhow::bail;
    use async_trait::async_trait;

    struct Scripted(Result<String, String>);

    #[async_trait]
    impl GenerativeProvider for Scripted {
        fn model_name(&self) -> &str {
            "scripted"
        }

        async fn complete(&self, _system: &str, _user: &str) -> Result<String> {
            match &self.0 {
                Ok(s) => Ok(s.clone()),
                Err(e) => bail!("{}", e),
            }
        }
    }

    fn classifier(reply: Result<&str, &str>) -> QueryIntentClassifier {
        let reply = reply.map(str::to_string).map_err(str::to_string);
        QueryIntentClassifier::new(Arc::new(Scripted(reply)))
    }

    const VALID: &str = r#"{
        "query_type": "comparison",
        "topics": ["sleep", "caffeine"],
        "context_needs": ["studies"],
        "expected_sources": ["Huberman Lab"],
        "time_relevance": "any_time",
        "summary_format": "table",
        "complexity_level": "intermediate",
        "key_terms": ["adenosine"]
    }"#;

    #[test]
    fn test_prompt_mentions_query_and_fields() {
        let p = classification_prompt("Is coffee bad?");
        assert!(p.contains("Is coffee bad?"));
        for field in ["query_type", "topics", "expected_sources", "key_terms"] {
            assert!(p.contains(field));
        }
    }

    #[test]
    fn test_parse_plain_json() {
        let intent = parse_intent(VALID).unwrap();
        assert_eq!(intent.query_type, QueryType::Comparison);
    }

    #[test]
    fn test_parse_fenced_json() {
        let fenced = format!("```json\n{}\n```", VALID);
        let intent = parse_intent(&fenced).unwrap();
        assert_eq!(intent.key_terms, vec!["adenosine"]);

        let bare_fence = format!("```\n{}\n```", VALID);
        assert!(parse_intent(&bare_fence).is_ok());

        let one_line = format!("```json {}```", VALID);
        assert_eq!(parse_intent(&one_line).unwrap(), intent);

        let one_line_bare = format!("```{}```", VALID);
        assert!(parse_intent(&one_line_bare).is_ok());
    }

    #[test]
    fn test_parse_rejects_prose() {
        assert!(parse_intent("This is a factual question about sleep.").is_err());
    }

    #[tokio::test]
    async fn test_classify_parsed() {
        let c = classifier(Ok(VALID)).classify("caffeine vs sleep").await;
        assert!(!c.is_fallback());
        assert_eq!(c.intent().topics, vec!["sleep", "caffeine"]);
        assert_eq!(c.intent().time_relevance, TimeRelevance::AnyTime);
    }

    #[tokio::test]
    async fn test_classify_provider_error_falls_back() {
        let c = classifier(Err("rate limited")).classify("What is AI Consciousness").await;
        assert!(c.is_fallback());
        if let Classification::Fallback { reason, .. } = &c {
            assert!(reason.contains("rate limited"));
        }
        let intent = c.into_intent();
        assert_eq!(intent.query_type, QueryType::Factual);
        assert_eq!(intent.key_terms, vec!["what", "is", "ai", "consciousness"]);
        assert_eq!(intent.topics, vec!["what is ai consciousness"]);
    }

    #[tokio::test]
    async fn test_classify_missing_field_falls_back() {
        let c = classifier(Ok(r#"{"query_type": "opinion"}"#))
            .classify("hello")
            .await;
        assert!(c.is_fallback());
        assert_eq!(c.intent(), &QueryIntent::fallback("hello"));
    }
}
