//! Answer synthesis from ranked transcript passages.
//!
//! Each result is rendered as a numbered source block (title, channel,
//! date, relevance, excerpt) and the generative provider is asked for a
//! direct answer, supporting evidence, and caveats. The generated text is
//! returned verbatim.

use std::sync::Arc;

use anyhow::{Context, Result};

use crate::models::{Candidate, IntentWithStats};
use crate::provider::GenerativeProvider;

/// Returned without calling the provider when there is nothing to cite.
pub const NO_RESULTS_ANSWER: &str = "No relevant results found.";

/// Maximum characters of passage content included per source.
pub const EXCERPT_CHARS: usize = 500;

const TRUNCATION_MARKER: &str = "... *(truncated)*";

/// System prompt for synthesis requests.
pub const SYNTHESIS_SYSTEM_PROMPT: &str = "You are an expert in summarizing and analyzing content.";

/// First [`EXCERPT_CHARS`] characters of `content`, marked when cut.
pub fn excerpt(content: &str) -> String {
    match content.char_indices().nth(EXCERPT_CHARS) {
        Some((byte_pos, _)) => format!("{}{}", &content[..byte_pos], TRUNCATION_MARKER),
        None => content.to_string(),
    }
}

/// Render one numbered source block.
fn source_block(position: usize, candidate: &Candidate) -> String {
    let meta = &candidate.metadata;
    format!(
        "**Source {}:**\n\
         **Title:** {}\n\
         **Channel:** {}\n\
         **Date:** {}\n\
         **Relevance:** {:.2}\n\n\
         **Content Preview:**\n\
         {}\n\n\
         ---\n",
        position,
        meta.title,
        meta.channel,
        meta.published_at,
        candidate.relevance_score,
        excerpt(&candidate.content)
    )
}

/// Build the user prompt for answering `query` from `results`.
pub fn synthesis_prompt(query: &str, results: &[Candidate], response_style: Option<&str>) -> String {
    let details = results
        .iter()
        .enumerate()
        .map(|(i, c)| source_block(i + 1, c))
        .collect::<Vec<_>>()
        .join("\n");

    let mut prompt = format!(
        "You are analyzing transcript results to answer a query.\n\n\
         ### Question:\n{}\n\n\
         ### Detailed Results:\n{}\n\
         Provide:\n\
         1. A direct, concise answer to the query.\n\
         2. Supporting evidence from the results.\n\
         3. Relevant context or caveats for the user.\n",
        query, details
    );

    if let Some(style) = response_style.map(str::trim).filter(|s| !s.is_empty()) {
        prompt.push_str(&format!("\nWrite the response in a {} style.\n", style));
    }

    prompt
}

/// Generates a natural-language answer through a [`GenerativeProvider`].
#[derive(Clone)]
pub struct AnswerSynthesizer {
    generator: Arc<dyn GenerativeProvider>,
}

impl AnswerSynthesizer {
    pub fn new(generator: Arc<dyn GenerativeProvider>) -> Self {
        Self { generator }
    }

    /// Answer `query` from `results`.
    ///
    /// Returns [`NO_RESULTS_ANSWER`] for an empty slice without a provider
    /// call. Provider failures are returned as errors.
    pub async fn synthesize(
        &self,
        query: &str,
        results: &[Candidate],
        intent: &IntentWithStats,
    ) -> Result<String> {
        if results.is_empty() {
            return Ok(NO_RESULTS_ANSWER.to_string());
        }

        let prompt = synthesis_prompt(query, results, intent.response_style.as_deref());
        tracing::info!(sources = results.len(), model = self.generator.model_name(), "synthesizing answer");

        self.generator
            .complete(SYNTHESIS_SYSTEM_PROMPT, &prompt)
            .await
            .context("Answer generation failed")
    }
}
