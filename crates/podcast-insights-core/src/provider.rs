//! Provider traits for embeddings and text generation.
//!
//! The pipeline only depends on these traits. Concrete implementations
//! (OpenAI-compatible HTTP clients, disabled stubs) live in the
//! `podcast-insights` app crate; tests use scripted in-process mocks.
//!
//! Implementations are long-lived and shared across queries, so they must
//! be `Send + Sync`.

use anyhow::Result;
use async_trait::async_trait;

/// Turns text into an embedding vector.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Returns the model identifier (e.g. `"text-embedding-ada-002"`).
    fn model_name(&self) -> &str;

    /// Embed a single text.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;
}

/// Produces text from a system prompt and a user prompt.
///
/// Used both for structured (JSON) classification and freeform answer
/// synthesis.
#[async_trait]
pub trait GenerativeProvider: Send + Sync {
    /// Returns the model identifier (e.g. `"gpt-4-turbo-preview"`).
    fn model_name(&self) -> &str;

    /// Run one completion and return the generated text verbatim.
    async fn complete(&self, system_prompt: &str, user_prompt: &str) -> Result<String>;
}
