//! Generative provider implementations.
//!
//! Implements [`GenerativeProvider`] for:
//! - **[`DisabledGenerator`]**: returns errors; used when generation is not configured.
//! - **[`OpenAIChat`]**: calls the OpenAI chat completions API with retry and backoff.
//!
//! The same provider serves both classification (JSON) and answer
//! synthesis (freeform) requests; it returns the first choice's message
//! content without interpretation.

use anyhow::{bail, Result};
use async_trait::async_trait;
use std::sync::Arc;

use podcast_insights_core::provider::GenerativeProvider;

use crate::config::GenerationConfig;
use crate::http;

/// Create the generative provider named in the config.
pub fn create_generator(config: &GenerationConfig) -> Result<Arc<dyn GenerativeProvider>> {
    match config.provider.as_str() {
        "disabled" => Ok(Arc::new(DisabledGenerator)),
        "openai" => Ok(Arc::new(OpenAIChat::new(config)?)),
        other => bail!("Unknown generation provider: {}", other),
    }
}

/// A no-op generative provider that always returns errors.
///
/// With generation disabled, classification degrades to the fallback
/// intent and answer synthesis fails.
pub struct DisabledGenerator;

#[async_trait]
impl GenerativeProvider for DisabledGenerator {
    fn model_name(&self) -> &str {
        "disabled"
    }

    async fn complete(&self, _system_prompt: &str, _user_prompt: &str) -> Result<String> {
        bail!("Generation provider is disabled. Set [generation] provider in config.")
    }
}

/// Chat completions client for OpenAI-compatible endpoints.
///
/// Calls `POST {url}/v1/chat/completions` with a system and a user message.
pub struct OpenAIChat {
    model: String,
    endpoint: String,
    api_key: Option<String>,
    max_retries: u32,
    client: reqwest::Client,
}

impl OpenAIChat {
    pub fn new(config: &GenerationConfig) -> Result<Self> {
        let base = config.url.as_deref().unwrap_or(http::OPENAI_BASE_URL);
        Ok(Self {
            model: config.model.clone(),
            endpoint: http::join_url(base, "v1/chat/completions"),
            api_key: http::api_key(config.url.as_deref())?,
            max_retries: config.max_retries,
            client: http::client(config.timeout_secs)?,
        })
    }
}

#[async_trait]
impl GenerativeProvider for OpenAIChat {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn complete(&self, system_prompt: &str, user_prompt: &str) -> Result<String> {
        let body = serde_json::json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": system_prompt},
                {"role": "user", "content": user_prompt},
            ],
        });

        let json = http::post_json_with_retry(
            &self.client,
            &self.endpoint,
            self.api_key.as_deref(),
            &body,
            self.max_retries,
            "OpenAI",
        )
        .await?;

        parse_chat_response(&json)
    }
}

/// Extract `choices[0].message.content` from a chat completions response.
fn parse_chat_response(json: &serde_json::Value) -> Result<String> {
    json.get("choices")
        .and_then(|c| c.as_array())
        .and_then(|c| c.first())
        .and_then(|choice| choice.get("message"))
        .and_then(|m| m.get("content"))
        .and_then(|c| c.as_str())
        .map(str::to_string)
        .ok_or_else(|| anyhow::anyhow!("Invalid chat response: missing choices[0].message.content"))
}
