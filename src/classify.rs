//! `pod classify`: show how a question would be interpreted.

use anyhow::Result;
use serde_json::json;

use podcast_insights_core::intent::QueryIntentClassifier;

use crate::config::Config;
use crate::generation::create_generator;

/// Print the intent as JSON together with whether it is the fallback.
///
/// Only the generative provider is constructed; no embedding or index
/// access happens.
pub async fn run_classify(config: &Config, query: &str) -> Result<()> {
    let classifier = QueryIntentClassifier::new(create_generator(&config.generation)?);
    let classification = classifier.classify(query).await;

    let out = json!({
        "intent": classification.intent(),
        "fallback": classification.is_fallback(),
    });
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}
