//! `pod ask`: the full question-answering pipeline.

use anyhow::Result;

use crate::app::{build_pipeline, build_request, QueryArgs};
use crate::config::Config;
use crate::output::print_results;

pub async fn run_ask(config: &Config, query: &str, args: &QueryArgs, json: bool) -> Result<()> {
    let pipeline = build_pipeline(config, args.explain)?;
    let request = build_request(config, query, args)?;
    let response = pipeline.ask(&request).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&response)?);
        return Ok(());
    }

    println!("{}", response.answer.trim());

    if response.results.is_empty() {
        return Ok(());
    }

    println!();
    println!("--- Sources ({}) ---", response.results.len());
    print_results(&response.results);
    if response.intent_fallback {
        println!("(query classification unavailable; used keyword fallback)");
    }
    Ok(())
}
