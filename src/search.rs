//! `pod search`: classify, retrieve, and rank without answer synthesis.

use anyhow::Result;
use serde_json::json;

use crate::app::{build_pipeline, build_request, QueryArgs};
use crate::config::Config;
use crate::output::print_results;

pub async fn run_search(config: &Config, query: &str, args: &QueryArgs, json: bool) -> Result<()> {
    let pipeline = build_pipeline(config, args.explain)?;
    let request = build_request(config, query, args)?;
    let channels = (!request.channels.is_empty()).then_some(&request.channels);

    let (ranked, intent) = pipeline
        .process(
            &request.query,
            request.max_sources,
            request.min_relevance,
            channels,
            request.response_style.as_deref(),
        )
        .await?;

    if json {
        let out = json!({
            "results": ranked.results,
            "intent": intent,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!(
        "query_type: {}  results: {}  avg_relevance: {:.2}",
        intent.intent.query_type.as_str(),
        intent.results_found,
        intent.avg_relevance
    );
    println!();

    if ranked.is_empty() {
        println!("No results.");
        return Ok(());
    }

    print_results(&ranked.results);
    Ok(())
}
