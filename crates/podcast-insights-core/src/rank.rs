//! Result filtering and ranking.
//!
//! 1. Drop candidates below `min_relevance`.
//! 2. Drop candidates whose channel is explicitly disabled in the channel
//!    map. Channels missing from the map are kept.
//! 3. Stable sort by relevance, descending (ties keep retrieval order).
//! 4. Truncate to `max_results`.
//! 5. Average the surviving scores (`0.0` when empty).
//!
//! Ranking an already-ranked list with the same parameters returns it
//! unchanged.

use std::cmp::Ordering;
use std::collections::HashMap;

use crate::models::{Candidate, RankedResults};

/// Whether `channel` passes the allow-list. No map, an empty map, or an
/// unlisted channel all allow.
pub fn channel_allowed(channel: &str, channels: Option<&HashMap<String, bool>>) -> bool {
    channels
        .and_then(|map| map.get(channel).copied())
        .unwrap_or(true)
}

/// Filter, sort, and truncate `candidates`.
pub fn rank(
    candidates: Vec<Candidate>,
    min_relevance: f64,
    channels: Option<&HashMap<String, bool>>,
    max_results: usize,
) -> RankedResults {
    let mut kept: Vec<Candidate> = candidates
        .into_iter()
        .filter(|c| c.relevance_score >= min_relevance)
        .filter(|c| channel_allowed(&c.metadata.channel, channels))
        .collect();

    kept.sort_by(|a, b| {
        b.relevance_score
            .partial_cmp(&a.relevance_score)
            .unwrap_or(Ordering::Equal)
    });
    kept.truncate(max_results);

    let avg_relevance = mean_relevance(&kept);
    RankedResults {
        results: kept,
        avg_relevance,
    }
}

/// Mean relevance score, or `0.0` for an empty slice.
pub fn mean_relevance(results: &[Candidate]) -> f64 {
    if results.is_empty() {
        return 0.0;
    }
    results.iter().map(|c| c.relevance_score).sum::<f64>() / results.len() as f64
}
