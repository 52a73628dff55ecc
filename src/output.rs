//! Text rendering of ranked candidates for `pod ask` and `pod search`.

use podcast_insights_core::models::Candidate;

/// Characters of passage text shown per result.
const SNIPPET_CHARS: usize = 240;

/// Print ranked candidates in the `N. [score] title / channel` layout.
pub fn print_results(results: &[Candidate]) {
    for (i, result) in results.iter().enumerate() {
        println!(
            "{}. [{:.2}] {} / {}",
            i + 1,
            result.relevance_score,
            result.metadata.title,
            result.metadata.channel
        );
        println!("    published: {}", result.metadata.published_at);
        println!("    distance: {:.4}", result.distance);
        if let Some(b) = &result.breakdown {
            println!(
                "    breakdown: semantic={:.2} title={:.2} terms={:.2} source={:.2} temporal={:.2}",
                b.semantic, b.title_match, b.term_score, b.source_score, b.temporal
            );
        }
        println!("    excerpt: \"{}\"", snippet(&result.content));
        println!();
    }
}

/// Flatten `content` onto one line and cut it to [`SNIPPET_CHARS`].
pub fn snippet(content: &str) -> String {
    let flat = content.replace('\n', " ");
    let flat = flat.trim();
    match flat.char_indices().nth(SNIPPET_CHARS) {
        Some((cut, _)) => format!("{}...", &flat[..cut]),
        None => flat.to_string(),
    }
}
