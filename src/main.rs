//! # Podcast Insights CLI (`pod`)
//!
//! Ask questions of an indexed podcast transcript collection.
//!
//! ## Usage
//!
//! ```bash
//! pod --config ./config/pod.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `pod ask "<query>"` | Classify, retrieve, rank, and synthesize an answer |
//! | `pod search "<query>"` | Classify, retrieve, and rank only |
//! | `pod classify "<query>"` | Show the structured intent for a question |
//!
//! ## Examples
//!
//! ```bash
//! # Answer with at most three sources, Lex Fridman only
//! pod ask "What are the risks of AGI?" --max-sources 3 --channel "Lex Fridman"
//!
//! # Exclude a channel and show score breakdowns
//! pod search "cold exposure" --channel "Diary of a CEO=false" --explain
//!
//! # Machine-readable output
//! pod ask "best sleep routine" --json
//! ```

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use podcast_insights::app::{parse_channel, QueryArgs};
use podcast_insights::{ask, classify, config, logging, search};

/// Podcast Insights CLI: question answering over podcast transcripts.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file. See `config/pod.example.toml` for a full example.
#[derive(Parser)]
#[command(
    name = "pod",
    about = "Podcast Insights: question answering over podcast transcripts",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/pod.toml")]
    config: PathBuf,

    /// Increase log verbosity (-v info, -vv debug). `RUST_LOG` takes precedence.
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Answer a question from the transcript index.
    ///
    /// Prints the generated answer followed by the cited sources.
    Ask {
        /// The question.
        query: String,

        #[command(flatten)]
        opts: QueryOpts,

        /// Style hint passed to the answer generator (e.g. `concise`, `detailed`).
        #[arg(long)]
        style: Option<String>,

        /// Print the full response as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Retrieve and rank passages without generating an answer.
    Search {
        /// The search query.
        query: String,

        #[command(flatten)]
        opts: QueryOpts,

        /// Print results and intent as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Classify a question and print its intent as JSON.
    Classify {
        /// The question.
        query: String,
    },
}

/// Retrieval overrides shared by `ask` and `search`.
#[derive(Args)]
struct QueryOpts {
    /// Maximum number of sources to keep (default: `retrieval.max_results`).
    #[arg(long)]
    max_sources: Option<usize>,

    /// Minimum relevance score in [0, 1] (default: `retrieval.min_relevance`).
    #[arg(long)]
    min_relevance: Option<f64>,

    /// Channel filter: `NAME` or `NAME=false`. Repeatable; overrides `[channels]`.
    #[arg(long = "channel", value_parser = parse_channel)]
    channels: Vec<(String, bool)>,

    /// Include per-factor score breakdowns.
    #[arg(long)]
    explain: bool,
}

impl QueryOpts {
    fn into_args(self, style: Option<String>) -> QueryArgs {
        QueryArgs {
            max_sources: self.max_sources,
            min_relevance: self.min_relevance,
            channels: self.channels,
            style,
            explain: self.explain,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let cfg = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Ask {
            query,
            opts,
            style,
            json,
        } => {
            ask::run_ask(&cfg, &query, &opts.into_args(style), json).await?;
        }
        Commands::Search { query, opts, json } => {
            search::run_search(&cfg, &query, &opts.into_args(None), json).await?;
        }
        Commands::Classify { query } => {
            classify::run_classify(&cfg, &query).await?;
        }
    }

    Ok(())
}
