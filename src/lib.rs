//! # Podcast Insights
//!
//! Question answering over a vector index of podcast transcripts.
//!
//! The retrieval and ranking engine lives in [`podcast_insights_core`];
//! this crate supplies the concrete providers (OpenAI-compatible HTTP
//! clients, a Chroma index client), configuration, and the `pod` CLI.
//!
//! ## Architecture
//!
//! ```text
//!              ┌──────────────┐
//!  question ──▶│  classify    │── GenerativeProvider (OpenAI chat)
//!              └──────┬───────┘
//!                     ▼
//!              ┌──────────────┐
//!              │  retrieve    │── EmbeddingProvider (OpenAI embeddings)
//!              │  + score     │── VectorIndex (Chroma)
//!              └──────┬───────┘
//!                     ▼
//!              ┌──────────────┐
//!              │  rank        │  threshold, channels, top-N
//!              └──────┬───────┘
//!                     ▼
//!              ┌──────────────┐
//!              │  synthesize  │── GenerativeProvider
//!              └──────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! pod classify "What does Huberman say about caffeine?"
//! pod search "sleep and memory" --max-sources 3
//! pod ask "How do guests think about AI safety?" --channel "Lex Fridman"
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`app`] | Pipeline construction and CLI overrides |
//! | [`embedding`] | Embedding providers |
//! | [`generation`] | Chat completion providers |
//! | [`chroma`] | Chroma vector index client |
//! | [`http`] | Shared retrying JSON client |
//! | [`ask`] | `pod ask` |
//! | [`search`] | `pod search` |
//! | [`classify`] | `pod classify` |
//! | [`output`] | Result rendering shared by `ask` and `search` |
//! | [`logging`] | Tracing subscriber setup |

pub mod app;
pub mod ask;
pub mod chroma;
pub mod classify;
pub mod config;
pub mod embedding;
pub mod generation;
pub mod http;
pub mod logging;
pub mod output;
pub mod search;
