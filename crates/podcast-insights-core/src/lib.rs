//! # Podcast Insights Core
//!
//! Shared, transport-free logic for Podcast Insights: the query intent
//! model, temporal and content relevance scoring, result ranking, answer
//! prompt construction, and the query pipeline that ties them together.
//!
//! This crate contains no HTTP client, tokio runtime, or filesystem I/O.
//! Providers (embeddings, vector index, generative model) are reached
//! through the traits in [`provider`] and [`index`]; the application crate
//! supplies the concrete OpenAI- and Chroma-compatible implementations.
//!
//! ## Pipeline
//!
//! ```text
//! query ──▶ classify ──▶ retrieve (2× oversample) ──▶ rank ──▶ synthesize
//!              │              │                        │           │
//!         QueryIntent    Candidate + score      RankedResults   answer text
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`models`] | Intent, metadata, candidate, and result types |
//! | [`temporal`] | Recency score from a publication date |
//! | [`relevance`] | Multi-factor content relevance with per-type weights |
//! | [`intent`] | Generative query classification with fallback |
//! | [`retrieve`] | Embedding + vector index retrieval and scoring |
//! | [`rank`] | Threshold, channel filter, stable sort, truncation |
//! | [`answer`] | Answer prompt construction and synthesis |
//! | [`pipeline`] | End-to-end orchestration |
//! | [`provider`] | Embedding and generative provider traits |
//! | [`index`] | Vector index trait and in-memory implementation |

pub mod answer;
pub mod index;
pub mod intent;
pub mod models;
pub mod pipeline;
pub mod provider;
pub mod rank;
pub mod relevance;
pub mod retrieve;
pub mod temporal;
