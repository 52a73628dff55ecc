//! In-memory [`VectorIndex`] implementation for testing and small corpora.
//!
//! Entries live in a `Vec` behind `std::sync::RwLock`. Queries are
//! brute-force cosine distance (`1 - cosine similarity`) over every stored
//! vector, ties keeping insertion order.

use std::sync::RwLock;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use serde_json::Value;

use super::{IndexResponse, VectorIndex};

struct IndexEntry {
    document: Value,
    metadata: Option<Value>,
    vector: Vec<f32>,
}

/// In-memory vector index.
pub struct InMemoryIndex {
    entries: RwLock<Vec<IndexEntry>>,
}

impl InMemoryIndex {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(Vec::new()),
        }
    }

    /// Add a document with optional metadata and its embedding.
    pub fn add(&self, document: impl Into<Value>, metadata: Option<Value>, vector: Vec<f32>) -> Result<()> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| anyhow!("in-memory index lock poisoned"))?;
        entries.push(IndexEntry {
            document: document.into(),
            metadata,
            vector,
        });
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for InMemoryIndex {
    fn default() -> Self {
        Self::new()
    }
}

/// Compute cosine similarity between two embedding vectors.
///
/// Returns `0.0` for empty vectors, vectors of different lengths, or
/// zero-magnitude vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let mag_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let mag_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if mag_a < f32::EPSILON || mag_b < f32::EPSILON {
        0.0
    } else {
        dot / (mag_a * mag_b)
    }
}

#[async_trait]
impl VectorIndex for InMemoryIndex {
    async fn query(&self, vector: &[f32], k: usize) -> Result<IndexResponse> {
        let entries = self
            .entries
            .read()
            .map_err(|_| anyhow!("in-memory index lock poisoned"))?;

        let mut scored: Vec<(usize, f64)> = entries
            .iter()
            .enumerate()
            .map(|(i, e)| (i, 1.0 - cosine_similarity(vector, &e.vector) as f64))
            .collect();

        scored.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(k);

        let mut resp = IndexResponse::default();
        for (i, distance) in scored {
            let entry = &entries[i];
            resp.documents.push(entry.document.clone());
            resp.metadatas.push(entry.metadata.clone());
            resp.distances.push(distance);
        }
        Ok(resp)
    }
}
