//! Vector index abstraction.
//!
//! The [`VectorIndex`] trait is the only thing the retriever needs from a
//! transcript store: nearest-neighbour lookup returning documents,
//! metadata, and distances as parallel arrays. How vectors are persisted
//! is up to the implementation.

pub mod memory;

use anyhow::{bail, Result};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

/// Parallel arrays returned by a nearest-neighbour query.
///
/// Position `i` of each array describes the same hit. Hits are ordered by
/// increasing distance.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct IndexResponse {
    /// Stored documents. Usually strings, but any JSON value is accepted.
    pub documents: Vec<Value>,
    /// Stored metadata maps; `None` where a document has none.
    pub metadatas: Vec<Option<Value>>,
    /// Embedding-space distances.
    pub distances: Vec<f64>,
}

impl IndexResponse {
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Check that the three arrays line up.
    pub fn validate(&self) -> Result<()> {
        let (d, m, s) = (self.documents.len(), self.metadatas.len(), self.distances.len());
        if d != m || d != s {
            bail!(
                "Vector index returned mismatched arrays: {} documents, {} metadatas, {} distances",
                d,
                m,
                s
            );
        }
        Ok(())
    }
}

/// Nearest-neighbour search over transcript embeddings.
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Return up to `k` hits closest to `vector`.
    async fn query(&self, vector: &[f32], k: usize) -> Result<IndexResponse>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_validate_accepts_aligned_arrays() {
        let resp = IndexResponse {
            documents: vec![json!("a"), json!("b")],
            metadatas: vec![None, Some(json!({}))],
            distances: vec![0.1, 0.2],
        };
        assert!(resp.validate().is_ok());
        assert_eq!(resp.len(), 2);
    }

    #[test]
    fn test_validate_rejects_mismatch() {
        let resp = IndexResponse {
            documents: vec![json!("a"), json!("b")],
            metadatas: vec![None],
            distances: vec![0.1, 0.2],
        };
        let err = resp.validate().unwrap_err().to_string();
        assert!(err.contains("mismatched"));
    }
}
