//! Chroma-compatible [`VectorIndex`] client.
//!
//! Talks to a Chroma server's v1 REST API:
//!
//! 1. `GET  {url}/api/v1/collections/{name}` → collection id (cached)
//! 2. `POST {url}/api/v1/collections/{id}/query` with `query_embeddings`,
//!    `n_results`, and `include = [documents, metadatas, distances]`
//!
//! Chroma answers with one row per query embedding; only the first row is
//! used since the pipeline sends one embedding per query.

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use tokio::sync::OnceCell;

use podcast_insights_core::index::{IndexResponse, VectorIndex};

use crate::config::IndexConfig;
use crate::http;

/// Vector index backed by a Chroma collection.
pub struct ChromaIndex {
    base_url: String,
    collection: String,
    collection_id: OnceCell<String>,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct CollectionInfo {
    id: String,
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    documents: Option<Vec<Vec<Value>>>,
    #[serde(default)]
    metadatas: Option<Vec<Vec<Option<Value>>>>,
    #[serde(default)]
    distances: Option<Vec<Vec<f64>>>,
}

impl ChromaIndex {
    pub fn new(config: &IndexConfig) -> Result<Self> {
        Ok(Self {
            base_url: config.url.clone(),
            collection: config.collection.clone(),
            collection_id: OnceCell::new(),
            client: http::client(config.timeout_secs)?,
        })
    }

    async fn collection_id(&self) -> Result<&str> {
        let id = self
            .collection_id
            .get_or_try_init(|| async {
                let url = http::join_url(
                    &self.base_url,
                    &format!("api/v1/collections/{}", self.collection),
                );
                let response = self
                    .client
                    .get(&url)
                    .send()
                    .await
                    .with_context(|| format!("Failed to reach vector index at {}", self.base_url))?;

                let status = response.status();
                if !status.is_success() {
                    let body = response.text().await.unwrap_or_default();
                    bail!(
                        "Collection '{}' lookup failed ({}): {}",
                        self.collection,
                        status,
                        body
                    );
                }

                let info: CollectionInfo = response.json().await?;
                tracing::debug!(collection = %self.collection, id = %info.id, "resolved collection");
                Ok::<_, anyhow::Error>(info.id)
            })
            .await?;
        Ok(id.as_str())
    }
}

#[async_trait]
impl VectorIndex for ChromaIndex {
    async fn query(&self, vector: &[f32], k: usize) -> Result<IndexResponse> {
        if k == 0 {
            return Ok(IndexResponse::default());
        }

        let id = self.collection_id().await?;
        let url = http::join_url(&self.base_url, &format!("api/v1/collections/{}/query", id));
        let body = serde_json::json!({
            "query_embeddings": [vector],
            "n_results": k,
            "include": ["documents", "metadatas", "distances"],
        });

        let json = http::post_json_with_retry(&self.client, &url, None, &body, 0, "Chroma").await?;
        parse_query_response(json)
    }
}

/// Take the first row of each parallel array in a Chroma query response.
fn parse_query_response(json: Value) -> Result<IndexResponse> {
    let parsed: QueryResponse =
        serde_json::from_value(json).context("Invalid Chroma query response")?;

    let response = IndexResponse {
        documents: first_row(parsed.documents, "documents")?,
        metadatas: first_row(parsed.metadatas, "metadatas")?,
        distances: first_row(parsed.distances, "distances")?,
    };
    response.validate()?;
    Ok(response)
}

fn first_row<T>(rows: Option<Vec<Vec<T>>>, name: &str) -> Result<Vec<T>> {
    let rows = rows.ok_or_else(|| anyhow::anyhow!("Chroma response missing {}", name))?;
    Ok(rows.into_iter().next().unwrap_or_default())
}
