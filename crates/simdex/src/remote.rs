//! Remote vector-store client.
//!
//! HTTP client for the hosted vector-index service, implementing the
//! [`VectorBackend`] trait the engine stores and queries through.
//! Operations used: list indexes (existence check), create index
//! (dimension + cloud/region spec), upsert, query, delete-all.
//!
//! There is no retry logic anywhere in this client: a failed request is
//! returned to the engine, which degrades to the local in-memory store.
//! The request timeout comes from `remote.timeout_secs`.

use anyhow::{bail, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

use simdex_core::store::{ChunkRecord, ScoredRecord, VectorBackend};

use crate::config::RemoteConfig;

/// Client for one named index in the remote vector-store service.
pub struct RemoteVectorStore {
    client: reqwest::Client,
    endpoint: String,
    index: String,
    api_key: String,
}

#[derive(Deserialize)]
struct IndexList {
    indexes: Vec<IndexEntry>,
}

#[derive(Deserialize)]
struct IndexEntry {
    name: String,
}

#[derive(Deserialize)]
struct QueryResponse {
    matches: Vec<ScoredRecord>,
}

impl RemoteVectorStore {
    /// Connect to the service and ensure the configured index exists,
    /// creating it with the given dimension when missing.
    ///
    /// # Errors
    ///
    /// Returns an error if the API key is missing from the environment
    /// or the existence check / index creation fails. The caller treats
    /// any error here as "operate local-only".
    pub async fn connect(config: &RemoteConfig, dims: usize) -> Result<Self> {
        let api_key = match config.api_key() {
            Some(key) => key,
            None => bail!("{} environment variable not set", config.api_key_env),
        };

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        let store = Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            index: config.index.clone(),
            api_key,
        };

        store.ensure_index(dims, &config.cloud, &config.region).await?;
        Ok(store)
    }

    /// Check whether the index exists; create it when it does not.
    async fn ensure_index(&self, dims: usize, cloud: &str, region: &str) -> Result<()> {
        let response = self
            .client
            .get(format!("{}/indexes", self.endpoint))
            .header("Api-Key", &self.api_key)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            bail!("Vector service error {} listing indexes: {}", status, body);
        }

        let list: IndexList = response.json().await?;
        if list.indexes.iter().any(|i| i.name == self.index) {
            return Ok(());
        }

        let body = serde_json::json!({
            "name": self.index,
            "dimension": dims,
            "metric": "cosine",
            "cloud": cloud,
            "region": region,
        });

        let response = self
            .client
            .post(format!("{}/indexes", self.endpoint))
            .header("Api-Key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            bail!("Vector service error {} creating index: {}", status, body);
        }

        Ok(())
    }

    fn index_url(&self, op: &str) -> String {
        format!("{}/indexes/{}/{}", self.endpoint, self.index, op)
    }
}

#[async_trait]
impl VectorBackend for RemoteVectorStore {
    async fn upsert(&self, records: &[ChunkRecord]) -> Result<()> {
        let body = serde_json::json!({ "vectors": records });

        let response = self
            .client
            .post(self.index_url("vectors/upsert"))
            .header("Api-Key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            bail!("Vector service error {} on upsert: {}", status, body);
        }

        Ok(())
    }

    async fn query(&self, vector: &[f32], top_k: usize) -> Result<Vec<ScoredRecord>> {
        let body = serde_json::json!({
            "vector": vector,
            "top_k": top_k,
            "include_metadata": true,
        });

        let response = self
            .client
            .post(self.index_url("query"))
            .header("Api-Key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            bail!("Vector service error {} on query: {}", status, body);
        }

        let parsed: QueryResponse = response.json().await?;
        Ok(parsed.matches)
    }

    async fn delete_all(&self) -> Result<()> {
        let body = serde_json::json!({ "delete_all": true });

        let response = self
            .client
            .post(self.index_url("vectors/delete"))
            .header("Api-Key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            bail!("Vector service error {} on delete-all: {}", status, body);
        }

        Ok(())
    }
}
