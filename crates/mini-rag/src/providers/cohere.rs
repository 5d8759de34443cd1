//! Cohere rerank client

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::RerankConfig;
use crate::error::{Error, Result};
use crate::providers::reranker::{RerankResult, Reranker};

const SERVICE: &str = "Cohere";

/// Reranker backed by the Cohere `/rerank` endpoint
pub struct CohereReranker {
    http: reqwest::Client,
    url: String,
    api_key: String,
    model: String,
}

impl CohereReranker {
    pub fn new(config: &RerankConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            url: format!("{}/rerank", config.base_url.trim_end_matches('/')),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
        })
    }
}

#[derive(Serialize)]
struct RerankRequest<'a> {
    model: &'a str,
    query: &'a str,
    documents: &'a [String],
    top_n: usize,
}

#[derive(Deserialize)]
struct RerankResponse {
    results: Vec<RerankResult>,
}

#[async_trait]
impl Reranker for CohereReranker {
    async fn rerank(
        &self,
        query: &str,
        documents: &[String],
        top_n: usize,
    ) -> Result<Vec<RerankResult>> {
        if documents.is_empty() {
            return Ok(Vec::new());
        }

        let request = RerankRequest {
            model: &self.model,
            query,
            documents,
            top_n: top_n.min(documents.len()),
        };

        tracing::debug!(
            provider = SERVICE,
            candidates = documents.len(),
            top_n = request.top_n,
            "Reranking candidates"
        );

        let response = self
            .http
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::upstream(SERVICE, e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::upstream(SERVICE, format!("{}: {}", status, body)));
        }

        let parsed: RerankResponse = response
            .json()
            .await
            .map_err(|e| Error::upstream(SERVICE, format!("Failed to parse response: {}", e)))?;

        Ok(parsed.results)
    }

    fn name(&self) -> &str {
        "cohere"
    }
}
