//! Reranker trait for re-scoring search candidates

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// One reranked candidate, referring back to its input position
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RerankResult {
    /// Index into the candidate list passed to `rerank`
    pub index: usize,
    /// Relevance score (higher is better)
    pub relevance_score: f32,
}

/// A cross-encoder style relevance model.
///
/// Implementations:
/// - `CohereReranker`: Cohere rerank API
#[async_trait]
pub trait Reranker: Send + Sync {
    /// Return the `top_n` most relevant candidates, most relevant first
    async fn rerank(&self, query: &str, documents: &[String], top_n: usize)
        -> Result<Vec<RerankResult>>;

    /// Get provider name for logging
    fn name(&self) -> &str;
}
