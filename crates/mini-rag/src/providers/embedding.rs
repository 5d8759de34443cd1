//! Embedding provider trait for generating text embeddings

use async_trait::async_trait;
use crate::error::Result;

/// Trait for generating text embeddings
///
/// Document and query modes are distinct because retrieval models embed
/// the two sides differently.
///
/// Implementations:
/// - `GeminiClient`: Generative Language API (text-embedding-004)
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Embed a document's chunks, using `title` (the filename) as context.
    ///
    /// Returns one vector per input, in input order.
    async fn embed_documents(&self, texts: &[String], title: &str) -> Result<Vec<Vec<f32>>>;

    /// Embed a single search query
    async fn embed_query(&self, text: &str) -> Result<Vec<f32>>;

    /// Get embedding dimensions (e.g., 768 for text-embedding-004)
    fn dimensions(&self) -> usize;

    /// Get provider name for logging
    fn name(&self) -> &str;
}
