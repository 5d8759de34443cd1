//! Application state for the RAG server

use std::sync::Arc;
use std::time::Duration;

use crate::config::RagConfig;
use crate::error::Result;
use crate::generation::AnswerGenerator;
use crate::ingestion::IngestPipeline;
use crate::providers::{
    CohereReranker, EmbeddingProvider, GeminiClient, InMemoryVectorIndex, LlmProvider,
    QdrantVectorIndex, Reranker, VectorIndex,
};
use crate::retrieval::QueryEngine;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: RagConfig,
    index: Arc<dyn VectorIndex>,
    ingest: IngestPipeline,
    query: QueryEngine,
}

impl AppState {
    /// Build the production collaborators and make sure the collection exists
    pub async fn new(config: RagConfig) -> Result<Self> {
        tracing::info!(
            collection = %config.vector_db.collection_name,
            "Initializing RAG application state..."
        );

        let gemini = Arc::new(GeminiClient::new(&config.embeddings, &config.llm)?);
        tracing::info!(
            "Gemini client initialized (embed: {}, generate: {})",
            config.embeddings.model,
            config.llm.generate_model
        );

        let reranker = Arc::new(CohereReranker::new(&config.rerank)?);
        tracing::info!("Cohere reranker initialized ({})", config.rerank.model);

        let index = Self::build_index(&config)?;

        Self::from_parts(config, gemini.clone(), gemini, reranker, index).await
    }

    /// Qdrant when a URL is configured, otherwise the process-local index
    fn build_index(config: &RagConfig) -> Result<Arc<dyn VectorIndex>> {
        let collection = &config.vector_db.collection_name;
        match config.vector_db.url.as_deref() {
            Some(url) => {
                let index =
                    QdrantVectorIndex::new(url, config.vector_db.api_key.as_deref(), collection)?;
                tracing::info!("Qdrant vector index at {}", url);
                Ok(Arc::new(index))
            }
            None => {
                tracing::warn!("QDRANT_URL not set, using the in-memory vector index");
                Ok(Arc::new(InMemoryVectorIndex::new(collection)))
            }
        }
    }

    /// Assemble state from explicit collaborators
    pub async fn from_parts(
        config: RagConfig,
        embedder: Arc<dyn EmbeddingProvider>,
        llm: Arc<dyn LlmProvider>,
        reranker: Arc<dyn Reranker>,
        index: Arc<dyn VectorIndex>,
    ) -> Result<Self> {
        index
            .ensure_collection(embedder.dimensions(), config.vector_db.distance)
            .await?;
        tracing::info!(
            "Vector index ready ({}, {} dimensions)",
            index.name(),
            embedder.dimensions()
        );

        let ingest = IngestPipeline::new(Arc::clone(&embedder), Arc::clone(&index));
        let generator = AnswerGenerator::new(llm, Duration::from_secs(config.llm.timeout_secs));
        let query = QueryEngine::new(embedder, Arc::clone(&index), reranker, generator);

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                index,
                ingest,
                query,
            }),
        })
    }

    pub fn config(&self) -> &RagConfig {
        &self.inner.config
    }

    pub fn index(&self) -> &Arc<dyn VectorIndex> {
        &self.inner.index
    }

    pub fn ingest(&self) -> &IngestPipeline {
        &self.inner.ingest
    }

    pub fn query_engine(&self) -> &QueryEngine {
        &self.inner.query
    }
}
