//! Extract, chunk, embed and index a single uploaded document

use std::sync::Arc;

use crate::error::{Error, Result};
use crate::providers::{EmbeddingProvider, VectorIndex};
use crate::types::{Document, FileType, IndexedRecord};

use super::chunker::TextChunker;
use super::parser::TextExtractor;

/// Ingestion pipeline over injected embedding and index collaborators
#[derive(Clone)]
pub struct IngestPipeline {
    chunker: TextChunker,
    embedder: Arc<dyn EmbeddingProvider>,
    index: Arc<dyn VectorIndex>,
}

impl IngestPipeline {
    /// Create a pipeline with the default 1000/150 chunker
    pub fn new(embedder: Arc<dyn EmbeddingProvider>, index: Arc<dyn VectorIndex>) -> Self {
        Self::with_chunker(TextChunker::default(), embedder, index)
    }

    pub fn with_chunker(
        chunker: TextChunker,
        embedder: Arc<dyn EmbeddingProvider>,
        index: Arc<dyn VectorIndex>,
    ) -> Self {
        Self {
            chunker,
            embedder,
            index,
        }
    }

    /// Ingest one document and return a human-readable success message.
    ///
    /// Nothing is written to the index unless every chunk was embedded.
    pub async fn process_and_upload_document(&self, data: &[u8], filename: &str) -> Result<String> {
        let file_type = FileType::from_filename(filename)?;
        let document = Document::new(filename, data);

        tracing::info!("[{}] Extracting text ({} bytes)", filename, data.len());
        let text = tokio::task::spawn_blocking(move || {
            TextExtractor::extract_as(file_type, &document.filename, &document.raw_bytes)
        })
        .await
        .map_err(|e| Error::internal(format!("Extraction task failed: {}", e)))??;

        if text.trim().is_empty() {
            return Err(Error::ChunkingFailed(format!(
                "Could not extract any text from '{}'.",
                filename
            )));
        }

        let chunks = self.chunker.chunk_document(filename, &text);
        if chunks.is_empty() {
            return Err(Error::ChunkingFailed(format!(
                "Failed to split the document '{}' into chunks.",
                filename
            )));
        }

        tracing::info!("[{}] Created {} chunks, generating embeddings...", filename, chunks.len());

        let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        let vectors = self.embedder.embed_documents(&texts, filename).await?;

        if vectors.len() != chunks.len() {
            return Err(Error::embedding(format!(
                "expected {} vectors for '{}', got {}",
                chunks.len(),
                filename,
                vectors.len()
            )));
        }

        let dimensions = self.embedder.dimensions();
        if let Some(bad) = vectors.iter().find(|v| v.len() != dimensions) {
            return Err(Error::embedding(format!(
                "vector has {} dimensions, expected {}",
                bad.len(),
                dimensions
            )));
        }

        let records: Vec<IndexedRecord> = chunks
            .into_iter()
            .zip(vectors)
            .map(|(chunk, vector)| IndexedRecord::new(chunk, vector))
            .collect();
        let count = records.len();

        tracing::info!("[{}] Storing {} chunks in {}", filename, count, self.index.name());
        self.index.upsert(records, true).await?;

        tracing::info!("[{}] COMPLETE: {} chunks stored", filename, count);
        Ok(format!(
            "Successfully processed '{}' and uploaded {} chunks.",
            filename, count
        ))
    }
}
