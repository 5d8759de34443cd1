//! mini-rag: document Q&A with reranked retrieval and numbered citations
//!
//! Uploaded `.txt`, `.pdf` and `.docx` files are split into overlapping
//! chunks, embedded and stored in a vector index. Queries are embedded,
//! matched against the index, reranked, and answered by a generative model
//! whose `[N]` citations are resolved back to the passages it was shown.

pub mod config;
pub mod error;
pub mod generation;
pub mod ingestion;
pub mod providers;
pub mod retrieval;
pub mod server;
pub mod types;

pub use config::RagConfig;
pub use error::{Error, Result};
pub use ingestion::IngestPipeline;
pub use retrieval::QueryEngine;
pub use types::{
    document::{Chunk, ChunkPayload, Document, FileType},
    query::{DocumentScope, QueryRequest},
    response::{Citation, QueryResult},
};
