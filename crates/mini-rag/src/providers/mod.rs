//! Provider abstractions for embeddings, reranking, generation and vector storage
//!
//! The pipeline only sees the traits; concrete clients are chosen when the
//! application state is built.

pub mod cohere;
pub mod embedding;
pub mod gemini;
pub mod llm;
pub mod memory;
pub mod qdrant;
pub mod reranker;
pub mod vector_store;

pub use cohere::CohereReranker;
pub use embedding::EmbeddingProvider;
pub use gemini::GeminiClient;
pub use llm::{Generation, LlmProvider, TokenUsage};
pub use memory::InMemoryVectorIndex;
pub use qdrant::QdrantVectorIndex;
pub use reranker::{RerankResult, Reranker};
pub use vector_store::{DistanceMetric, PayloadFilter, ScrolledRecord, VectorIndex};
