//! Core types for the RAG pipeline

pub mod document;
pub mod query;
pub mod response;

pub use document::{Chunk, ChunkPayload, Document, FileType, IndexedRecord, SearchHit};
pub use query::{DocumentScope, PasteRequest, QueryRequest};
pub use response::{Citation, DocumentListResponse, IngestResponse, QueryResult};
