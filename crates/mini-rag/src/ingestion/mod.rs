//! Document ingestion: text extraction, chunking and indexing

mod chunker;
mod parser;
mod processor;

pub use chunker::{TextChunker, CHUNK_OVERLAP, CHUNK_SIZE};
pub use parser::TextExtractor;
pub use processor::IngestPipeline;
