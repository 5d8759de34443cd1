//! Query answering and document listing

pub mod documents;
pub mod engine;

pub use documents::list_documents;
pub use engine::{QueryEngine, RERANK_TOP_N, SEARCH_LIMIT};
