//! API routes for the RAG server

pub mod documents;
pub mod ingest;
pub mod query;

use axum::{
    routing::{get, post},
    Router,
};

use crate::server::state::AppState;

/// Build all API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/upload", post(ingest::upload_file))
        .route("/paste", post(ingest::paste_text))
        .route("/documents", get(documents::list_documents))
        .route("/query", post(query::query_rag))
}
