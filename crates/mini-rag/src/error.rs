//! Error types for the RAG pipeline

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, Error>;

/// Pipeline errors
#[derive(Debug, Error)]
pub enum Error {
    /// File extension outside the accepted set
    #[error("Unsupported file type '{extension}'. Please upload one of: {allowed}")]
    UnsupportedFormat { extension: String, allowed: String },

    /// Content could not be decoded into text
    #[error("Failed to extract text from '{filename}': {message}")]
    Extraction { filename: String, message: String },

    /// Nothing usable came out of extraction/chunking
    #[error("{0}")]
    ChunkingFailed(String),

    /// Embedding service returned missing or malformed vectors
    #[error("Embedding error: {0}")]
    Embedding(String),

    /// Transport or service failure from an external model service
    #[error("{service} request failed: {message}")]
    Upstream { service: String, message: String },

    /// Malformed request arguments
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The vector collection has not been created yet
    #[error("Collection '{0}' does not exist")]
    CollectionNotFound(String),

    /// Vector index failure other than a missing collection
    #[error("Vector index error: {0}")]
    VectorIndex(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create an extraction error
    pub fn extraction(filename: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Extraction {
            filename: filename.into(),
            message: message.into(),
        }
    }

    /// Create an upstream error tagged with the service name
    pub fn upstream(service: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Upstream {
            service: service.into(),
            message: message.into(),
        }
    }

    /// Create an embedding error
    pub fn embedding(message: impl Into<String>) -> Self {
        Self::Embedding(message.into())
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Errors the caller can fix by changing the input
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Error::UnsupportedFormat { .. }
                | Error::Extraction { .. }
                | Error::ChunkingFailed(_)
                | Error::InvalidInput(_)
        )
    }

    fn error_type(&self) -> &'static str {
        match self {
            Error::UnsupportedFormat { .. } => "unsupported_format",
            Error::Extraction { .. } => "extraction_error",
            Error::ChunkingFailed(_) => "chunking_failed",
            Error::Embedding(_) => "embedding_error",
            Error::Upstream { .. } => "upstream_error",
            Error::InvalidInput(_) => "invalid_input",
            Error::CollectionNotFound(_) => "collection_not_found",
            Error::VectorIndex(_) => "vector_index_error",
            Error::Config(_) => "config_error",
            Error::Internal(_) => "internal_error",
        }
    }
}

fn error_body(status: StatusCode, error_type: &str, message: String) -> Response {
    let body = Json(json!({
        "error": {
            "type": error_type,
            "message": message,
        }
    }));

    (status, body).into_response()
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        if self.is_client_error() {
            return error_body(StatusCode::BAD_REQUEST, self.error_type(), self.to_string());
        }

        tracing::error!(error = %self, kind = self.error_type(), "request failed");
        error_body(
            StatusCode::INTERNAL_SERVER_ERROR,
            "internal_error",
            "An unexpected error occurred.".to_string(),
        )
    }
}

/// Query-time failure rendered without any detail, whatever its cause
#[derive(Debug)]
pub struct QueryFailure(pub Error);

impl IntoResponse for QueryFailure {
    fn into_response(self) -> Response {
        tracing::error!(error = %self.0, kind = self.0.error_type(), "query processing failed");
        error_body(
            StatusCode::INTERNAL_SERVER_ERROR,
            "query_error",
            "An error occurred while processing your query.".to_string(),
        )
    }
}
