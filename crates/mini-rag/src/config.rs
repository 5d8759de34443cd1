//! Configuration for the RAG service

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::providers::vector_store::DistanceMetric;

/// Main service configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RagConfig {
    /// Server configuration
    pub server: ServerConfig,
    /// Embedding service configuration
    pub embeddings: EmbeddingConfig,
    /// Generation service configuration
    pub llm: LlmConfig,
    /// Rerank service configuration
    pub rerank: RerankConfig,
    /// Vector index configuration
    pub vector_db: VectorDbConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host address
    pub host: String,
    /// Port number
    pub port: u16,
    /// Enable CORS
    pub enable_cors: bool,
    /// Maximum upload size in bytes (default: 25MB)
    pub max_upload_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            enable_cors: true,
            max_upload_size: 25 * 1024 * 1024,
        }
    }
}

/// Embedding service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// Service base URL
    pub base_url: String,
    /// API key (never serialized)
    #[serde(skip_serializing, default)]
    pub api_key: String,
    /// Embedding model name
    pub model: String,
    /// Vector dimension produced by the model
    pub dimensions: usize,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            api_key: String::new(),
            model: "text-embedding-004".to_string(),
            dimensions: 768,
            timeout_secs: 60,
        }
    }
}

/// Generation service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Service base URL
    pub base_url: String,
    /// API key (never serialized)
    #[serde(skip_serializing, default)]
    pub api_key: String,
    /// Generation model name
    pub generate_model: String,
    /// Temperature for generation
    pub temperature: f32,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            api_key: String::new(),
            generate_model: "gemini-1.5-flash".to_string(),
            temperature: 0.2,
            timeout_secs: 120,
        }
    }
}

/// Rerank service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RerankConfig {
    /// Service base URL
    pub base_url: String,
    /// API key (never serialized)
    #[serde(skip_serializing, default)]
    pub api_key: String,
    /// Rerank model name
    pub model: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for RerankConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.cohere.com/v1".to_string(),
            api_key: String::new(),
            model: "rerank-english-v3.0".to_string(),
            timeout_secs: 60,
        }
    }
}

/// Vector index configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorDbConfig {
    /// Qdrant gRPC endpoint; the process-local index is used when unset
    pub url: Option<String>,
    /// Qdrant API key (never serialized)
    #[serde(skip_serializing, default)]
    pub api_key: Option<String>,
    /// Collection holding every ingested chunk
    pub collection_name: String,
    /// Similarity metric for the collection
    pub distance: DistanceMetric,
}

impl Default for VectorDbConfig {
    fn default() -> Self {
        Self {
            url: None,
            api_key: None,
            collection_name: "mini-rag-collection".to_string(),
            distance: DistanceMetric::Cosine,
        }
    }
}

impl RagConfig {
    /// Build configuration from `.env` (if present) and the process environment
    pub fn from_env() -> Result<Self> {
        if let Ok(path) = dotenvy::dotenv() {
            tracing::debug!("Loaded environment from {}", path.display());
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        let google_key = lookup("GOOGLE_API_KEY")
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| Error::Config("GOOGLE_API_KEY is not set".to_string()))?;
        let cohere_key = lookup("COHERE_API_KEY")
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| Error::Config("COHERE_API_KEY is not set".to_string()))?;

        config.embeddings.api_key = google_key.clone();
        config.llm.api_key = google_key;
        config.rerank.api_key = cohere_key;

        if let Some(name) =
            lookup("MINI_RAG_COLLECTION").or_else(|| lookup("QDRANT_COLLECTION_NAME"))
        {
            config.vector_db.collection_name = name;
        }
        config.vector_db.url = lookup("QDRANT_URL").filter(|v| !v.trim().is_empty());
        config.vector_db.api_key = lookup("QDRANT_API_KEY").filter(|v| !v.trim().is_empty());
        if let Some(host) = lookup("MINI_RAG_HOST") {
            config.server.host = host;
        }
        if let Some(port) = lookup("MINI_RAG_PORT") {
            config.server.port = port
                .parse()
                .map_err(|e| Error::Config(format!("Invalid MINI_RAG_PORT '{}': {}", port, e)))?;
        }
        if let Some(model) = lookup("MINI_RAG_EMBED_MODEL") {
            config.embeddings.model = model;
        }
        if let Some(model) = lookup("MINI_RAG_GENERATE_MODEL") {
            config.llm.generate_model = model;
        }
        if let Some(model) = lookup("MINI_RAG_RERANK_MODEL") {
            config.rerank.model = model;
        }

        config.validate()?;
        Ok(config)
    }

    /// Reject values that cannot work at runtime
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(Error::Config("server.port must be non-zero".to_string()));
        }
        if self.embeddings.dimensions == 0 {
            return Err(Error::Config("embeddings.dimensions must be non-zero".to_string()));
        }
        if self.vector_db.collection_name.trim().is_empty() {
            return Err(Error::Config("vector_db.collection_name is empty".to_string()));
        }
        if self.embeddings.timeout_secs == 0
            || self.llm.timeout_secs == 0
            || self.rerank.timeout_secs == 0
        {
            return Err(Error::Config("timeouts must be non-zero".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_required_keys() {
        let err = RagConfig::from_lookup(lookup_from(&[("COHERE_API_KEY", "c")])).unwrap_err();
        assert!(matches!(err, Error::Config(_)));

        let err = RagConfig::from_lookup(lookup_from(&[("GOOGLE_API_KEY", "g")])).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_overrides() {
        let config = RagConfig::from_lookup(lookup_from(&[
            ("GOOGLE_API_KEY", "g"),
            ("COHERE_API_KEY", "c"),
            ("QDRANT_COLLECTION_NAME", "legacy"),
            ("MINI_RAG_PORT", "9100"),
        ]))
        .unwrap();

        assert_eq!(config.vector_db.collection_name, "legacy");
        assert_eq!(config.server.port, 9100);
        assert_eq!(config.embeddings.api_key, "g");
        assert_eq!(config.llm.api_key, "g");
        assert_eq!(config.rerank.api_key, "c");
        assert_eq!(config.embeddings.dimensions, 768);
        assert!(config.vector_db.url.is_none());
    }

    #[test]
    fn test_qdrant_settings() {
        let config = RagConfig::from_lookup(lookup_from(&[
            ("GOOGLE_API_KEY", "g"),
            ("COHERE_API_KEY", "c"),
            ("QDRANT_URL", "http://qdrant:6334"),
            ("QDRANT_API_KEY", "q-secret"),
        ]))
        .unwrap();

        assert_eq!(config.vector_db.url.as_deref(), Some("http://qdrant:6334"));
        assert_eq!(config.vector_db.api_key.as_deref(), Some("q-secret"));
        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains("q-secret"));
    }

    #[test]
    fn test_bad_port() {
        let err = RagConfig::from_lookup(lookup_from(&[
            ("GOOGLE_API_KEY", "g"),
            ("COHERE_API_KEY", "c"),
            ("MINI_RAG_PORT", "eighty"),
        ]))
        .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_api_keys_not_serialized() {
        let mut config = RagConfig::default();
        config.llm.api_key = "super-secret".to_string();
        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains("super-secret"));
    }
}
