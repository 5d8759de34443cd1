//! Vector index contract consumed by the pipeline

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

use crate::error::Result;
use crate::types::{IndexedRecord, SearchHit};

/// Payload field holding the source filename; indexed for equality filters
pub const SOURCE_FIELD: &str = "source";

/// Similarity metric of a collection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistanceMetric {
    Cosine,
    Dot,
    Euclid,
}

/// Equality filter on a payload field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayloadFilter {
    pub field: String,
    pub value: String,
}

impl PayloadFilter {
    /// Restrict to records whose `source` equals `filename`
    pub fn source(filename: impl Into<String>) -> Self {
        Self {
            field: SOURCE_FIELD.to_string(),
            value: filename.into(),
        }
    }
}

/// A record returned by `scroll`, carrying only the requested payload fields
#[derive(Debug, Clone, PartialEq)]
pub struct ScrolledRecord {
    pub id: Uuid,
    pub payload: HashMap<String, serde_json::Value>,
}

/// Trait for vector storage and similarity search
///
/// Implementations own durability and isolation; the pipeline holds no
/// locks of its own.
///
/// Implementations:
/// - `QdrantVectorIndex`: Qdrant over gRPC
/// - `InMemoryVectorIndex`: process-local index
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Create the collection and its `source` keyword index if missing.
    ///
    /// Idempotent for matching parameters; incompatible parameters fail.
    async fn ensure_collection(&self, dimensions: usize, distance: DistanceMetric) -> Result<()>;

    /// Insert or overwrite records by id.
    ///
    /// With `wait = true` the call returns only once the write is visible
    /// to every subsequent search.
    async fn upsert(&self, records: Vec<IndexedRecord>, wait: bool) -> Result<()>;

    /// Up to `limit` hits ordered by decreasing similarity
    async fn search(
        &self,
        vector: &[f32],
        filter: Option<&PayloadFilter>,
        limit: usize,
    ) -> Result<Vec<SearchHit>>;

    /// Up to `limit` records with only `payload_fields` populated.
    ///
    /// Fails with `CollectionNotFound` when the collection does not exist.
    async fn scroll(&self, limit: usize, payload_fields: &[&str]) -> Result<Vec<ScrolledRecord>>;

    /// Get provider name for logging
    fn name(&self) -> &str;
}
