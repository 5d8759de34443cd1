//! Qdrant-backed vector index
//!
//! Talks to Qdrant over gRPC via `qdrant-client`. Chunk payloads are stored
//! as flat `text` / `source` / `chunk_num` fields, with a keyword index on
//! `source` for per-document filters.

use std::collections::HashMap;

use async_trait::async_trait;
use qdrant_client::qdrant::point_id::PointIdOptions;
use qdrant_client::qdrant::value::Kind;
use qdrant_client::qdrant::vectors_config::Config as VectorsConfigKind;
use qdrant_client::qdrant::with_payload_selector::SelectorOptions;
use qdrant_client::qdrant::{
    Condition, CreateCollectionBuilder, CreateFieldIndexCollectionBuilder, Distance, FieldType,
    Filter, PayloadIncludeSelector, PointId, PointStruct, ScrollPointsBuilder,
    SearchPointsBuilder, UpsertPointsBuilder, Value as QdrantValue, VectorParamsBuilder,
};
use qdrant_client::{Payload, Qdrant, QdrantError};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::types::{ChunkPayload, IndexedRecord, SearchHit};

use super::vector_store::{
    DistanceMetric, PayloadFilter, ScrolledRecord, VectorIndex, SOURCE_FIELD,
};

/// `VectorIndex` over one Qdrant collection
pub struct QdrantVectorIndex {
    client: Qdrant,
    collection_name: String,
}

impl QdrantVectorIndex {
    /// Connect to the Qdrant gRPC endpoint at `url`
    pub fn new(url: &str, api_key: Option<&str>, collection_name: impl Into<String>) -> Result<Self> {
        let mut config = Qdrant::from_url(url);
        if let Some(key) = api_key {
            config = config.api_key(key.to_string());
        }
        let client = config
            .build()
            .map_err(|e| Error::Config(format!("Failed to build Qdrant client: {}", e)))?;

        Ok(Self::from_client(client, collection_name))
    }

    pub fn from_client(client: Qdrant, collection_name: impl Into<String>) -> Self {
        Self {
            client,
            collection_name: collection_name.into(),
        }
    }

    fn map_err(&self, e: QdrantError) -> Error {
        let message = e.to_string();
        if is_missing_collection(&message) {
            Error::CollectionNotFound(self.collection_name.clone())
        } else {
            Error::VectorIndex(message)
        }
    }

    /// Fail when the existing collection was created with other parameters
    async fn check_existing(&self, dimensions: usize, distance: DistanceMetric) -> Result<()> {
        let info = self
            .client
            .collection_info(self.collection_name.as_str())
            .await
            .map_err(|e| self.map_err(e))?;

        let params = info
            .result
            .and_then(|i| i.config)
            .and_then(|c| c.params)
            .and_then(|p| p.vectors_config)
            .and_then(|v| v.config);

        if let Some(VectorsConfigKind::Params(params)) = params {
            let expected = qdrant_distance(distance) as i32;
            if params.size != dimensions as u64 || params.distance != expected {
                return Err(Error::VectorIndex(format!(
                    "collection '{}' exists with {} dimensions (distance {}), requested {} ({:?})",
                    self.collection_name, params.size, params.distance, dimensions, distance
                )));
            }
        }

        Ok(())
    }
}

fn is_missing_collection(message: &str) -> bool {
    message.contains("doesn't exist") || message.contains("Not found: Collection")
}

fn qdrant_distance(distance: DistanceMetric) -> Distance {
    match distance {
        DistanceMetric::Cosine => Distance::Cosine,
        DistanceMetric::Dot => Distance::Dot,
        DistanceMetric::Euclid => Distance::Euclid,
    }
}

fn to_payload(payload: &ChunkPayload) -> Payload {
    let mut out = Payload::new();
    out.insert("text", payload.text.clone());
    out.insert(SOURCE_FIELD, payload.source.clone());
    out.insert("chunk_num", i64::from(payload.chunk_num));
    out
}

fn to_json(value: &QdrantValue) -> Option<serde_json::Value> {
    match value.kind.as_ref()? {
        Kind::StringValue(s) => Some(s.clone().into()),
        Kind::IntegerValue(n) => Some((*n).into()),
        Kind::DoubleValue(d) => serde_json::Number::from_f64(*d).map(serde_json::Value::Number),
        Kind::BoolValue(b) => Some((*b).into()),
        _ => None,
    }
}

fn from_payload(payload: &HashMap<String, QdrantValue>) -> Result<ChunkPayload> {
    let string_field = |name: &str| match payload.get(name).and_then(|v| v.kind.as_ref()) {
        Some(Kind::StringValue(s)) => Ok(s.clone()),
        _ => Err(Error::VectorIndex(format!("point payload has no '{}' string", name))),
    };

    let chunk_num = match payload.get("chunk_num").and_then(|v| v.kind.as_ref()) {
        Some(Kind::IntegerValue(n)) => u32::try_from(*n).ok(),
        _ => None,
    }
    .ok_or_else(|| Error::VectorIndex("point payload has no valid 'chunk_num'".to_string()))?;

    Ok(ChunkPayload {
        text: string_field("text")?,
        source: string_field(SOURCE_FIELD)?,
        chunk_num,
    })
}

fn point_uuid(id: Option<PointId>) -> Result<Uuid> {
    match id.and_then(|p| p.point_id_options) {
        Some(PointIdOptions::Uuid(s)) => Uuid::parse_str(&s)
            .map_err(|e| Error::VectorIndex(format!("invalid point id '{}': {}", s, e))),
        Some(PointIdOptions::Num(n)) => Err(Error::VectorIndex(format!(
            "numeric point id {} in a uuid collection",
            n
        ))),
        None => Err(Error::VectorIndex("point without id".to_string())),
    }
}

#[async_trait]
impl VectorIndex for QdrantVectorIndex {
    async fn ensure_collection(&self, dimensions: usize, distance: DistanceMetric) -> Result<()> {
        let exists = self
            .client
            .collection_exists(self.collection_name.as_str())
            .await
            .map_err(|e| self.map_err(e))?;

        if exists {
            tracing::debug!(collection = %self.collection_name, "Qdrant collection already exists");
            return self.check_existing(dimensions, distance).await;
        }

        self.client
            .create_collection(
                CreateCollectionBuilder::new(self.collection_name.as_str()).vectors_config(
                    VectorParamsBuilder::new(dimensions as u64, qdrant_distance(distance)),
                ),
            )
            .await
            .map_err(|e| self.map_err(e))?;

        self.client
            .create_field_index(
                CreateFieldIndexCollectionBuilder::new(
                    self.collection_name.as_str(),
                    SOURCE_FIELD,
                    FieldType::Keyword,
                )
                .wait(true),
            )
            .await
            .map_err(|e| self.map_err(e))?;

        tracing::info!(
            collection = %self.collection_name,
            dimensions,
            ?distance,
            "Created Qdrant collection with source index"
        );
        Ok(())
    }

    async fn upsert(&self, records: Vec<IndexedRecord>, wait: bool) -> Result<()> {
        if records.is_empty() {
            return Ok(());
        }

        let count = records.len();
        let points: Vec<PointStruct> = records
            .into_iter()
            .map(|record| {
                let payload = to_payload(&record.payload);
                PointStruct::new(record.id.to_string(), record.vector, payload)
            })
            .collect();

        self.client
            .upsert_points(
                UpsertPointsBuilder::new(self.collection_name.as_str(), points).wait(wait),
            )
            .await
            .map_err(|e| self.map_err(e))?;

        tracing::debug!(collection = %self.collection_name, count, wait, "Upserted points to Qdrant");
        Ok(())
    }

    async fn search(
        &self,
        vector: &[f32],
        filter: Option<&PayloadFilter>,
        limit: usize,
    ) -> Result<Vec<SearchHit>> {
        let mut request =
            SearchPointsBuilder::new(self.collection_name.as_str(), vector.to_vec(), limit as u64)
                .with_payload(true);
        if let Some(f) = filter {
            request = request.filter(Filter::must([Condition::matches(
                f.field.as_str(),
                f.value.clone(),
            )]));
        }

        let response = self
            .client
            .search_points(request)
            .await
            .map_err(|e| self.map_err(e))?;

        response
            .result
            .into_iter()
            .map(|point| {
                Ok(SearchHit {
                    payload: from_payload(&point.payload)?,
                    score: point.score,
                })
            })
            .collect()
    }

    async fn scroll(&self, limit: usize, payload_fields: &[&str]) -> Result<Vec<ScrolledRecord>> {
        let selector = SelectorOptions::Include(PayloadIncludeSelector {
            fields: payload_fields.iter().map(|f| f.to_string()).collect(),
        });
        let limit = u32::try_from(limit).unwrap_or(u32::MAX);

        let response = self
            .client
            .scroll(
                ScrollPointsBuilder::new(self.collection_name.as_str())
                    .limit(limit)
                    .with_payload(selector)
                    .with_vectors(false),
            )
            .await
            .map_err(|e| self.map_err(e))?;

        response
            .result
            .into_iter()
            .map(|point| {
                let payload = point
                    .payload
                    .iter()
                    .filter_map(|(k, v)| to_json(v).map(|json| (k.clone(), json)))
                    .collect();
                Ok(ScrolledRecord {
                    id: point_uuid(point.id)?,
                    payload,
                })
            })
            .collect()
    }

    fn name(&self) -> &str {
        "qdrant"
    }
}
