//! Process-local vector index
//!
//! Records live in a single named collection guarded by a `parking_lot`
//! lock. Writes are visible as soon as `upsert` returns, so `wait` is
//! always honoured.

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap, HashSet};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::types::{IndexedRecord, SearchHit};

use super::vector_store::{
    DistanceMetric, PayloadFilter, ScrolledRecord, VectorIndex, SOURCE_FIELD,
};

struct Collection {
    dimensions: usize,
    distance: DistanceMetric,
    records: BTreeMap<Uuid, IndexedRecord>,
    /// Keyword index: source filename -> record ids
    by_source: HashMap<String, HashSet<Uuid>>,
}

impl Collection {
    fn new(dimensions: usize, distance: DistanceMetric) -> Self {
        Self {
            dimensions,
            distance,
            records: BTreeMap::new(),
            by_source: HashMap::new(),
        }
    }

    fn insert(&mut self, record: IndexedRecord) {
        if let Some(previous) = self.records.get(&record.id) {
            if let Some(ids) = self.by_source.get_mut(&previous.payload.source) {
                ids.remove(&record.id);
            }
        }

        self.by_source
            .entry(record.payload.source.clone())
            .or_default()
            .insert(record.id);
        self.records.insert(record.id, record);
    }

    fn candidates<'a>(
        &'a self,
        filter: Option<&'a PayloadFilter>,
    ) -> Box<dyn Iterator<Item = &'a IndexedRecord> + 'a> {
        match filter {
            None => Box::new(self.records.values()),
            Some(f) if f.field == SOURCE_FIELD => {
                let ids = self.by_source.get(&f.value);
                Box::new(
                    ids.into_iter()
                        .flatten()
                        .filter_map(move |id| self.records.get(id)),
                )
            }
            Some(f) => {
                let expected = serde_json::Value::String(f.value.clone());
                Box::new(
                    self.records
                        .values()
                        .filter(move |r| r.payload.field(&f.field).as_ref() == Some(&expected)),
                )
            }
        }
    }
}

/// In-memory `VectorIndex` over one named collection
pub struct InMemoryVectorIndex {
    collection_name: String,
    collection: RwLock<Option<Collection>>,
}

impl InMemoryVectorIndex {
    pub fn new(collection_name: impl Into<String>) -> Self {
        Self {
            collection_name: collection_name.into(),
            collection: RwLock::new(None),
        }
    }

    /// Number of stored records (0 before the collection exists)
    pub fn len(&self) -> usize {
        self.collection
            .read()
            .as_ref()
            .map(|c| c.records.len())
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn not_found(&self) -> Error {
        Error::CollectionNotFound(self.collection_name.clone())
    }
}

pub(crate) fn similarity(distance: DistanceMetric, a: &[f32], b: &[f32]) -> f32 {
    match distance {
        DistanceMetric::Cosine => {
            let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
            let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
            let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
            if norm_a == 0.0 || norm_b == 0.0 {
                return 0.0;
            }
            dot / (norm_a * norm_b)
        }
        DistanceMetric::Dot => a.iter().zip(b).map(|(x, y)| x * y).sum(),
        // Negated so that higher still means closer
        DistanceMetric::Euclid => -a
            .iter()
            .zip(b)
            .map(|(x, y)| (x - y) * (x - y))
            .sum::<f32>()
            .sqrt(),
    }
}

#[async_trait]
impl VectorIndex for InMemoryVectorIndex {
    async fn ensure_collection(&self, dimensions: usize, distance: DistanceMetric) -> Result<()> {
        let mut guard = self.collection.write();

        match guard.as_ref() {
            Some(existing) => {
                if existing.dimensions != dimensions || existing.distance != distance {
                    return Err(Error::VectorIndex(format!(
                        "collection '{}' exists with {} dimensions ({:?}), requested {} ({:?})",
                        self.collection_name,
                        existing.dimensions,
                        existing.distance,
                        dimensions,
                        distance
                    )));
                }
            }
            None => {
                tracing::info!(
                    collection = %self.collection_name,
                    dimensions,
                    ?distance,
                    "Creating collection with source index"
                );
                *guard = Some(Collection::new(dimensions, distance));
            }
        }

        Ok(())
    }

    async fn upsert(&self, records: Vec<IndexedRecord>, _wait: bool) -> Result<()> {
        let mut guard = self.collection.write();
        let collection = guard.as_mut().ok_or_else(|| self.not_found())?;

        if let Some(bad) = records
            .iter()
            .find(|r| r.vector.len() != collection.dimensions)
        {
            return Err(Error::VectorIndex(format!(
                "vector for '{}' chunk {} has {} dimensions, expected {}",
                bad.payload.source,
                bad.payload.chunk_num,
                bad.vector.len(),
                collection.dimensions
            )));
        }

        let count = records.len();
        for record in records {
            collection.insert(record);
        }

        tracing::debug!(count, total = collection.records.len(), "Upserted records");
        Ok(())
    }

    async fn search(
        &self,
        vector: &[f32],
        filter: Option<&PayloadFilter>,
        limit: usize,
    ) -> Result<Vec<SearchHit>> {
        let guard = self.collection.read();
        let collection = guard.as_ref().ok_or_else(|| self.not_found())?;

        if vector.len() != collection.dimensions {
            return Err(Error::VectorIndex(format!(
                "query vector has {} dimensions, expected {}",
                vector.len(),
                collection.dimensions
            )));
        }

        let mut hits: Vec<SearchHit> = collection
            .candidates(filter)
            .map(|record| SearchHit {
                payload: record.payload.clone(),
                score: similarity(collection.distance, &record.vector, vector),
            })
            .collect();

        hits.sort_by(|a, b| b.score.total_cmp(&a.score));
        hits.truncate(limit);
        Ok(hits)
    }

    async fn scroll(&self, limit: usize, payload_fields: &[&str]) -> Result<Vec<ScrolledRecord>> {
        let guard = self.collection.read();
        let collection = guard.as_ref().ok_or_else(|| self.not_found())?;

        Ok(collection
            .records
            .values()
            .take(limit)
            .map(|record| ScrolledRecord {
                id: record.id,
                payload: payload_fields
                    .iter()
                    .filter_map(|name| {
                        record
                            .payload
                            .field(name)
                            .map(|value| (name.to_string(), value))
                    })
                    .collect(),
            })
            .collect())
    }

    fn name(&self) -> &str {
        "in-memory"
    }
}
