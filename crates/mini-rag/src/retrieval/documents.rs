//! Listing of ingested source documents

use std::collections::BTreeSet;

use crate::error::{Error, Result};
use crate::providers::vector_store::SOURCE_FIELD;
use crate::providers::VectorIndex;

/// Records inspected when collecting source names
pub const SCROLL_LIMIT: usize = 1000;

/// Sorted distinct source filenames; an absent collection lists nothing.
///
/// Only the first `SCROLL_LIMIT` records are inspected.
pub async fn list_documents(index: &dyn VectorIndex) -> Result<Vec<String>> {
    let records = match index.scroll(SCROLL_LIMIT, &[SOURCE_FIELD]).await {
        Ok(records) => records,
        Err(Error::CollectionNotFound(name)) => {
            tracing::debug!(collection = %name, "Collection missing, no documents");
            return Ok(Vec::new());
        }
        Err(e) => return Err(e),
    };

    let sources: BTreeSet<String> = records
        .into_iter()
        .filter_map(|record| match record.payload.get(SOURCE_FIELD) {
            Some(serde_json::Value::String(source)) => Some(source.clone()),
            _ => None,
        })
        .collect();

    Ok(sources.into_iter().collect())
}
