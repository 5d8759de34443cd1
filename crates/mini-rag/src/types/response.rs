//! Response types for queries, ingestion and listing

use serde::{Deserialize, Serialize};

/// Answer returned when the search finds nothing to ground on
pub const NO_RESULTS_ANSWER: &str =
    "I couldn't find any relevant information in the selected document(s).";

/// A numbered source actually cited by the generated answer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Citation {
    /// The number used inline, e.g. `2` for `[2]`
    pub citation_num: usize,
    /// Source filename
    pub source_file: String,
    /// Passage text shown to the model
    pub text: String,
}

/// Result of answering one query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
    /// Generated answer, citation markers left inline
    pub answer: String,
    /// Cited passages, ascending by citation number
    pub sources: Vec<Citation>,
    /// Wall-clock seconds, rounded to two decimals
    pub duration: f64,
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    /// Estimated cost in currency units
    pub cost: f64,
}

impl QueryResult {
    /// Canned response for a search with zero hits
    pub fn no_results(duration: f64) -> Self {
        Self {
            answer: NO_RESULTS_ANSWER.to_string(),
            sources: Vec::new(),
            duration,
            prompt_tokens: 0,
            completion_tokens: 0,
            cost: 0.0,
        }
    }
}

/// Round elapsed seconds to two decimals
pub fn round_duration(seconds: f64) -> f64 {
    (seconds * 100.0).round() / 100.0
}

/// Response from document ingestion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestResponse {
    pub message: String,
}

/// Response for listing documents
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentListResponse {
    /// Sorted distinct source filenames
    pub documents: Vec<String>,
}
