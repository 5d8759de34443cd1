//! Query and ingestion request types

use serde::{Deserialize, Serialize};

/// Sentinel value meaning "search every ingested document"
pub const ALL_DOCUMENTS: &str = "all";

/// Query request body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryRequest {
    /// The question to answer
    pub query: String,
    /// Restrict retrieval to one source filename, or "all"
    #[serde(default)]
    pub selected_doc: Option<String>,
}

impl QueryRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            selected_doc: None,
        }
    }

    /// Restrict the query to a single document
    pub fn with_document(mut self, filename: impl Into<String>) -> Self {
        self.selected_doc = Some(filename.into());
        self
    }

    pub fn scope(&self) -> DocumentScope {
        DocumentScope::from_selection(self.selected_doc.as_deref())
    }
}

/// Which documents a search may return hits from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentScope {
    All,
    Document(String),
}

impl DocumentScope {
    /// Absent, empty, or "all" selects every document
    pub fn from_selection(selected: Option<&str>) -> Self {
        match selected {
            None => Self::All,
            Some(s) if s.is_empty() || s == ALL_DOCUMENTS => Self::All,
            Some(s) => Self::Document(s.to_string()),
        }
    }

    /// The source filename the search is restricted to, if any
    pub fn source(&self) -> Option<&str> {
        match self {
            Self::All => None,
            Self::Document(name) => Some(name),
        }
    }
}

/// Pasted text submitted for ingestion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PasteRequest {
    pub text: String,
    pub filename: String,
}
