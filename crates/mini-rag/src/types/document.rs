//! Document, chunk and index record types with source tracking for citations

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Error, Result};

/// Supported upload formats, resolved once from the filename
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    /// Plain UTF-8 text (.txt)
    Txt,
    /// PDF document (.pdf)
    Pdf,
    /// Microsoft Word document (.docx)
    Docx,
}

impl FileType {
    /// Every accepted extension, in display order
    pub const ALL: [FileType; 3] = [FileType::Txt, FileType::Pdf, FileType::Docx];

    /// Detect file type from extension (case-insensitive, without the dot)
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "txt" => Some(Self::Txt),
            "pdf" => Some(Self::Pdf),
            "docx" => Some(Self::Docx),
            _ => None,
        }
    }

    /// Resolve the file type from a filename's final extension
    pub fn from_filename(filename: &str) -> Result<Self> {
        let extension = match filename.rsplit_once('.') {
            Some((_, ext)) => ext,
            None => "",
        };

        Self::from_extension(extension).ok_or_else(|| Error::UnsupportedFormat {
            extension: extension.to_string(),
            allowed: Self::allowed_list(),
        })
    }

    /// Extension including the leading dot
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Txt => ".txt",
            Self::Pdf => ".pdf",
            Self::Docx => ".docx",
        }
    }

    /// Human-readable list of accepted extensions
    pub fn allowed_list() -> String {
        Self::ALL
            .iter()
            .map(|t| t.extension())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// An uploaded document, alive only for the duration of one ingestion
#[derive(Debug, Clone)]
pub struct Document {
    /// Name used as the citation source
    pub filename: String,
    /// Raw uploaded bytes
    pub raw_bytes: Vec<u8>,
}

impl Document {
    pub fn new(filename: impl Into<String>, raw_bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            filename: filename.into(),
            raw_bytes: raw_bytes.into(),
        }
    }
}

/// A bounded, possibly overlapping segment of a document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    /// Chunk text
    pub text: String,
    /// Originating filename
    pub source: String,
    /// 1-based position within the document
    pub chunk_index: u32,
}

impl Chunk {
    pub fn new(text: String, source: impl Into<String>, chunk_index: u32) -> Self {
        Self {
            text,
            source: source.into(),
            chunk_index,
        }
    }
}

/// Payload stored next to each vector; also what the model is shown
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkPayload {
    pub text: String,
    pub source: String,
    pub chunk_num: u32,
}

impl From<Chunk> for ChunkPayload {
    fn from(chunk: Chunk) -> Self {
        Self {
            text: chunk.text,
            source: chunk.source,
            chunk_num: chunk.chunk_index,
        }
    }
}

impl ChunkPayload {
    /// Look up a single payload field by name
    pub fn field(&self, name: &str) -> Option<serde_json::Value> {
        match name {
            "text" => Some(self.text.clone().into()),
            "source" => Some(self.source.clone().into()),
            "chunk_num" => Some(self.chunk_num.into()),
            _ => None,
        }
    }
}

/// A record owned by the vector index
#[derive(Debug, Clone, PartialEq)]
pub struct IndexedRecord {
    /// Globally unique id assigned at upsert time
    pub id: Uuid,
    /// Embedding vector
    pub vector: Vec<f32>,
    /// Chunk payload
    pub payload: ChunkPayload,
}

impl IndexedRecord {
    /// Pair an embedded chunk with a fresh id
    pub fn new(chunk: Chunk, vector: Vec<f32>) -> Self {
        Self {
            id: Uuid::new_v4(),
            vector,
            payload: chunk.into(),
        }
    }
}

/// A similarity search hit
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    pub payload: ChunkPayload,
    /// Higher is more similar
    pub score: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_filename_case_insensitive() {
        assert_eq!(FileType::from_filename("Report.PDF").unwrap(), FileType::Pdf);
        assert_eq!(FileType::from_filename("notes.Txt").unwrap(), FileType::Txt);
        assert_eq!(FileType::from_filename("a.b.docx").unwrap(), FileType::Docx);
    }

    #[test]
    fn test_from_filename_rejects_others() {
        match FileType::from_filename("table.csv") {
            Err(Error::UnsupportedFormat { extension, allowed }) => {
                assert_eq!(extension, "csv");
                assert_eq!(allowed, ".txt, .pdf, .docx");
            }
            other => panic!("unexpected: {:?}", other),
        }
        assert!(FileType::from_filename("README").is_err());
        assert!(FileType::from_filename("archive.docx.zip").is_err());
    }

    #[test]
    fn test_payload_fields() {
        let payload = ChunkPayload::from(Chunk::new("body".into(), "a.txt", 2));
        assert_eq!(payload.field("source"), Some(serde_json::json!("a.txt")));
        assert_eq!(payload.field("chunk_num"), Some(serde_json::json!(2)));
        assert_eq!(payload.field("missing"), None);
    }
}
