//! Text extraction for the supported upload formats

use crate::error::{Error, Result};
use crate::types::FileType;

/// Converts raw uploaded bytes into plain text, dispatching on [`FileType`]
pub struct TextExtractor;

impl TextExtractor {
    /// Resolve the format from `filename` and extract its text.
    ///
    /// Fails with `UnsupportedFormat` before touching `data` when the
    /// extension is not accepted.
    pub fn extract(filename: &str, data: &[u8]) -> Result<String> {
        let file_type = FileType::from_filename(filename)?;
        Self::extract_as(file_type, filename, data)
    }

    /// Extract text for an already-resolved file type
    pub fn extract_as(file_type: FileType, filename: &str, data: &[u8]) -> Result<String> {
        match file_type {
            FileType::Txt => Self::extract_text(filename, data),
            FileType::Pdf => Self::extract_pdf(filename, data),
            FileType::Docx => Self::extract_docx(filename, data),
        }
    }

    /// Strict UTF-8 decode
    fn extract_text(filename: &str, data: &[u8]) -> Result<String> {
        String::from_utf8(data.to_vec())
            .map_err(|e| Error::extraction(filename, format!("invalid UTF-8: {}", e)))
    }

    /// Concatenate the text of every page in page order
    fn extract_pdf(filename: &str, data: &[u8]) -> Result<String> {
        let doc = lopdf::Document::load_mem(data)
            .map_err(|e| Error::extraction(filename, e.to_string()))?;

        let pages = doc.get_pages();
        let mut content = String::new();

        for page_number in pages.keys() {
            // Image-only or otherwise textless pages contribute nothing
            match doc.extract_text(&[*page_number]) {
                Ok(text) => content.push_str(&text),
                Err(e) => {
                    tracing::debug!(filename, page = page_number, error = %e, "page has no extractable text");
                }
            }
        }

        tracing::debug!(filename, pages = pages.len(), chars = content.len(), "extracted pdf");
        Ok(content)
    }

    /// Paragraph texts in document order, joined by newlines
    fn extract_docx(filename: &str, data: &[u8]) -> Result<String> {
        let doc = docx_rs::read_docx(data).map_err(|e| Error::extraction(filename, e.to_string()))?;

        let mut paragraphs = Vec::new();

        for child in doc.document.children {
            if let docx_rs::DocumentChild::Paragraph(p) = child {
                let mut text = String::new();
                for child in p.children {
                    if let docx_rs::ParagraphChild::Run(run) = child {
                        for child in run.children {
                            if let docx_rs::RunChild::Text(t) = child {
                                text.push_str(&t.text);
                            }
                        }
                    }
                }
                paragraphs.push(text);
            }
        }

        Ok(paragraphs.join("\n"))
    }
}
