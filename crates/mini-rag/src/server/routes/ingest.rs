//! Document ingestion endpoints

use axum::{
    extract::{Multipart, State},
    Json,
};

use crate::error::{Error, Result};
use crate::server::state::AppState;
use crate::types::{IngestResponse, PasteRequest};

/// Multipart field carrying the uploaded file
const FILE_FIELD: &str = "file";

/// POST /api/upload - Upload and index one file
pub async fn upload_file(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<IngestResponse>> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| Error::InvalidInput(format!("Failed to read multipart field: {}", e)))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let filename = field
            .file_name()
            .map(|s| s.to_string())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| Error::InvalidInput("Uploaded file has no filename".to_string()))?;

        let data = field
            .bytes()
            .await
            .map_err(|e| Error::InvalidInput(format!("Failed to read file: {}", e)))?;

        tracing::info!("Processing upload: {} ({} bytes)", filename, data.len());
        let message = state
            .ingest()
            .process_and_upload_document(&data, &filename)
            .await?;

        return Ok(Json(IngestResponse { message }));
    }

    Err(Error::InvalidInput(format!(
        "Missing multipart field '{}'",
        FILE_FIELD
    )))
}

/// POST /api/paste - Index pasted text under the given filename
pub async fn paste_text(
    State(state): State<AppState>,
    Json(request): Json<PasteRequest>,
) -> Result<Json<IngestResponse>> {
    tracing::info!(
        "Processing pasted text: {} ({} bytes)",
        request.filename,
        request.text.len()
    );

    let message = state
        .ingest()
        .process_and_upload_document(request.text.as_bytes(), &request.filename)
        .await?;

    Ok(Json(IngestResponse { message }))
}
