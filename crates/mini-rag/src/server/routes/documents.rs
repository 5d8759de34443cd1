//! Document listing endpoint

use axum::{extract::State, Json};

use crate::error::Result;
use crate::retrieval;
use crate::server::state::AppState;
use crate::types::DocumentListResponse;

/// GET /api/documents - Sorted distinct source filenames
pub async fn list_documents(State(state): State<AppState>) -> Result<Json<DocumentListResponse>> {
    let documents = retrieval::list_documents(state.index().as_ref()).await?;
    Ok(Json(DocumentListResponse { documents }))
}
