//! Query endpoint with reranked retrieval and numbered citations

use axum::{
    extract::State,
    response::{IntoResponse, Response},
    Json,
};

use crate::error::{Error, QueryFailure};
use crate::server::state::AppState;
use crate::types::{QueryRequest, QueryResult};

/// POST /api/query - Answer a question from the indexed documents
///
/// Request validation errors are returned as-is; anything that fails once
/// the pipeline is running becomes the generic query error.
pub async fn query_rag(
    State(state): State<AppState>,
    Json(request): Json<QueryRequest>,
) -> std::result::Result<Json<QueryResult>, Response> {
    if request.query.trim().is_empty() {
        return Err(Error::InvalidInput("Query must not be empty".to_string()).into_response());
    }

    let scope = request.scope();
    tracing::info!(scope = ?scope, "Query: \"{}\"", request.query);

    let result = state
        .query_engine()
        .answer_query(&request.query, &scope)
        .await
        .map_err(|e| QueryFailure(e).into_response())?;

    Ok(Json(result))
}
