use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::analysis::pipeline::{ApiResponse, Stopwatch};
use crate::errors::AppError;
use crate::search::{technology_query, SearchBackend, SearchHit};
use crate::state::AppState;

const DEFAULT_LIMIT: usize = 5;
const MAX_LIMIT: usize = 20;

#[derive(Debug, Deserialize)]
pub struct SearchBody {
    pub technology: Option<String>,
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct SearchData {
    pub backend: SearchBackend,
    pub query: String,
    pub results: Vec<SearchHit>,
}

/// POST /api/search
///
/// Recent web results about a technology from the configured backend.
pub async fn handle_search(
    State(state): State<AppState>,
    payload: Result<Json<SearchBody>, JsonRejection>,
) -> Result<Json<ApiResponse<SearchData>>, AppError> {
    let Json(body) = payload?;
    let technology = body.technology.as_deref().map(str::trim).unwrap_or_default();
    if technology.is_empty() {
        return Err(AppError::Validation("technology is required".to_string()));
    }
    let limit = body.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);

    let watch = Stopwatch::start();
    let query = technology_query(technology);
    let results = state.search.search(&query, limit).await?;

    Ok(Json(ApiResponse::ok(
        SearchData {
            backend: state.search.backend(),
            query,
            results,
        },
        &watch,
    )))
}
