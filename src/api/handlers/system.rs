//! Health, cache statistics and manual purge.

use axum::{extract::State, Json};
use tracing::info;

use super::{drop_tagged, read_body};
use crate::api::AppState;
use crate::cache::keys::tags;
use crate::error::{ApiError, Result};
use crate::models::{ApiResponse, HealthResponse, PurgeRequest, PurgeResponse, StatsResponse};

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}

/// Handler for GET /api/admin/cache/stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<ApiResponse<StatsResponse>> {
    let report = state.cache.report().await;
    Json(ApiResponse::ok(StatsResponse::from(report)))
}

/// Handler for POST /api/admin/cache/invalidate
///
/// Purges by tag. The `search` pseudo-tag flushes every cached search.
pub async fn purge_handler(
    State(state): State<AppState>,
    body: std::result::Result<Json<PurgeRequest>, axum::extract::rejection::JsonRejection>,
) -> Result<Json<ApiResponse<PurgeResponse>>> {
    let request = read_body(body)?;
    if let Some(message) = request.validate() {
        return Err(ApiError::BadRequest(message));
    }

    let (search, plain): (Vec<String>, Vec<String>) = request
        .tags()
        .into_iter()
        .partition(|t| t == tags::SEARCH);

    let keys_removed = drop_tagged(&state, &plain).await;
    let search_removed = if search.is_empty() {
        0
    } else {
        state.search.invalidate(None).await
    };
    info!(tags = ?plain, keys_removed, search_removed, "manual purge");

    let mut all_tags = plain;
    all_tags.extend(search);
    Ok(Json(ApiResponse::ok(PurgeResponse {
        tags: all_tags,
        keys_removed,
        search_removed,
    })))
}
