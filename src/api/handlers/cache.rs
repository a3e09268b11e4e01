use crate::{
    AppState,
    types::{CacheStatsResponse, ClearCacheResponse},
};
use axum::{Json, extract::State};

/// Report cache size and hit/miss counters
#[utoipa::path(
    get,
    path = "/api/cache/stats",
    responses(
        (status = 200, description = "Current cache statistics", body = CacheStatsResponse)
    ),
    tag = "cache"
)]
pub async fn cache_stats(State(state): State<AppState>) -> Json<CacheStatsResponse> {
    Json(state.service.cache().stats_response())
}

/// Drop every cached response
#[utoipa::path(
    delete,
    path = "/api/cache",
    responses(
        (status = 200, description = "Cache cleared", body = ClearCacheResponse)
    ),
    tag = "cache"
)]
pub async fn clear_cache(State(state): State<AppState>) -> Json<ClearCacheResponse> {
    let removed = state.service.cache().clear();
    tracing::info!(removed, "Cache cleared");

    Json(ClearCacheResponse {
        removed,
        message: format!("Cleared {} cached responses", removed),
    })
}
