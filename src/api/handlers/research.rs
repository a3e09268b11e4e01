use crate::{
    AppState,
    types::{ResearchRequest, ResearchResponse, Result},
};
use axum::{Json, extract::State};
use std::time::Instant;

/// Search, summarize and score papers for a query
#[utoipa::path(
    post,
    path = "/api/research",
    request_body = ResearchRequest,
    responses(
        (status = 200, description = "Papers ranked by relevance", body = ResearchResponse),
        (status = 400, description = "Empty or overlong query"),
        (status = 500, description = "Fetch, generation or extraction failure; see error_type")
    ),
    tag = "research"
)]
pub async fn research(
    State(state): State<AppState>,
    Json(payload): Json<ResearchRequest>,
) -> Result<Json<ResearchResponse>> {
    let start = Instant::now();

    let response = state.service.handle(&payload.query).await?;

    tracing::debug!(
        papers = response.papers.len(),
        duration_ms = start.elapsed().as_millis() as u64,
        "Research handler finished"
    );
    Ok(Json(response))
}
