use crate::{
    AppState,
    types::{HealthResponse, ServiceInfo},
};
use axum::{Json, extract::State};

/// Service name and version
#[utoipa::path(
    get,
    path = "/",
    responses((status = 200, description = "Service info", body = ServiceInfo)),
    tag = "health"
)]
pub async fn root() -> Json<ServiceInfo> {
    Json(ServiceInfo {
        name: "Scholar Research Assistant".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        status: "running".to_string(),
    })
}

/// Liveness check with cache statistics
#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service is healthy", body = HealthResponse)),
    tag = "health"
)]
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        stages: vec!["researcher".to_string(), "analyst".to_string()],
        tools: state.tools.as_ref().clone(),
        cache: state.service.cache().stats_response(),
    })
}
