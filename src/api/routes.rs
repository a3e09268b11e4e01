use crate::AppState;
use crate::api::handlers::{cache, health, research};
use crate::types::{
    CacheStatsResponse, ClearCacheResponse, HealthResponse, PaperRecord, ResearchRequest,
    ResearchResponse, ServiceInfo,
};
use axum::{
    Router,
    routing::{delete, get, post},
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;

/// OpenAPI document for the HTTP surface.
#[derive(OpenApi)]
#[openapi(
    paths(
        research::research,
        cache::cache_stats,
        cache::clear_cache,
        health::root,
        health::health,
    ),
    components(schemas(
        ResearchRequest,
        ResearchResponse,
        PaperRecord,
        CacheStatsResponse,
        ClearCacheResponse,
        HealthResponse,
        ServiceInfo,
    )),
    tags(
        (name = "research", description = "Paper search, summarization and scoring"),
        (name = "cache", description = "Response cache management"),
        (name = "health", description = "Liveness and service info"),
    )
)]
pub struct ApiDoc;

/// Routes mounted under `/api`.
pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/research", post(research::research))
        .route("/cache/stats", get(cache::cache_stats))
        .route("/cache", delete(cache::clear_cache))
}

/// The complete application: API routes, health checks, docs and middleware.
pub fn build_app(state: AppState) -> Router {
    let app = Router::new()
        .route("/", get(health::root))
        .route("/health", get(health::health))
        .nest("/api", create_router());

    #[cfg(feature = "swagger-ui")]
    let app = app.merge(
        utoipa_swagger_ui::SwaggerUi::new("/swagger-ui")
            .url("/api-docs/openapi.json", ApiDoc::openapi()),
    );

    #[cfg(not(feature = "swagger-ui"))]
    let app = app.route(
        "/api-docs/openapi.json",
        get(|| async { axum::Json(ApiDoc::openapi()) }),
    );

    app.layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
