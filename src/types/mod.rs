use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// ============= Paper Model =============

/// One validated paper as returned to clients.
///
/// Instances are only produced by the response extractor, which guarantees
/// a non-empty title and a score within `0..=100`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaperRecord {
    pub title: String,
    pub pdf_link: String,
    #[serde(default)]
    pub authors: Vec<String>,
    #[serde(default)]
    pub summary: String,
    pub matching_score: u8,
}

/// Highest relevance score a paper can carry.
pub const MAX_MATCHING_SCORE: u8 = 100;

// ============= API Request/Response Types =============

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ResearchRequest {
    pub query: String,
}

/// Papers for one query, in the rank order produced by the analyst stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ResearchResponse {
    pub query: String,
    pub total_results: usize,
    pub papers: Vec<PaperRecord>,
}

impl ResearchResponse {
    pub fn new(query: impl Into<String>, papers: Vec<PaperRecord>) -> Self {
        Self {
            query: query.into(),
            total_results: papers.len(),
            papers,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CacheStatsResponse {
    pub entry_count: usize,
    pub hit_count: u64,
    pub miss_count: u64,
    pub hit_rate: f64,
    pub ttl_secs: u64,
    pub enabled: bool,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ClearCacheResponse {
    pub removed: usize,
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    /// Pipeline stages run on a cache miss.
    pub stages: Vec<String>,
    /// External tools the researcher stage can call.
    pub tools: Vec<String>,
    pub cache: CacheStatsResponse,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ServiceInfo {
    pub name: String,
    pub version: String,
    pub status: String,
}

// ============= Error Types =============

/// Failure classification surfaced to callers.
///
/// `Clone` because a single failed workflow run is delivered to every
/// request that joined it.
#[derive(Debug, Clone, thiserror::Error)]
pub enum AppError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Fetch error: {0}")]
    Fetch(String),

    #[error("Generation error: {0}")]
    Generation(String),

    #[error("Extraction error: {message}")]
    Extraction { message: String, excerpt: String },

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Stable machine-readable classification.
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::InvalidInput(_) => "client_input_error",
            AppError::Fetch(_) => "fetch_error",
            AppError::Generation(_) => "generation_error",
            AppError::Extraction { .. } => "extraction_error",
            AppError::Configuration(_) | AppError::Internal(_) => "internal_error",
        }
    }

    pub fn is_client_error(&self) -> bool {
        matches!(self, AppError::InvalidInput(_))
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = if self.is_client_error() {
            axum::http::StatusCode::BAD_REQUEST
        } else {
            axum::http::StatusCode::INTERNAL_SERVER_ERROR
        };

        let mut body = serde_json::json!({
            "error": self.to_string(),
            "error_type": self.kind(),
        });
        if let AppError::Extraction { excerpt, .. } = &self {
            body["excerpt"] = serde_json::Value::String(excerpt.clone());
        }

        (status, axum::Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
