//! External tools used by the researcher stage
//!
//! # Module Structure
//!
//! - [`arxiv`](crate::tools::arxiv) - arXiv Atom API search
//!
//! Every paper source implements [`PaperFetcher`], so the workflow can be
//! exercised against recorded fixtures or mocks instead of the live API.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::types::Result;

/// arXiv search client and query builder.
pub mod arxiv;

/// A paper as returned by the upstream search, before summarization or scoring.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawPaper {
    pub title: String,
    pub pdf_link: String,
    pub authors: Vec<String>,
    /// Abstract text as published
    pub summary: String,
    /// ISO-8601 publication timestamp, when the source provides one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arxiv_id: Option<String>,
}

/// A source of raw paper records.
#[async_trait]
pub trait PaperFetcher: Send + Sync {
    /// Search for up to `max_results` papers matching `query`.
    ///
    /// An empty result set is `Ok(vec![])`. Transport, rate-limit and
    /// upstream failures are `AppError::Fetch`.
    async fn fetch(&self, query: &str, max_results: usize) -> Result<Vec<RawPaper>>;

    /// Tool name reported by health checks
    fn name(&self) -> &str;
}
