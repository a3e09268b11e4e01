//! # Scholar - research assistant server
//!
//! Takes a research question, searches arXiv, has a language model summarize
//! and score each paper, and returns a ranked, validated JSON payload. Results
//! are cached per normalized query.
//!
//! ## Overview
//!
//! Scholar can be used in two ways:
//!
//! 1. **As a standalone server** - Run the `scholar-server` binary
//! 2. **As a library** - Embed the research pipeline in your own project
//!
//! ### Basic Example
//!
//! ```rust,ignore
//! use scholar::{AppState, ScholarConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ScholarConfig::load_or_default("scholar.toml")?;
//!     let state = AppState::from_config(config).await?;
//!
//!     let response = state.service.handle("graph neural networks").await?;
//!     for paper in &response.papers {
//!         println!("{:>3}  {}", paper.matching_score, paper.title);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `ollama` | Ollama local inference (default) |
//! | `openai` | OpenAI API support |
//! | `swagger-ui` | Interactive API docs at `/swagger-ui/` |
//!
//! ## Modules
//!
//! - [`api`] - REST API handlers and routes
//! - [`llm`] - LLM client implementations
//! - [`research`] - Workflow, extraction, cache and request handling
//! - [`tools`] - Paper sources (arXiv)
//! - [`types`] - Paper model, payloads and error handling
//! - [`utils`] - Configuration

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(rustdoc::missing_crate_level_docs)]

/// HTTP API handlers and routes.
pub mod api;
/// Command-line interface.
pub mod cli;
/// LLM provider clients and abstractions.
pub mod llm;
/// Research pipeline: workflow, extraction, cache, request handling.
pub mod research;
/// Paper sources used by the researcher stage.
pub mod tools;
/// Core types (papers, payloads, errors).
pub mod types;
/// Configuration utilities (TOML).
pub mod utils;

// Re-export commonly used types
pub use llm::{LLMClient, LLMClientFactory, Provider};
pub use research::cache::{InMemoryResponseCache, ResponseCache};
pub use research::service::ResearchService;
pub use research::workflow::{ResearchWorkflow, WorkflowConfig, WorkflowRunner};
pub use tools::{PaperFetcher, RawPaper};
pub use types::{AppError, PaperRecord, ResearchResponse, Result};
pub use utils::toml_config::ScholarConfig;

use std::sync::Arc;

use crate::tools::arxiv::ArxivFetcher;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Read-only configuration loaded at startup
    pub config: Arc<ScholarConfig>,
    /// Cache + workflow request handler
    pub service: ResearchService,
    /// Tool names reported by the health endpoint
    pub tools: Arc<Vec<String>>,
}

impl AppState {
    /// Wire the production pipeline: arXiv fetcher, configured LLM provider,
    /// response cache.
    pub async fn from_config(config: ScholarConfig) -> Result<Self> {
        let fetcher: Arc<dyn PaperFetcher> = Arc::new(ArxivFetcher::new(&config.arxiv)?);
        let llm: Arc<dyn LLMClient> = LLMClientFactory::from_config(&config.llm)?
            .create_default()
            .await?
            .into();

        tracing::info!(
            model = llm.model_name(),
            arxiv = %config.arxiv.base_url,
            cache_ttl_secs = config.cache.ttl_secs,
            "Research pipeline configured"
        );

        Ok(Self::with_components(config, fetcher, llm))
    }

    /// Build state from explicit collaborators.
    pub fn with_components(
        config: ScholarConfig,
        fetcher: Arc<dyn PaperFetcher>,
        llm: Arc<dyn LLMClient>,
    ) -> Self {
        let tools = vec![fetcher.name().to_string()];
        let workflow = Arc::new(ResearchWorkflow::new(
            fetcher,
            llm,
            WorkflowConfig::from_config(&config),
        ));
        Self::with_runner(config, workflow, tools)
    }

    /// Build state around any workflow runner.
    pub fn with_runner(
        config: ScholarConfig,
        runner: Arc<dyn WorkflowRunner>,
        tools: Vec<String>,
    ) -> Self {
        let cache = research::cache::from_config(&config.cache);
        Self {
            config: Arc::new(config),
            service: ResearchService::new(cache, runner),
            tools: Arc::new(tools),
        }
    }
}
