//! Research pipeline
//!
//! Turns a free-text query into a ranked list of scored papers.
//!
//! # Architecture
//!
//! - [`workflow::ResearchWorkflow`] - researcher stage (paper search) then
//!   analyst stage (LLM summaries and scores); returns raw text
//! - [`extract`] - recovers and validates the paper list from that text
//! - [`cache::InMemoryResponseCache`] - TTL cache keyed by normalized query
//! - [`service::ResearchService`] - ties them together with single-flight
//!   execution per query
//!
//! # Usage
//!
//! ```ignore
//! use scholar::research::{cache, service::ResearchService, workflow::ResearchWorkflow};
//!
//! let workflow = Arc::new(ResearchWorkflow::new(fetcher, llm, WorkflowConfig::default()));
//! let service = ResearchService::new(cache::from_config(&config.cache), workflow);
//!
//! let response = service.handle("graph neural networks").await?;
//! for paper in response.papers {
//!     println!("{} ({})", paper.title, paper.matching_score);
//! }
//! ```

/// Query cache with TTL and normalized keys.
pub mod cache;
/// JSON recovery and validation of generated output.
pub mod extract;
/// Request handling with single-flight execution.
pub mod service;
/// Researcher and analyst stages.
pub mod workflow;
