//! Request handling: cache, single-flight workflow, extraction
//!
//! Per request:
//!
//! ```text
//! received -> served_from_cache -> done
//! received -> fetching -> running_workflow -> extracting -> cached -> done
//!                  \______________\_______________\________-> failed
//! ```
//!
//! Concurrent requests for the same normalized query share one workflow
//! run. The run executes in its own task, so a caller that goes away does
//! not cancel it and the result still lands in the cache.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt, Shared};
use parking_lot::Mutex;
use tracing::Instrument;
use uuid::Uuid;

use crate::research::cache::{normalize_query, ResponseCache};
use crate::research::extract::extract;
use crate::research::workflow::WorkflowRunner;
use crate::types::{AppError, ResearchResponse, Result};

/// Longest accepted query, in characters.
pub const MAX_QUERY_CHARS: usize = 500;

type Flight = Shared<BoxFuture<'static, Result<ResearchResponse>>>;
type InflightMap = HashMap<String, Flight>;

/// Lifecycle of a single research request, used in log records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestState {
    Received,
    ServedFromCache,
    Fetching,
    RunningWorkflow,
    Extracting,
    Cached,
    Done,
    Failed,
}

impl fmt::Display for RequestState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RequestState::Received => "received",
            RequestState::ServedFromCache => "served_from_cache",
            RequestState::Fetching => "fetching",
            RequestState::RunningWorkflow => "running_workflow",
            RequestState::Extracting => "extracting",
            RequestState::Cached => "cached",
            RequestState::Done => "done",
            RequestState::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Entry point for research queries.
#[derive(Clone)]
pub struct ResearchService {
    cache: Arc<dyn ResponseCache>,
    runner: Arc<dyn WorkflowRunner>,
    inflight: Arc<Mutex<InflightMap>>,
}

impl ResearchService {
    pub fn new(cache: Arc<dyn ResponseCache>, runner: Arc<dyn WorkflowRunner>) -> Self {
        Self {
            cache,
            runner,
            inflight: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn cache(&self) -> &Arc<dyn ResponseCache> {
        &self.cache
    }

    /// Number of workflow runs currently executing.
    pub fn inflight_count(&self) -> usize {
        self.inflight.lock().len()
    }

    /// Answer a query from the cache, or run the workflow and cache the result.
    pub async fn handle(&self, query: &str) -> Result<ResearchResponse> {
        let request_id = Uuid::new_v4();
        let span = tracing::info_span!("research", %request_id);
        self.handle_inner(query).instrument(span).await
    }

    async fn handle_inner(&self, query: &str) -> Result<ResearchResponse> {
        let query = validate_query(query)?;
        let key = normalize_query(query);
        tracing::info!(state = %RequestState::Received, query = %key, "Research request");

        let flight = {
            let mut inflight = self.inflight.lock();

            if let Some(response) = self.cache.get(&key) {
                tracing::info!(
                    state = %RequestState::ServedFromCache,
                    papers = response.papers.len(),
                    "Cache hit"
                );
                return Ok(response);
            }

            match inflight.get(&key) {
                Some(flight) => {
                    tracing::info!("Joining in-flight workflow for identical query");
                    flight.clone()
                }
                None => {
                    let flight = self.start_flight(key.clone(), query.to_string());
                    inflight.insert(key, flight.clone());
                    flight
                }
            }
        };

        let result = flight.await;
        match &result {
            Ok(response) => tracing::info!(
                state = %RequestState::Done,
                papers = response.papers.len(),
                "Research request complete"
            ),
            Err(e) => tracing::warn!(
                state = %RequestState::Failed,
                error_type = e.kind(),
                error = %e,
                "Research request failed"
            ),
        }
        result
    }

    /// Spawn the workflow for `key` and return a shareable handle to its result.
    fn start_flight(&self, key: String, query: String) -> Flight {
        let runner = self.runner.clone();
        let cache = self.cache.clone();
        let registration = FlightRegistration {
            key,
            inflight: self.inflight.clone(),
            finished: false,
        };

        let task = tokio::spawn(
            async move {
                let result = run_pipeline(runner.as_ref(), &query).await;
                registration.finish(cache.as_ref(), &result);
                result
            }
            .in_current_span(),
        );

        async move {
            task.await
                .map_err(|e| AppError::Internal(format!("Research task failed: {}", e)))?
        }
        .boxed()
        .shared()
    }
}

/// Removes a flight from the in-flight map when it ends, even by panic.
struct FlightRegistration {
    key: String,
    inflight: Arc<Mutex<InflightMap>>,
    finished: bool,
}

impl FlightRegistration {
    /// Store a successful result and deregister, atomically with respect to
    /// new requests for the same key.
    fn finish(mut self, cache: &dyn ResponseCache, result: &Result<ResearchResponse>) {
        let mut inflight = self.inflight.lock();
        if let Ok(response) = result {
            cache.put(&self.key, response.clone());
            tracing::info!(state = %RequestState::Cached, key = %self.key, "Response cached");
        }
        inflight.remove(&self.key);
        self.finished = true;
    }
}

impl Drop for FlightRegistration {
    fn drop(&mut self) {
        if !self.finished {
            self.inflight.lock().remove(&self.key);
        }
    }
}

fn validate_query(query: &str) -> Result<&str> {
    let query = query.trim();
    if query.is_empty() {
        return Err(AppError::InvalidInput("Query cannot be empty".to_string()));
    }
    let chars = query.chars().count();
    if chars > MAX_QUERY_CHARS {
        return Err(AppError::InvalidInput(format!(
            "Query is {} characters long; the limit is {}",
            chars, MAX_QUERY_CHARS
        )));
    }
    Ok(query)
}

async fn run_pipeline(runner: &dyn WorkflowRunner, query: &str) -> Result<ResearchResponse> {
    let raw = runner.run(query).await?;

    tracing::info!(state = %RequestState::Extracting, chars = raw.len(), "Extracting papers");
    let extraction = extract(&raw)?;
    if extraction.papers.is_empty() {
        tracing::warn!(
            dropped = extraction.dropped,
            "Extraction produced no valid papers"
        );
    }

    Ok(ResearchResponse::new(query, extraction.papers))
}
