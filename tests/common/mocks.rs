//! Mock implementations for testing.
//!
//! Mock fetchers, LLM clients and workflow runners shared by the
//! integration tests. Each one counts its calls so tests can assert that
//! cached or joined requests did not reach the pipeline.

#![allow(dead_code)]

use async_trait::async_trait;
use parking_lot::Mutex;
use scholar::llm::LLMClient;
use scholar::research::workflow::WorkflowRunner;
use scholar::tools::{PaperFetcher, RawPaper};
use scholar::types::{AppError, Result};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Mock LLM client returning a fixed reply.
pub struct MockLLMClient {
    response: String,
    should_fail: bool,
    calls: AtomicUsize,
    prompts: Mutex<Vec<String>>,
}

impl MockLLMClient {
    /// Create a new mock client that returns the given response.
    pub fn new(response: &str) -> Arc<Self> {
        Arc::new(Self {
            response: response.to_string(),
            should_fail: false,
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        })
    }

    /// Create a mock client that always returns an error.
    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            response: String::new(),
            should_fail: true,
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// User prompts received so far.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().clone()
    }
}

#[async_trait]
impl LLMClient for MockLLMClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.generate_with_system("", prompt).await
    }

    async fn generate_with_system(&self, _system: &str, prompt: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().push(prompt.to_string());
        if self.should_fail {
            return Err(AppError::Generation("Mock LLM failure".to_string()));
        }
        Ok(self.response.clone())
    }

    fn model_name(&self) -> &str {
        "mock-model"
    }
}

/// Mock paper source returning a fixed list.
pub struct MockFetcher {
    papers: Vec<RawPaper>,
    error: Option<AppError>,
    delay: Duration,
    calls: AtomicUsize,
}

impl MockFetcher {
    pub fn new(papers: Vec<RawPaper>) -> Arc<Self> {
        Self::build(papers, None, Duration::ZERO)
    }

    /// A fetcher that sleeps before answering, to widen race windows.
    pub fn slow(papers: Vec<RawPaper>, delay: Duration) -> Arc<Self> {
        Self::build(papers, None, delay)
    }

    pub fn failing(error: AppError) -> Arc<Self> {
        Self::build(vec![], Some(error), Duration::ZERO)
    }

    fn build(papers: Vec<RawPaper>, error: Option<AppError>, delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            papers,
            error,
            delay,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PaperFetcher for MockFetcher {
    async fn fetch(&self, _query: &str, max_results: usize) -> Result<Vec<RawPaper>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if let Some(error) = &self.error {
            return Err(error.clone());
        }
        Ok(self.papers.iter().take(max_results).cloned().collect())
    }

    fn name(&self) -> &str {
        "mock_search"
    }
}

/// Workflow runner that skips fetching and generation entirely.
pub struct MockRunner {
    reply: Result<String>,
    delay: Duration,
    calls: AtomicUsize,
}

impl MockRunner {
    pub fn new(reply: &str) -> Arc<Self> {
        Self::with_result(Ok(reply.to_string()), Duration::ZERO)
    }

    pub fn failing(error: AppError) -> Arc<Self> {
        Self::with_result(Err(error), Duration::ZERO)
    }

    pub fn with_result(reply: Result<String>, delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            reply,
            delay,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl WorkflowRunner for MockRunner {
    async fn run(&self, _query: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.reply.clone()
    }
}

/// A raw arXiv record with predictable fields.
pub fn raw_paper(title: &str, id: &str) -> RawPaper {
    RawPaper {
        title: title.to_string(),
        pdf_link: format!("https://arxiv.org/pdf/{}", id),
        authors: vec!["Ada Lovelace".to_string(), "Alan Turing".to_string()],
        summary: format!("Abstract of {}.", title),
        published: Some("2024-01-15T00:00:00Z".to_string()),
        arxiv_id: Some(id.to_string()),
    }
}
