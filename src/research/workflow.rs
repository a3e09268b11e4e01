//! Two-stage research workflow
//!
//! The researcher stage pulls raw records from a [`PaperFetcher`]; the
//! analyst stage asks the language model to summarize and score them. The
//! result is returned as raw text: nothing here trusts the model to
//! produce well-formed JSON. See [`crate::research::extract`] for that.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::timeout;

use crate::llm::LLMClient;
use crate::research::service::RequestState;
use crate::tools::{PaperFetcher, RawPaper};
use crate::types::{AppError, Result};

/// Instructions for the analyst stage.
pub const ANALYST_SYSTEM_PROMPT: &str = r#"You are a Research Analyst specialized in evaluating academic papers.

For each paper you are given:
1. Write a concise summary (2-3 sentences) based on the abstract.
2. Assign an integer matchingScore from 0 to 100 for relevance to the query:
   - 90-100: Directly addresses the query topic
   - 70-89: Highly relevant, closely related
   - 50-69: Moderately relevant
   - 30-49: Tangentially related
   - 0-29: Minimally relevant

Output ONLY valid JSON matching this exact schema, with papers ordered from most to least relevant:
[
    {
        "title": "<paper title>",
        "pdfLink": "<pdf url>",
        "authors": ["<author>", "..."],
        "summary": "<your 2-3 sentence summary>",
        "matchingScore": <integer 0-100>
    }
]

Copy titles, PDF links and authors exactly as given. Do not invent papers."#;

/// Something that turns a query into the analyst's raw text output.
#[async_trait]
pub trait WorkflowRunner: Send + Sync {
    /// Run the full pipeline. The returned text is untrusted.
    async fn run(&self, query: &str) -> Result<String>;
}

/// Limits applied to each workflow run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkflowConfig {
    pub max_results: usize,
    pub fetch_timeout: Duration,
    pub generation_timeout: Duration,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            max_results: 10,
            fetch_timeout: Duration::from_secs(30),
            generation_timeout: Duration::from_secs(120),
        }
    }
}

impl WorkflowConfig {
    pub fn from_config(config: &crate::utils::toml_config::ScholarConfig) -> Self {
        Self {
            max_results: config.arxiv.max_results,
            fetch_timeout: config.arxiv.timeout(),
            generation_timeout: config.llm.timeout(),
        }
    }
}

/// Researcher + analyst pipeline backed by a fetcher and an LLM client.
pub struct ResearchWorkflow {
    fetcher: Arc<dyn PaperFetcher>,
    llm: Arc<dyn LLMClient>,
    config: WorkflowConfig,
}

impl ResearchWorkflow {
    pub fn new(
        fetcher: Arc<dyn PaperFetcher>,
        llm: Arc<dyn LLMClient>,
        config: WorkflowConfig,
    ) -> Self {
        Self {
            fetcher,
            llm,
            config,
        }
    }

    /// Researcher stage: fetch raw records within the fetch timeout.
    pub async fn research(&self, query: &str) -> Result<Vec<RawPaper>> {
        tracing::info!(
            state = %RequestState::Fetching,
            tool = self.fetcher.name(),
            "Researcher stage started"
        );

        let papers = timeout(
            self.config.fetch_timeout,
            self.fetcher.fetch(query, self.config.max_results),
        )
        .await
        .map_err(|_| {
            AppError::Fetch(format!(
                "Paper search timed out after {}s",
                self.config.fetch_timeout.as_secs_f64()
            ))
        })??;

        tracing::info!(count = papers.len(), "Researcher stage complete");
        Ok(papers)
    }

    /// Analyst stage: one generation call over the fetched records.
    pub async fn analyze(&self, query: &str, papers: &[RawPaper]) -> Result<String> {
        tracing::info!(
            state = %RequestState::RunningWorkflow,
            model = self.llm.model_name(),
            papers = papers.len(),
            "Analyst stage started"
        );

        let prompt = analyst_prompt(query, papers)?;
        let text = timeout(
            self.config.generation_timeout,
            self.llm.generate_with_system(ANALYST_SYSTEM_PROMPT, &prompt),
        )
        .await
        .map_err(|_| {
            AppError::Generation(format!(
                "Generation timed out after {}s",
                self.config.generation_timeout.as_secs_f64()
            ))
        })?
        .map_err(|e| match e {
            AppError::Generation(_) => e,
            other => AppError::Generation(other.to_string()),
        })?;

        if text.trim().is_empty() {
            return Err(AppError::Generation(
                "Model returned an empty response".to_string(),
            ));
        }

        tracing::debug!(chars = text.len(), "Analyst stage complete");
        Ok(text)
    }
}

#[async_trait]
impl WorkflowRunner for ResearchWorkflow {
    async fn run(&self, query: &str) -> Result<String> {
        let papers = self.research(query).await?;

        if papers.is_empty() {
            tracing::info!("No papers found, skipping analyst stage");
            return Ok(serde_json::json!({
                "query": query,
                "total_results": 0,
                "papers": [],
            })
            .to_string());
        }

        self.analyze(query, &papers).await
    }
}

fn analyst_prompt(query: &str, papers: &[RawPaper]) -> Result<String> {
    let records = serde_json::to_string_pretty(papers)
        .map_err(|e| AppError::Internal(format!("Failed to serialize papers: {}", e)))?;

    Ok(format!(
        "Original query: {}\n\nPapers found ({}):\n{}",
        query,
        papers.len(),
        records
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct StaticFetcher {
        papers: Vec<RawPaper>,
        delay: Duration,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl PaperFetcher for StaticFetcher {
        async fn fetch(&self, _query: &str, max_results: usize) -> Result<Vec<RawPaper>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            Ok(self.papers.iter().take(max_results).cloned().collect())
        }

        fn name(&self) -> &str {
            "static"
        }
    }

    struct RecordingLLM {
        reply: Result<String>,
        prompts: Mutex<Vec<(String, String)>>,
    }

    #[async_trait]
    impl LLMClient for RecordingLLM {
        async fn generate(&self, prompt: &str) -> Result<String> {
            self.generate_with_system("", prompt).await
        }

        async fn generate_with_system(&self, system: &str, prompt: &str) -> Result<String> {
            self.prompts.lock().push((system.to_string(), prompt.to_string()));
            self.reply.clone()
        }

        fn model_name(&self) -> &str {
            "recording"
        }
    }

    fn raw(title: &str) -> RawPaper {
        RawPaper {
            title: title.to_string(),
            pdf_link: format!("https://arxiv.org/pdf/{}", title.len()),
            authors: vec!["Jane Doe".to_string()],
            summary: "An abstract.".to_string(),
            published: None,
            arxiv_id: None,
        }
    }

    fn workflow(
        papers: Vec<RawPaper>,
        reply: Result<String>,
        config: WorkflowConfig,
    ) -> (ResearchWorkflow, Arc<StaticFetcher>, Arc<RecordingLLM>) {
        let fetcher = Arc::new(StaticFetcher {
            papers,
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
        });
        let llm = Arc::new(RecordingLLM {
            reply,
            prompts: Mutex::new(Vec::new()),
        });
        (
            ResearchWorkflow::new(fetcher.clone(), llm.clone(), config),
            fetcher,
            llm,
        )
    }

    #[tokio::test]
    async fn test_run_returns_raw_model_text() {
        let reply = "Here you go:\n[{\"title\": \"A\"}]".to_string();
        let (wf, fetcher, llm) = workflow(
            vec![raw("Paper A"), raw("Paper B")],
            Ok(reply.clone()),
            WorkflowConfig::default(),
        );

        assert_eq!(wf.run("graph neural networks").await.unwrap(), reply);
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);

        let prompts = llm.prompts.lock();
        assert_eq!(prompts.len(), 1);
        assert_eq!(prompts[0].0, ANALYST_SYSTEM_PROMPT);
        assert!(prompts[0].1.contains("graph neural networks"));
        assert!(prompts[0].1.contains("Paper B"));
    }

    #[tokio::test]
    async fn test_max_results_passed_to_fetcher() {
        let (wf, _, llm) = workflow(
            vec![raw("One"), raw("Two"), raw("Three")],
            Ok("[]".to_string()),
            WorkflowConfig {
                max_results: 2,
                ..Default::default()
            },
        );

        wf.run("q").await.unwrap();
        let prompts = llm.prompts.lock();
        assert!(prompts[0].1.contains("Papers found (2)"));
        assert!(!prompts[0].1.contains("Three"));
    }

    #[tokio::test]
    async fn test_no_papers_skips_generation() {
        let (wf, _, llm) = workflow(vec![], Ok("unused".to_string()), WorkflowConfig::default());

        let text = wf.run("nothing matches").await.unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["total_results"], 0);
        assert!(llm.prompts.lock().is_empty());
    }

    #[tokio::test]
    async fn test_blank_generation_is_error() {
        let (wf, _, _) = workflow(
            vec![raw("A")],
            Ok("  \n".to_string()),
            WorkflowConfig::default(),
        );
        let err = wf.run("q").await.unwrap_err();
        assert_eq!(err.kind(), "generation_error");
    }

    #[tokio::test]
    async fn test_provider_error_becomes_generation_error() {
        let (wf, _, _) = workflow(
            vec![raw("A")],
            Err(AppError::Internal("connection refused".to_string())),
            WorkflowConfig::default(),
        );
        let err = wf.run("q").await.unwrap_err();
        assert_eq!(err.kind(), "generation_error");
        assert!(err.to_string().contains("connection refused"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetch_timeout_is_fetch_error() {
        let fetcher = Arc::new(StaticFetcher {
            papers: vec![raw("A")],
            delay: Duration::from_secs(60),
            calls: AtomicUsize::new(0),
        });
        let llm = Arc::new(RecordingLLM {
            reply: Ok("[]".to_string()),
            prompts: Mutex::new(Vec::new()),
        });
        let wf = ResearchWorkflow::new(
            fetcher,
            llm.clone(),
            WorkflowConfig {
                fetch_timeout: Duration::from_secs(5),
                ..Default::default()
            },
        );

        let err = wf.run("q").await.unwrap_err();
        assert_eq!(err.kind(), "fetch_error");
        assert!(llm.prompts.lock().is_empty());
    }
}
