//! arXiv search via the public Atom API
//!
//! Queries `export.arxiv.org/api/query`, sorted by relevance, and parses
//! the Atom feed with `quick-xml`.

use std::time::Duration;

use async_trait::async_trait;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

use crate::tools::{PaperFetcher, RawPaper};
use crate::types::{AppError, Result};

/// Hard upper bound on results requested per search.
pub const MAX_RESULTS_LIMIT: usize = 100;

/// Conversational prefixes stripped before building the search expression.
/// Longer phrases come first so they win over their own suffixes.
const NOISE_PHRASES: &[&str] = &[
    "show me papers on",
    "show me papers about",
    "find papers on",
    "find papers about",
    "search for papers on",
    "search for papers about",
    "search for",
    "find me",
    "show me",
    "papers on",
    "papers about",
    "research on",
    "research about",
    "i want to find",
    "i want to see",
    "can you find",
    "can you show",
    "looking for",
    "look for",
];

const QUESTION_WORDS: &[&str] = &["how", "what", "why", "which"];

/// `[arxiv]` section of `scholar.toml`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArxivConfig {
    /// Atom API endpoint
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Papers requested per query (1..=100)
    #[serde(default = "default_max_results")]
    pub max_results: usize,

    /// Bound on the whole fetch, in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_base_url() -> String {
    "https://export.arxiv.org/api/query".to_string()
}

fn default_max_results() -> usize {
    10
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_user_agent() -> String {
    format!("scholar-server/{}", env!("CARGO_PKG_VERSION"))
}

impl Default for ArxivConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            max_results: default_max_results(),
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

impl ArxivConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Build the arXiv `search_query` expression for a user query.
///
/// Title-like queries (containing a colon, or five or more words without a
/// question word) are searched as an exact phrase; everything else as loose
/// terms over title and abstract.
pub fn build_arxiv_query(query: &str) -> String {
    let query = query.trim().to_lowercase();

    let mut clean = query.clone();
    for phrase in NOISE_PHRASES {
        clean = clean.replace(phrase, "");
    }
    let mut clean = clean.split_whitespace().collect::<Vec<_>>().join(" ");
    if clean.is_empty() {
        clean = query;
    }

    let words: Vec<&str> = clean.split_whitespace().collect();
    let is_question = words
        .iter()
        .any(|w| QUESTION_WORDS.contains(&w.trim_matches(|c: char| !c.is_alphanumeric())));
    let is_likely_title = clean.contains(':') || (words.len() >= 5 && !is_question);

    if is_likely_title {
        format!("ti:\"{0}\" OR abs:\"{0}\"", clean)
    } else {
        format!("ti:{0} OR abs:{0}", clean)
    }
}

/// Client for the arXiv Atom API
#[derive(Clone)]
pub struct ArxivFetcher {
    http: Client,
    base_url: String,
}

impl ArxivFetcher {
    pub fn new(config: &ArxivConfig) -> Result<Self> {
        let http = Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.timeout())
            .build()
            .map_err(|e| AppError::Configuration(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: config.base_url.clone(),
        })
    }

    /// Point the fetcher at another endpoint, e.g. a mock server.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl PaperFetcher for ArxivFetcher {
    async fn fetch(&self, query: &str, max_results: usize) -> Result<Vec<RawPaper>> {
        let query = query.trim();
        if query.is_empty() {
            return Err(AppError::InvalidInput("Query cannot be empty".to_string()));
        }
        if max_results == 0 {
            return Err(AppError::InvalidInput(
                "max_results must be at least 1".to_string(),
            ));
        }
        let max_results = if max_results > MAX_RESULTS_LIMIT {
            tracing::warn!(
                requested = max_results,
                limit = MAX_RESULTS_LIMIT,
                "max_results too high, limiting"
            );
            MAX_RESULTS_LIMIT
        } else {
            max_results
        };

        let search_query = build_arxiv_query(query);
        let max_results_param = max_results.to_string();
        tracing::info!(search_query = %search_query, max_results, "Searching arXiv");

        let response = self
            .http
            .get(&self.base_url)
            .query(&[
                ("search_query", search_query.as_str()),
                ("start", "0"),
                ("max_results", max_results_param.as_str()),
                ("sortBy", "relevance"),
                ("sortOrder", "descending"),
            ])
            .send()
            .await
            .map_err(|e| AppError::Fetch(format!("arXiv request failed: {}", e)))?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(AppError::Fetch(
                "arXiv rate limit exceeded (HTTP 429)".to_string(),
            ));
        }
        if !status.is_success() {
            return Err(AppError::Fetch(format!("arXiv API error: HTTP {}", status)));
        }

        let body = response
            .text()
            .await
            .map_err(|e| AppError::Fetch(format!("Failed to read arXiv response: {}", e)))?;

        let papers = parse_atom_feed(&body)?;
        tracing::info!(count = papers.len(), query = %query, "arXiv search complete");
        Ok(papers)
    }

    fn name(&self) -> &str {
        "search_arxiv"
    }
}

// ============= Atom Feed Parsing =============

#[derive(Default)]
struct EntryBuilder {
    id: String,
    title: String,
    summary: String,
    published: String,
    authors: Vec<String>,
    pdf_link: Option<String>,
}

impl EntryBuilder {
    fn push_text(&mut self, element: &str, in_author: bool, text: &str) {
        let target = match element {
            "id" => &mut self.id,
            "title" => &mut self.title,
            "summary" => &mut self.summary,
            "published" => &mut self.published,
            "name" if in_author => {
                self.authors.push(collapse_whitespace(text));
                return;
            }
            _ => return,
        };
        if !target.is_empty() {
            target.push(' ');
        }
        target.push_str(text);
    }

    fn build(self) -> Option<RawPaper> {
        let title = collapse_whitespace(&self.title);
        if title.is_empty() {
            return None;
        }

        let id = self.id.trim();
        let arxiv_id = id.rsplit('/').next().filter(|s| !s.is_empty()).map(str::to_string);
        let pdf_link = self
            .pdf_link
            .or_else(|| arxiv_id.as_ref().map(|id| format!("https://arxiv.org/pdf/{}", id)))
            .unwrap_or_default();
        let published = self.published.trim();

        Some(RawPaper {
            title,
            pdf_link,
            authors: self.authors,
            summary: collapse_whitespace(&self.summary),
            published: (!published.is_empty()).then(|| published.to_string()),
            arxiv_id,
        })
    }
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn pdf_href(element: &BytesStart<'_>) -> Option<String> {
    let mut href = None;
    let mut is_pdf = false;
    for attr in element.attributes().flatten() {
        let value = attr.unescape_value().ok()?;
        match attr.key.as_ref() {
            b"title" if value == "pdf" => is_pdf = true,
            b"href" => href = Some(value.into_owned()),
            _ => {}
        }
    }
    href.filter(|_| is_pdf)
}

/// Parse an arXiv Atom feed into raw papers.
///
/// arXiv reports query errors as a single entry whose id points at
/// `/api/errors`; those become `AppError::Fetch`.
pub fn parse_atom_feed(xml: &str) -> Result<Vec<RawPaper>> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut papers = Vec::new();
    let mut path: Vec<String> = Vec::new();
    let mut entry: Option<EntryBuilder> = None;

    loop {
        let event = reader
            .read_event()
            .map_err(|e| AppError::Fetch(format!("Malformed arXiv feed: {}", e)))?;

        match event {
            Event::Start(e) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                if name == "entry" {
                    entry = Some(EntryBuilder::default());
                } else if name == "link" {
                    if let (Some(builder), Some(href)) = (entry.as_mut(), pdf_href(&e)) {
                        builder.pdf_link = Some(href);
                    }
                }
                path.push(name);
            }
            Event::Empty(e) => {
                if e.name().as_ref() == b"link" {
                    if let (Some(builder), Some(href)) = (entry.as_mut(), pdf_href(&e)) {
                        builder.pdf_link = Some(href);
                    }
                }
            }
            Event::Text(e) => {
                if let (Some(builder), Some(element)) = (entry.as_mut(), path.last()) {
                    let text = e
                        .unescape()
                        .map_err(|err| AppError::Fetch(format!("Malformed arXiv feed: {}", err)))?;
                    let in_author = path.iter().any(|p| p == "author");
                    builder.push_text(element, in_author, &text);
                }
            }
            Event::CData(e) => {
                if let (Some(builder), Some(element)) = (entry.as_mut(), path.last()) {
                    let text = String::from_utf8_lossy(&e.into_inner()).into_owned();
                    let in_author = path.iter().any(|p| p == "author");
                    builder.push_text(element, in_author, &text);
                }
            }
            Event::End(e) => {
                path.pop();
                if e.name().as_ref() == b"entry" {
                    if let Some(builder) = entry.take() {
                        if builder.id.contains("/api/errors") {
                            return Err(AppError::Fetch(format!(
                                "arXiv rejected the query: {}",
                                collapse_whitespace(&builder.summary)
                            )));
                        }
                        match builder.build() {
                            Some(paper) => papers.push(paper),
                            None => tracing::warn!("Skipping arXiv entry without a title"),
                        }
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(papers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom" xmlns:arxiv="http://arxiv.org/schemas/atom">
  <title type="html">ArXiv Query: search_query=ti:graph neural networks</title>
  <id>http://arxiv.org/api/abc</id>
  <entry>
    <id>http://arxiv.org/abs/1710.10903v3</id>
    <published>2017-10-30T17:41:38Z</published>
    <title>Graph Attention
      Networks</title>
    <summary>  We present graph attention networks (GATs), novel neural network
      architectures that operate on graph-structured data &amp; more.</summary>
    <author><name>Petar Veličković</name></author>
    <author><name>Guillem Cucurull</name><arxiv:affiliation>Cambridge</arxiv:affiliation></author>
    <link href="http://arxiv.org/abs/1710.10903v3" rel="alternate" type="text/html"/>
    <link title="pdf" href="http://arxiv.org/pdf/1710.10903v3" rel="related" type="application/pdf"/>
    <arxiv:primary_category term="stat.ML" scheme="http://arxiv.org/schemas/atom"/>
  </entry>
  <entry>
    <id>http://arxiv.org/abs/1609.02907v4</id>
    <published>2016-09-09T19:48:29Z</published>
    <title>Semi-Supervised Classification with Graph Convolutional Networks</title>
    <summary>We present a scalable approach.</summary>
    <author><name>Thomas N. Kipf</name></author>
  </entry>
</feed>"#;

    #[test]
    fn test_parse_feed() {
        let papers = parse_atom_feed(FEED).unwrap();
        assert_eq!(papers.len(), 2);

        let gat = &papers[0];
        assert_eq!(gat.title, "Graph Attention Networks");
        assert_eq!(gat.pdf_link, "http://arxiv.org/pdf/1710.10903v3");
        assert_eq!(gat.authors, vec!["Petar Veličković", "Guillem Cucurull"]);
        assert!(gat.summary.starts_with("We present graph attention networks"));
        assert!(gat.summary.ends_with("graph-structured data & more."));
        assert_eq!(gat.arxiv_id.as_deref(), Some("1710.10903v3"));
        assert_eq!(gat.published.as_deref(), Some("2017-10-30T17:41:38Z"));
    }

    #[test]
    fn test_pdf_link_derived_from_id() {
        let papers = parse_atom_feed(FEED).unwrap();
        assert_eq!(papers[1].pdf_link, "https://arxiv.org/pdf/1609.02907v4");
    }

    #[test]
    fn test_empty_feed() {
        let xml = r#"<feed xmlns="http://www.w3.org/2005/Atom"><title>empty</title></feed>"#;
        assert!(parse_atom_feed(xml).unwrap().is_empty());
    }

    #[test]
    fn test_error_entry() {
        let xml = r#"<feed xmlns="http://www.w3.org/2005/Atom">
          <entry>
            <id>http://arxiv.org/api/errors#incorrect_id_format_for_1234</id>
            <title>Error</title>
            <summary>incorrect id format for 1234</summary>
          </entry>
        </feed>"#;
        let err = parse_atom_feed(xml).unwrap_err();
        assert_eq!(err.kind(), "fetch_error");
        assert!(err.to_string().contains("incorrect id format"));
    }

    #[rstest]
    #[case("graph neural networks", "ti:graph neural networks OR abs:graph neural networks")]
    #[case("Show me papers on Transformers", "ti:transformers OR abs:transformers")]
    #[case("  search for   diffusion models ", "ti:diffusion models OR abs:diffusion models")]
    #[case("BERT: Pre-training of Deep Bidirectional Transformers", "ti:\"bert: pre-training of deep bidirectional transformers\" OR abs:\"bert: pre-training of deep bidirectional transformers\"")]
    #[case("retrieval augmented generation for code models", "ti:\"retrieval augmented generation for code models\" OR abs:\"retrieval augmented generation for code models\"")]
    #[case("how do large language models reason", "ti:how do large language models reason OR abs:how do large language models reason")]
    #[case("search for", "ti:search for OR abs:search for")]
    fn test_build_arxiv_query(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(build_arxiv_query(input), expected);
    }

    #[tokio::test]
    async fn test_fetch_rejects_invalid_arguments() {
        let fetcher = ArxivFetcher::new(&ArxivConfig::default()).unwrap();

        let err = fetcher.fetch("   ", 5).await.unwrap_err();
        assert!(err.is_client_error());

        let err = fetcher.fetch("transformers", 0).await.unwrap_err();
        assert!(err.is_client_error());
    }

    #[test]
    fn test_config_defaults() {
        let config = ArxivConfig::default();
        assert_eq!(config.max_results, 10);
        assert_eq!(config.timeout(), Duration::from_secs(30));
        assert!(config.base_url.ends_with("/api/query"));
    }
}
