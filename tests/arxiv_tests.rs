use scholar::tools::PaperFetcher;
use scholar::tools::arxiv::{ArxivConfig, ArxivFetcher};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title>ArXiv Query</title>
  <entry>
    <id>http://arxiv.org/abs/2101.00001v1</id>
    <published>2021-01-01T00:00:00Z</published>
    <title>Scaling Graph Neural Networks</title>
    <summary>We scale message passing to billions of edges.</summary>
    <author><name>Grace Hopper</name></author>
    <link title="pdf" href="http://arxiv.org/pdf/2101.00001v1" rel="related" type="application/pdf"/>
  </entry>
  <entry>
    <id>http://arxiv.org/abs/2101.00002v2</id>
    <title>Oversmoothing in Deep GNNs</title>
    <summary>Depth hurts.</summary>
    <author><name>Edsger Dijkstra</name></author>
    <author><name>Barbara Liskov</name></author>
  </entry>
</feed>"#;

const EMPTY_FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title>ArXiv Query</title>
  <opensearch:totalResults xmlns:opensearch="http://a9.com/-/spec/opensearch/1.1/">0</opensearch:totalResults>
</feed>"#;

const ERROR_FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <entry>
    <id>http://arxiv.org/api/errors#incorrect_id_format_for_1234</id>
    <title>Error</title>
    <summary>incorrect id format for 1234</summary>
  </entry>
</feed>"#;

async fn fetcher_for(server: &MockServer) -> ArxivFetcher {
    ArxivFetcher::new(&ArxivConfig::default())
        .unwrap()
        .with_base_url(format!("{}/api/query", server.uri()))
}

#[tokio::test]
async fn test_fetch_parses_feed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/query"))
        .respond_with(ResponseTemplate::new(200).set_body_string(FEED))
        .expect(1)
        .mount(&server)
        .await;

    let papers = fetcher_for(&server)
        .await
        .fetch("graph neural networks", 10)
        .await
        .unwrap();

    assert_eq!(papers.len(), 2);
    assert_eq!(papers[0].title, "Scaling Graph Neural Networks");
    assert_eq!(papers[0].pdf_link, "http://arxiv.org/pdf/2101.00001v1");
    assert_eq!(papers[0].authors, vec!["Grace Hopper"]);
    assert_eq!(papers[1].pdf_link, "https://arxiv.org/pdf/2101.00002v2");
    assert_eq!(papers[1].authors, vec!["Edsger Dijkstra", "Barbara Liskov"]);
    assert!(papers[1].published.is_none());
}

#[tokio::test]
async fn test_fetch_sends_search_parameters() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/query"))
        .and(query_param("search_query", "ti:transformers OR abs:transformers"))
        .and(query_param("max_results", "5"))
        .and(query_param("sortBy", "relevance"))
        .and(query_param("sortOrder", "descending"))
        .respond_with(ResponseTemplate::new(200).set_body_string(EMPTY_FEED))
        .expect(1)
        .mount(&server)
        .await;

    let papers = fetcher_for(&server)
        .await
        .fetch("find papers on Transformers", 5)
        .await
        .unwrap();
    assert!(papers.is_empty());
}

#[tokio::test]
async fn test_fetch_clamps_max_results() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(query_param("max_results", "100"))
        .respond_with(ResponseTemplate::new(200).set_body_string(EMPTY_FEED))
        .expect(1)
        .mount(&server)
        .await;

    fetcher_for(&server)
        .await
        .fetch("diffusion", 500)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_empty_feed_is_empty_list() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string(EMPTY_FEED))
        .mount(&server)
        .await;

    let papers = fetcher_for(&server)
        .await
        .fetch("zzqxv nonsense", 10)
        .await
        .unwrap();
    assert!(papers.is_empty());
}

#[tokio::test]
async fn test_rate_limit_is_fetch_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&server)
        .await;

    let err = fetcher_for(&server)
        .await
        .fetch("transformers", 10)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "fetch_error");
    assert!(err.to_string().contains("429"));
}

#[tokio::test]
async fn test_server_error_is_fetch_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let err = fetcher_for(&server)
        .await
        .fetch("transformers", 10)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "fetch_error");
}

#[tokio::test]
async fn test_error_entry_is_fetch_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string(ERROR_FEED))
        .mount(&server)
        .await;

    let err = fetcher_for(&server)
        .await
        .fetch("1234", 10)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "fetch_error");
    assert!(err.to_string().contains("incorrect id format"));
}

#[tokio::test]
async fn test_empty_query_never_hits_network() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string(FEED))
        .expect(0)
        .mount(&server)
        .await;

    let fetcher = fetcher_for(&server).await;
    assert_eq!(
        fetcher.fetch("  ", 10).await.unwrap_err().kind(),
        "client_input_error"
    );
    assert_eq!(
        fetcher.fetch("gnn", 0).await.unwrap_err().kind(),
        "client_input_error"
    );
}

#[tokio::test]
async fn test_unreachable_host_is_fetch_error() {
    let config = ArxivConfig {
        base_url: "http://127.0.0.1:1/api/query".to_string(),
        timeout_secs: 2,
        ..Default::default()
    };

    let err = ArxivFetcher::new(&config)
        .unwrap()
        .fetch("transformers", 10)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "fetch_error");
}
