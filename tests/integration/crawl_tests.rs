//! Integration tests for the crawler
//!
//! These tests use wiremock to stand in for both the listing site and the
//! LLM API, and run full research cycles end-to-end.

use serde_json::json;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use venue_crawler::config::{
    Config, CrawlerConfig, ExtractionConfig, OutputConfig, RecordConfig, UserAgentConfig,
};
use venue_crawler::crawler::{
    build_http_client, CrawlParams, FetchError, HttpPageFetcher, NoDelay,
};
use venue_crawler::extraction::{ExtractionError, LlmExtractionStrategy};
use venue_crawler::output::CsvSink;
use venue_crawler::record::RecordSchema;
use venue_crawler::{CrawlerError, ResearchAgent, ResearchOutcome, StopReason};
use wiremock::matchers::{body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const LISTING_PAGE: &str = r#"<html><body>
    <div class="info-container-1"><h3>Ashton Gardens</h3><span>Sugar Hill, GA</span></div>
    <div class="info-container-2"><h3>The Estate Buckhead</h3><span>Atlanta, GA</span></div>
</body></html>"#;

const EMPTY_LISTING: &str = r#"<html><body><h2>No Results Found</h2></body></html>"#;

/// Creates a test configuration pointing at the mock site and mock LLM
fn create_test_config(site: &str, llm: &str, csv_path: &Path) -> Config {
    Config {
        crawler: CrawlerConfig {
            base_url: format!("{}/venues", site),
            css_selector: "[class^='info-container']".to_string(),
            max_pages: 5,
            pause_seconds: 0,
            no_results_marker: "No Results Found".to_string(),
        },
        user_agent: UserAgentConfig {
            crawler_name: "TestBot".to_string(),
            crawler_version: "1.0.0".to_string(),
            contact_url: "https://example.com/contact".to_string(),
            contact_email: "test@example.com".to_string(),
        },
        extraction: ExtractionConfig {
            api_base: llm.to_string(),
            ..ExtractionConfig::default()
        },
        record: RecordConfig {
            identity_field: "name".to_string(),
            required_fields: vec![
                "name".to_string(),
                "location".to_string(),
                "rating".to_string(),
            ],
            numeric_fields: vec!["rating".to_string()],
        },
        output: OutputConfig {
            csv_path: csv_path.display().to_string(),
        },
    }
}

/// Builds an agent that skips the pause and uses a fixed API key
fn create_agent(config: &Config) -> ResearchAgent {
    let client = build_http_client(&config.user_agent).expect("Failed to build client");
    let schema = RecordSchema::from_config(&config.record);
    let strategy =
        LlmExtractionStrategy::new(&config.extraction, &schema, client.clone(), "test-key");
    let fetcher = HttpPageFetcher::new(client, config.crawler.no_results_marker.clone());

    ResearchAgent::new(
        Arc::new(fetcher),
        Arc::new(NoDelay),
        Arc::new(CsvSink::new(schema)),
        CrawlParams::from_config(config, Arc::new(strategy)),
        &config.output.csv_path,
    )
}

/// Chat completion response whose message content is `records` as JSON
fn completion(records: serde_json::Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "id": "chatcmpl-test",
        "object": "chat.completion",
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": records.to_string() },
            "finish_reason": "stop"
        }]
    }))
}

async fn mount_page(server: &MockServer, page: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path("/venues"))
        .and(query_param("page", page))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body)
                .insert_header("content-type", "text/html"),
        )
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_full_crawl_until_no_results() {
    let site = MockServer::start().await;
    let llm = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let csv_path = dir.path().join("venues.csv");

    mount_page(&site, "1", LISTING_PAGE).await;
    mount_page(&site, "2", EMPTY_LISTING).await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("authorization", "Bearer test-key"))
        .and(body_string_contains("deepseek-r1-distill-llama-70b"))
        .and(body_string_contains("Ashton Gardens"))
        .respond_with(completion(json!([
            {"name": "Ashton Gardens", "location": "Sugar Hill, GA", "rating": 4.7, "error": false},
            {"name": "The Estate Buckhead", "location": "Atlanta, GA", "rating": 5}
        ])))
        .expect(1)
        .mount(&llm)
        .await;

    let config = create_test_config(&site.uri(), &llm.uri(), &csv_path);
    let agent = create_agent(&config);

    let report = agent
        .run(config.crawler.max_pages, Duration::ZERO)
        .await
        .expect("Crawl failed");

    assert_eq!(report.crawl.pages_fetched, 2);
    assert_eq!(report.crawl.stop_reason, StopReason::EndOfData { page: 2 });
    assert_eq!(
        report.outcome,
        ResearchOutcome::Saved {
            count: 2,
            destination: csv_path.clone(),
        }
    );

    let content = std::fs::read_to_string(&csv_path).expect("CSV not written");
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(
        lines,
        vec![
            "name,location,rating",
            "Ashton Gardens,\"Sugar Hill, GA\",4.7",
            "The Estate Buckhead,\"Atlanta, GA\",5",
        ]
    );
}

#[tokio::test]
async fn test_duplicates_across_pages_are_merged() {
    let site = MockServer::start().await;
    let llm = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let csv_path = dir.path().join("venues.csv");

    // Both pages serve the same listing
    mount_page(&site, "1", LISTING_PAGE).await;
    mount_page(&site, "2", LISTING_PAGE).await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(completion(json!([
            {"name": "Ashton Gardens", "location": "Sugar Hill, GA", "rating": 4.7},
            {"name": "The Estate Buckhead", "location": "Atlanta, GA", "rating": 5}
        ])))
        .expect(2)
        .mount(&llm)
        .await;

    let config = create_test_config(&site.uri(), &llm.uri(), &csv_path);
    let report = create_agent(&config)
        .run(2, Duration::ZERO)
        .await
        .expect("Crawl failed");

    assert_eq!(report.crawl.records.len(), 2);
    assert_eq!(report.crawl.stop_reason, StopReason::MaxPages { max_pages: 2 });
}

#[tokio::test]
async fn test_incomplete_records_are_dropped() {
    let site = MockServer::start().await;
    let llm = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let csv_path = dir.path().join("venues.csv");

    mount_page(&site, "1", LISTING_PAGE).await;
    mount_page(&site, "2", EMPTY_LISTING).await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(completion(json!([
            {"name": "Ashton Gardens", "location": "Sugar Hill, GA"},
            {"name": "The Estate Buckhead", "location": "Atlanta, GA", "rating": 5}
        ])))
        .mount(&llm)
        .await;

    let config = create_test_config(&site.uri(), &llm.uri(), &csv_path);
    let report = create_agent(&config)
        .run(5, Duration::ZERO)
        .await
        .expect("Crawl failed");

    assert_eq!(report.crawl.records.len(), 1);
    assert_eq!(
        report.crawl.records[0].identity_key("name"),
        Some("The Estate Buckhead".to_string())
    );
}

#[tokio::test]
async fn test_selector_without_matches_ends_crawl() {
    let site = MockServer::start().await;
    let llm = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let csv_path = dir.path().join("venues.csv");

    mount_page(&site, "1", "<html><body><p>Maintenance</p></body></html>").await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(completion(json!([])))
        .expect(0)
        .mount(&llm)
        .await;

    let config = create_test_config(&site.uri(), &llm.uri(), &csv_path);
    let report = create_agent(&config)
        .run(5, Duration::ZERO)
        .await
        .expect("Crawl failed");

    assert_eq!(report.outcome, ResearchOutcome::NothingFound);
    assert_eq!(report.crawl.stop_reason, StopReason::EmptyPage { page: 1 });
    assert!(!csv_path.exists());
}

#[tokio::test]
async fn test_http_error_aborts_crawl() {
    let site = MockServer::start().await;
    let llm = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let csv_path = dir.path().join("venues.csv");

    Mock::given(method("GET"))
        .and(path("/venues"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&site)
        .await;

    let config = create_test_config(&site.uri(), &llm.uri(), &csv_path);
    let result = create_agent(&config).run(5, Duration::ZERO).await;

    match result {
        Err(CrawlerError::Aborted(aborted)) => {
            assert_eq!(aborted.page, 1);
            assert!(aborted.partial.is_empty());
            assert!(matches!(
                aborted.source,
                FetchError::Status { status: 503, .. }
            ));
        }
        other => panic!("expected aborted crawl, got {:?}", other.map(|r| r.outcome)),
    }
    assert!(!csv_path.exists());
}

#[tokio::test]
async fn test_llm_error_aborts_crawl() {
    let site = MockServer::start().await;
    let llm = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let csv_path = dir.path().join("venues.csv");

    mount_page(&site, "1", LISTING_PAGE).await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid api key"))
        .mount(&llm)
        .await;

    let config = create_test_config(&site.uri(), &llm.uri(), &csv_path);
    let result = create_agent(&config).run(5, Duration::ZERO).await;

    match result {
        Err(CrawlerError::Aborted(aborted)) => match aborted.source {
            FetchError::Extraction {
                source: ExtractionError::Api { status, body },
                ..
            } => {
                assert_eq!(status, 401);
                assert_eq!(body, "invalid api key");
            }
            other => panic!("expected extraction error, got {:?}", other),
        },
        other => panic!("expected aborted crawl, got {:?}", other.map(|r| r.outcome)),
    }
}
