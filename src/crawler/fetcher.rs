//! Page fetching
//!
//! This module defines the contract between the crawl loop and whatever
//! retrieves one listing page, plus the HTTP implementation:
//! - Building the HTTP client with a proper user agent string
//! - GET of `base_url?page=N`
//! - Detecting the "no more results" marker
//! - Selecting listing entries and handing them to the extraction strategy

use crate::config::{Config, UserAgentConfig};
use crate::crawler::parser::select_blocks;
use crate::extraction::{ExtractionError, ExtractionStrategy};
use crate::record::{Record, RequiredFields};
use crate::state::SessionId;
use crate::url::page_url;
use async_trait::async_trait;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Errors that abort a page fetch
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Invalid page URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("Content selection failed: {0}")]
    Selector(String),

    #[error("Extraction failed for {url}: {source}")]
    Extraction {
        url: String,
        source: ExtractionError,
    },
}

/// Everything a fetcher needs to retrieve one page
///
/// `base_url`, `selector` and `strategy` are passed through from the crawl
/// parameters untouched.
pub struct PageRequest<'a> {
    /// Page index, starting at 1
    pub page: u32,

    /// Session of the current run, identical for every page of the run
    pub session_id: &'a SessionId,

    pub base_url: &'a str,

    pub selector: &'a str,

    pub strategy: &'a dyn ExtractionStrategy,

    pub required_fields: &'a RequiredFields,
}

/// Records extracted from one page, before deduplication
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageResult {
    pub records: Vec<Record>,

    /// The page said there are no more results
    pub no_more_results: bool,
}

impl PageResult {
    /// A page carrying records
    pub fn with_records(records: Vec<Record>) -> Self {
        Self {
            records,
            no_more_results: false,
        }
    }

    /// A page signaling the end of the listing
    pub fn end_of_data() -> Self {
        Self {
            records: Vec::new(),
            no_more_results: true,
        }
    }
}

/// Retrieves and extracts one listing page
///
/// Implementations must tolerate being called repeatedly with increasing
/// page indices and the same session id.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, request: &PageRequest<'_>) -> Result<PageResult, FetchError>;
}

#[async_trait]
impl<T: PageFetcher + ?Sized> PageFetcher for Arc<T> {
    async fn fetch(&self, request: &PageRequest<'_>) -> Result<PageResult, FetchError> {
        (**self).fetch(request).await
    }
}

/// Builds an HTTP client with proper configuration
///
/// The cookie store keeps the site session alive across the pages of a run.
///
/// # Example
///
/// ```no_run
/// use venue_crawler::config::UserAgentConfig;
/// use venue_crawler::crawler::build_http_client;
///
/// let client = build_http_client(&UserAgentConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &UserAgentConfig) -> Result<Client, reqwest::Error> {
    // Format: CrawlerName/Version (+ContactURL; ContactEmail)
    let user_agent = format!(
        "{}/{} (+{}; {})",
        config.crawler_name, config.crawler_version, config.contact_url, config.contact_email
    );

    Client::builder()
        .user_agent(user_agent)
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(10))
        .cookie_store(true)
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches listing pages over HTTP
#[derive(Debug, Clone)]
pub struct HttpPageFetcher {
    client: Client,
    no_results_marker: String,
}

impl HttpPageFetcher {
    /// Creates a fetcher
    ///
    /// An empty `no_results_marker` disables end-of-data detection.
    pub fn new(client: Client, no_results_marker: impl Into<String>) -> Self {
        Self {
            client,
            no_results_marker: no_results_marker.into(),
        }
    }

    /// Creates a fetcher from configuration with its own HTTP client
    pub fn from_config(config: &Config) -> Result<Self, reqwest::Error> {
        let client = build_http_client(&config.user_agent)?;
        Ok(Self::new(client, config.crawler.no_results_marker.clone()))
    }

    fn signals_no_results(&self, body: &str) -> bool {
        !self.no_results_marker.is_empty() && body.contains(&self.no_results_marker)
    }
}

#[async_trait]
impl PageFetcher for HttpPageFetcher {
    async fn fetch(&self, request: &PageRequest<'_>) -> Result<PageResult, FetchError> {
        let url = page_url(request.base_url, request.page)?;
        tracing::info!("Loading page {} ({})", request.page, url);

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|source| FetchError::Http {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await.map_err(|source| FetchError::Http {
            url: url.to_string(),
            source,
        })?;

        if self.signals_no_results(&body) {
            tracing::debug!(
                "Page {} of session {} reports no more results",
                request.page,
                request.session_id
            );
            return Ok(PageResult::end_of_data());
        }

        let blocks = select_blocks(&body, request.selector).map_err(FetchError::Selector)?;
        if blocks.is_empty() {
            tracing::debug!(
                "Selector '{}' matched nothing on page {}",
                request.selector,
                request.page
            );
            return Ok(PageResult::default());
        }

        let extracted = request
            .strategy
            .extract(url.as_str(), &blocks)
            .await
            .map_err(|source| FetchError::Extraction {
                url: url.to_string(),
                source,
            })?;

        let total = extracted.len();
        let records: Vec<Record> = extracted
            .into_iter()
            .filter(|record| request.required_fields.is_satisfied_by(record))
            .collect();

        if records.len() < total {
            tracing::debug!(
                "Dropped {} incomplete record(s) on page {}",
                total - records.len(),
                request.page
            );
        }

        Ok(PageResult::with_records(records))
    }
}
