//! Crawl loop - page iteration, deduplication and stop policy
//!
//! The loop walks listing pages strictly in order, starting at page 1:
//! - Fetching each page through a [`PageFetcher`]
//! - Stopping on an explicit end-of-data signal or an empty page
//! - Filtering incomplete and duplicate records
//! - Pausing between pages through an injected [`Delay`]
//!
//! Fetch failures are not retried. They abort the run and hand back the
//! records accepted before the failing page.

use crate::config::Config;
use crate::crawler::fetcher::{FetchError, PageFetcher, PageRequest};
use crate::crawler::pacing::{Delay, TokioDelay};
use crate::extraction::ExtractionStrategy;
use crate::record::{Record, RequiredFields};
use crate::state::{CrawlState, SessionId, StopReason};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::Instrument;

/// Parameters of one crawl run
#[derive(Clone)]
pub struct CrawlParams {
    /// Hard ceiling on the number of pages fetched
    pub max_pages: u32,

    /// Wait between successful page fetches
    pub pause: Duration,

    pub base_url: String,

    pub selector: String,

    pub strategy: Arc<dyn ExtractionStrategy>,

    /// Field whose value identifies a record
    pub identity_field: String,

    pub required_fields: RequiredFields,
}

impl CrawlParams {
    /// Builds run parameters from configuration and an extraction strategy
    pub fn from_config(config: &Config, strategy: Arc<dyn ExtractionStrategy>) -> Self {
        Self {
            max_pages: config.crawler.max_pages,
            pause: Duration::from_secs(config.crawler.pause_seconds),
            base_url: config.crawler.base_url.clone(),
            selector: config.crawler.css_selector.clone(),
            strategy,
            identity_field: config.record.identity_field.clone(),
            required_fields: RequiredFields::new(config.record.required_fields.iter().cloned()),
        }
    }
}

/// Result of a crawl run that ended normally
#[derive(Debug, Clone)]
pub struct CrawlReport {
    /// Accepted records, in first-accepted order
    pub records: Vec<Record>,

    /// Number of page fetches performed
    pub pages_fetched: u32,

    pub stop_reason: StopReason,

    pub session_id: SessionId,

    pub started_at: DateTime<Utc>,

    pub finished_at: DateTime<Utc>,
}

/// A crawl run aborted by a page fetch failure
#[derive(Debug, Error)]
#[error("Crawl aborted on page {page}: {source}")]
pub struct CrawlAborted {
    /// Page whose fetch failed
    pub page: u32,

    /// Records accepted before the failing page
    pub partial: Vec<Record>,

    pub source: FetchError,
}

/// Sequential page crawler
///
/// The loop itself holds no per-run state; every call to [`CrawlLoop::run`]
/// builds its own [`CrawlState`] and session id.
pub struct CrawlLoop<F, D = TokioDelay> {
    fetcher: F,
    delay: D,
}

impl<F: PageFetcher> CrawlLoop<F, TokioDelay> {
    /// Creates a loop that pauses on the tokio timer
    pub fn new(fetcher: F) -> Self {
        Self::with_delay(fetcher, TokioDelay)
    }
}

impl<F: PageFetcher, D: Delay> CrawlLoop<F, D> {
    /// Creates a loop with a custom pause primitive
    pub fn with_delay(fetcher: F, delay: D) -> Self {
        Self { fetcher, delay }
    }

    /// Runs one crawl
    ///
    /// Per page:
    /// 1. Fetch the page with the run's session id
    /// 2. Stop if the page signals no more results (its records are discarded)
    /// 3. Stop if the page returned no records
    /// 4. Keep complete records whose identity is non-empty and unseen
    /// 5. Stop after `max_pages`, otherwise pause and continue
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlReport)` - The run ended on one of the stop conditions
    /// * `Err(CrawlAborted)` - A fetch failed; carries the partial records
    pub async fn run(&self, params: &CrawlParams) -> Result<CrawlReport, CrawlAborted> {
        let session_id = SessionId::generate();
        let span = tracing::info_span!("crawl", session = %session_id);
        self.run_session(params, session_id).instrument(span).await
    }

    async fn run_session(
        &self,
        params: &CrawlParams,
        session_id: SessionId,
    ) -> Result<CrawlReport, CrawlAborted> {
        let started_at = Utc::now();
        let mut state = CrawlState::new(session_id);

        tracing::info!(
            "Starting crawl of {} (up to {} pages)",
            params.base_url,
            params.max_pages
        );

        if params.max_pages == 0 {
            state.finish(StopReason::MaxPages { max_pages: 0 });
        }

        while !state.is_finished() {
            let page = state.page();

            let request = PageRequest {
                page,
                session_id: state.session_id(),
                base_url: &params.base_url,
                selector: &params.selector,
                strategy: params.strategy.as_ref(),
                required_fields: &params.required_fields,
            };

            let fetched = self.fetcher.fetch(&request).await;
            let result = match fetched {
                Ok(result) => result,
                Err(source) => {
                    tracing::error!("Error fetching page {}: {}", page, source);
                    return Err(CrawlAborted {
                        page,
                        partial: state.into_records(),
                        source,
                    });
                }
            };
            state.record_fetch();

            if result.no_more_results {
                tracing::info!("No more results found on page {}. Ending crawl.", page);
                state.finish(StopReason::EndOfData { page });
                break;
            }

            if result.records.is_empty() {
                tracing::info!("No records extracted from page {}. Ending crawl.", page);
                state.finish(StopReason::EmptyPage { page });
                break;
            }

            let tally = state.absorb(
                result.records,
                &params.identity_field,
                &params.required_fields,
            );
            tracing::info!(
                "Page {}: accepted {} record(s) ({} incomplete, {} unidentified, {} duplicate)",
                page,
                tally.accepted,
                tally.incomplete,
                tally.unidentified,
                tally.duplicates
            );

            if state.advance(params.max_pages) {
                self.delay.pause(params.pause).await;
            }
        }

        let stop_reason = state
            .stop_reason()
            .unwrap_or(StopReason::MaxPages {
                max_pages: params.max_pages,
            });
        tracing::info!(
            "Crawl finished: {} record(s) from {} page(s), {}",
            state.records().len(),
            state.fetches(),
            stop_reason
        );

        let pages_fetched = state.fetches();
        let session_id = state.session_id().clone();

        Ok(CrawlReport {
            records: state.into_records(),
            pages_fetched,
            stop_reason,
            session_id,
            started_at,
            finished_at: Utc::now(),
        })
    }
}
