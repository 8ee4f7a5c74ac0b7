//! Research agent - one crawl plus persistence
//!
//! The agent wires the crawl loop to its production collaborators, runs it
//! with caller-chosen limits and writes the result through the sink when
//! there is anything to write.

use crate::config::Config;
use crate::crawler::{
    build_http_client, CrawlLoop, CrawlParams, CrawlReport, Delay, HttpPageFetcher, PageFetcher,
    TokioDelay,
};
use crate::extraction::LlmExtractionStrategy;
use crate::output::{CsvSink, ResultSink};
use crate::record::RecordSchema;
use crate::CrawlerError;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// What happened to the records of a finished crawl
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResearchOutcome {
    /// The crawl accepted no records; nothing was written
    NothingFound,

    /// `count` records were written to `destination`
    Saved { count: usize, destination: PathBuf },
}

/// A finished research run
#[derive(Debug, Clone)]
pub struct ResearchReport {
    pub crawl: CrawlReport,
    pub outcome: ResearchOutcome,
}

/// Runs crawls and persists their results
pub struct ResearchAgent {
    crawler: CrawlLoop<Arc<dyn PageFetcher>, Arc<dyn Delay>>,
    sink: Arc<dyn ResultSink>,
    params: CrawlParams,
    destination: PathBuf,
}

impl ResearchAgent {
    /// Creates an agent from explicit collaborators
    ///
    /// `params` supplies everything except the page limit and pause, which
    /// are chosen per run.
    pub fn new(
        fetcher: Arc<dyn PageFetcher>,
        delay: Arc<dyn Delay>,
        sink: Arc<dyn ResultSink>,
        params: CrawlParams,
        destination: impl Into<PathBuf>,
    ) -> Self {
        Self {
            crawler: CrawlLoop::with_delay(fetcher, delay),
            sink,
            params,
            destination: destination.into(),
        }
    }

    /// Creates an agent with the HTTP fetcher, LLM extraction and CSV output
    ///
    /// Fails if the LLM API key is not set in the environment.
    pub fn from_config(config: &Config) -> Result<Self, CrawlerError> {
        let client = build_http_client(&config.user_agent)?;
        let schema = RecordSchema::from_config(&config.record);

        let strategy =
            LlmExtractionStrategy::from_config(&config.extraction, &schema, client.clone())?;
        let fetcher = HttpPageFetcher::new(client, config.crawler.no_results_marker.clone());
        let params = CrawlParams::from_config(config, Arc::new(strategy));

        Ok(Self::new(
            Arc::new(fetcher),
            Arc::new(TokioDelay),
            Arc::new(CsvSink::new(schema)),
            params,
            &config.output.csv_path,
        ))
    }

    /// Where results are written
    pub fn destination(&self) -> &Path {
        &self.destination
    }

    /// Default limits taken from the parameters the agent was built with
    pub fn default_limits(&self) -> (u32, Duration) {
        (self.params.max_pages, self.params.pause)
    }

    /// Crawls up to `max_pages` pages, pausing `pause` between them, and
    /// saves the records if any were accepted
    ///
    /// A fetch failure aborts the run; partial records are discarded and the
    /// error is returned.
    pub async fn run(&self, max_pages: u32, pause: Duration) -> Result<ResearchReport, CrawlerError> {
        let params = CrawlParams {
            max_pages,
            pause,
            ..self.params.clone()
        };

        let crawl = match self.crawler.run(&params).await {
            Ok(report) => report,
            Err(aborted) => {
                tracing::error!(
                    "Crawl aborted on page {}; discarding {} partial record(s)",
                    aborted.page,
                    aborted.partial.len()
                );
                return Err(aborted.into());
            }
        };

        let outcome = if crawl.records.is_empty() {
            tracing::info!("No venues collected during the crawl.");
            ResearchOutcome::NothingFound
        } else {
            self.sink.save(&crawl.records, &self.destination)?;
            tracing::info!(
                "Saved {} venues to '{}'.",
                crawl.records.len(),
                self.destination.display()
            );
            ResearchOutcome::Saved {
                count: crawl.records.len(),
                destination: self.destination.clone(),
            }
        };

        Ok(ResearchReport { crawl, outcome })
    }
}
