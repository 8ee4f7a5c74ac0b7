use crate::config::Config;
use crate::record::Record;
use crate::tool::{ResearchAgent, ResearchOutcome, ResearchTool};
use crate::CrawlerError;
use async_trait::async_trait;
use std::time::Duration;

/// Venue research exposed as a [`ResearchTool`]
///
/// Every call runs one crawl through the wrapped agent, so results are
/// also persisted whenever records were found.
pub struct VenueResearchTool {
    agent: ResearchAgent,
}

impl VenueResearchTool {
    pub fn new(agent: ResearchAgent) -> Self {
        Self { agent }
    }

    pub fn from_config(config: &Config) -> Result<Self, CrawlerError> {
        Ok(Self::new(ResearchAgent::from_config(config)?))
    }

    pub fn agent(&self) -> &ResearchAgent {
        &self.agent
    }
}

#[async_trait]
impl ResearchTool for VenueResearchTool {
    async fn research(
        &self,
        max_pages: u32,
        pause_seconds: u64,
    ) -> Result<Vec<Record>, CrawlerError> {
        tracing::info!("Starting venue research ({} pages max)", max_pages);

        let report = self
            .agent
            .run(max_pages, Duration::from_secs(pause_seconds))
            .await?;

        match &report.outcome {
            ResearchOutcome::Saved { count, .. } => {
                tracing::info!("Successfully extracted {} venues.", count)
            }
            ResearchOutcome::NothingFound => {
                tracing::info!("No venues were extracted during the crawl.")
            }
        }

        Ok(report.crawl.records)
    }
}
