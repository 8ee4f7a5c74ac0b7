//! Tool adapter for orchestration layers
//!
//! An orchestration layer (an agent framework, a job runner, a plain `main`)
//! sees the crawler as a single callable: "research up to N pages, pausing P
//! seconds, and give me the records". [`ResearchTool`] is that callable, in
//! both async and blocking form.

mod agent;
mod venue_tool;

pub use agent::{ResearchAgent, ResearchOutcome, ResearchReport};
pub use venue_tool::VenueResearchTool;

use crate::record::Record;
use crate::CrawlerError;
use async_trait::async_trait;
use std::future::Future;
use tokio::runtime::{Builder, Handle, RuntimeFlavor};

/// A crawl exposed as one operation
#[async_trait]
pub trait ResearchTool: Send + Sync {
    /// Crawls up to `max_pages` pages and returns the accepted records
    async fn research(&self, max_pages: u32, pause_seconds: u64)
        -> Result<Vec<Record>, CrawlerError>;

    /// Blocking form of [`ResearchTool::research`] for synchronous callers
    ///
    /// See [`block_on`] for how the async runtime is reached.
    fn research_blocking(
        &self,
        max_pages: u32,
        pause_seconds: u64,
    ) -> Result<Vec<Record>, CrawlerError> {
        block_on(self.research(max_pages, pause_seconds))?
    }
}

/// Drives a future to completion from synchronous code
///
/// - Inside a multi-threaded tokio runtime, the current worker is handed
///   over to blocking work and the future runs on that runtime.
/// - Outside any runtime, a current-thread runtime is built for the call.
/// - Inside a current-thread runtime blocking would deadlock, so an error
///   is returned instead.
pub fn block_on<F: Future>(future: F) -> Result<F::Output, CrawlerError> {
    match Handle::try_current() {
        Ok(handle) => match handle.runtime_flavor() {
            RuntimeFlavor::MultiThread => {
                Ok(tokio::task::block_in_place(|| handle.block_on(future)))
            }
            _ => Err(CrawlerError::Runtime(
                "blocking call made from a current-thread runtime; use the async form"
                    .to_string(),
            )),
        },
        Err(_) => {
            let runtime = Builder::new_current_thread().enable_all().build()?;
            Ok(runtime.block_on(future))
        }
    }
}
