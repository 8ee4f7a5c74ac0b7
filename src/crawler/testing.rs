//! In-memory collaborators for exercising the crawl loop without a network

use crate::crawler::fetcher::{FetchError, PageFetcher, PageRequest, PageResult};
use crate::crawler::pacing::Delay;
use crate::extraction::{ExtractionError, ExtractionStrategy};
use crate::record::Record;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

/// A complete venue record with the given name
pub fn venue(name: &str) -> Record {
    Record::new().with("name", name).with("location", "Atlanta, GA")
}

/// What the loop passed to one fetch call
#[derive(Debug, Clone)]
pub struct FetchCall {
    pub page: u32,
    pub session_id: String,
    pub base_url: String,
    pub selector: String,
}

enum Script {
    Sequence(Mutex<VecDeque<Result<PageResult, FetchError>>>),
    Repeat(PageResult),
}

/// Fetcher that replays scripted page results
///
/// A sequence script signals end-of-data once it runs out.
pub struct ScriptedFetcher {
    script: Script,
    calls: Mutex<Vec<FetchCall>>,
}

impl ScriptedFetcher {
    pub fn new(pages: Vec<Result<PageResult, FetchError>>) -> Self {
        Self {
            script: Script::Sequence(Mutex::new(pages.into())),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn repeating(page: PageResult) -> Self {
        Self {
            script: Script::Repeat(page),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<FetchCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl PageFetcher for ScriptedFetcher {
    async fn fetch(&self, request: &PageRequest<'_>) -> Result<PageResult, FetchError> {
        self.calls.lock().unwrap().push(FetchCall {
            page: request.page,
            session_id: request.session_id.to_string(),
            base_url: request.base_url.to_string(),
            selector: request.selector.to_string(),
        });

        match &self.script {
            Script::Sequence(pages) => pages
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(PageResult::end_of_data())),
            Script::Repeat(page) => Ok(page.clone()),
        }
    }
}

/// Delay that records requested pauses instead of sleeping
#[derive(Default)]
pub struct RecordingDelay {
    pauses: Mutex<Vec<Duration>>,
}

impl RecordingDelay {
    pub fn pauses(&self) -> Vec<Duration> {
        self.pauses.lock().unwrap().clone()
    }
}

#[async_trait]
impl Delay for RecordingDelay {
    async fn pause(&self, duration: Duration) {
        self.pauses.lock().unwrap().push(duration);
    }
}

/// Strategy that is never expected to be called by scripted fetchers
pub struct StubStrategy;

#[async_trait]
impl ExtractionStrategy for StubStrategy {
    async fn extract(&self, _url: &str, _blocks: &[String]) -> Result<Vec<Record>, ExtractionError> {
        Ok(Vec::new())
    }
}
