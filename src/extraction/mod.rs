//! Record extraction from selected page content
//!
//! An [`ExtractionStrategy`] turns the text blocks selected from one listing
//! page into candidate records. The crawl loop never calls it directly: it is
//! handed through to the page fetcher unchanged.

mod llm;
mod response;

pub use llm::{chunk_blocks, LlmExtractionStrategy};
pub use response::parse_records;

use crate::record::Record;
use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur while extracting records
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("LLM request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("LLM API error (HTTP {status}): {body}")]
    Api { status: u16, body: String },

    #[error("LLM returned no choices")]
    EmptyResponse,

    #[error("Failed to parse LLM response: {0}")]
    Parse(String),
}

/// Turns selected page content into candidate records
#[async_trait]
pub trait ExtractionStrategy: Send + Sync {
    /// Extracts records from the content blocks of one page
    ///
    /// # Arguments
    ///
    /// * `url` - The page the blocks were selected from
    /// * `blocks` - Text of each element matched by the content selector
    async fn extract(&self, url: &str, blocks: &[String]) -> Result<Vec<Record>, ExtractionError>;
}
