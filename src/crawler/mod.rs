//! Crawler module for paginated listing retrieval
//!
//! This module contains the core crawling logic, including:
//! - The page-fetch contract and its HTTP implementation
//! - CSS-selector based content selection
//! - Pacing between page requests
//! - The crawl loop with its deduplication and stop policy

mod crawl_loop;
mod fetcher;
mod pacing;
mod parser;

#[cfg(test)]
pub(crate) mod testing;

pub use crawl_loop::{CrawlAborted, CrawlLoop, CrawlParams, CrawlReport};
pub use fetcher::{
    build_http_client, FetchError, HttpPageFetcher, PageFetcher, PageRequest, PageResult,
};
pub use pacing::{Delay, NoDelay, TokioDelay};
pub use parser::select_blocks;
