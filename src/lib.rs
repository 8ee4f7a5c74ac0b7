//! Venue-Crawler: a polite paginated listing scraper
//!
//! This crate walks the numbered pages of a listing site, hands the selected
//! content of each page to an LLM-backed extraction strategy, deduplicates the
//! resulting records across pages and persists them as CSV.

pub mod config;
pub mod crawler;
pub mod extraction;
pub mod output;
pub mod record;
pub mod state;
pub mod tool;
pub mod url;

use thiserror::Error;

/// Main error type for Venue-Crawler operations
#[derive(Debug, Error)]
pub enum CrawlerError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Aborted(#[from] crawler::CrawlAborted),

    #[error("Output error: {0}")]
    Sink(#[from] output::SinkError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Async runtime error: {0}")]
    Runtime(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("API key environment variable {0} is not set")]
    MissingApiKey(String),
}

/// Result type alias for Venue-Crawler operations
pub type Result<T> = std::result::Result<T, CrawlerError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{CrawlLoop, CrawlParams, CrawlReport};
pub use record::{FieldValue, IdentityKey, Record, RequiredFields};
pub use state::{SeenSet, SessionId, StopReason};
pub use tool::{ResearchAgent, ResearchOutcome, ResearchTool, VenueResearchTool};
