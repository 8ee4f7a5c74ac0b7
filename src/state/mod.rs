//! State module for tracking a single crawl run
//!
//! Everything here is scoped to one run of the crawl loop and dropped when
//! the run ends. Nothing is shared between runs.
//!
//! # Components
//!
//! - `SessionId`: Opaque identifier generated once per run
//! - `SeenSet`: Identity keys already accepted in the run
//! - `CrawlState`: Page cursor, accumulated records and termination flag

mod crawl_state;
mod seen_set;

// Re-export main types
pub use crawl_state::{CrawlState, PageTally, StopReason};
pub use seen_set::SeenSet;

use std::fmt;

/// Opaque identifier of one crawl run
///
/// Generated once when a run starts and handed unchanged to every page
/// fetch of that run.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionId(String);

impl SessionId {
    /// Generates a fresh random session id (32 lowercase hex digits)
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().simple().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for SessionId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
