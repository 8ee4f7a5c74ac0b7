//! Result sink trait and error types

use crate::record::Record;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

/// Errors that can occur while persisting records
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for output operations
pub type SinkResult<T> = Result<T, SinkError>;

/// Persists the records of a finished crawl
///
/// Callers only invoke `save` with a non-empty slice; implementations may
/// treat an empty slice as a no-op.
pub trait ResultSink: Send + Sync {
    /// Writes `records` to `destination`
    fn save(&self, records: &[Record], destination: &Path) -> SinkResult<()>;
}

impl<T: ResultSink + ?Sized> ResultSink for Arc<T> {
    fn save(&self, records: &[Record], destination: &Path) -> SinkResult<()> {
        (**self).save(records, destination)
    }
}
