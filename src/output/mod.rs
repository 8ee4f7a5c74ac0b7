//! Output module for persisting crawl results
//!
//! This module handles:
//! - The result sink contract used after a crawl finishes
//! - Writing accepted records as CSV

mod csv_sink;
mod traits;

pub use csv_sink::CsvSink;
pub use traits::{ResultSink, SinkError, SinkResult};
