//! CSV output
//!
//! Writes one row per record. The header lists the required fields in their
//! configured order, followed by any extra fields sorted by name.

use crate::output::traits::{ResultSink, SinkResult};
use crate::record::{Record, RecordSchema};
use std::path::Path;

/// Writes records to a CSV file, replacing any existing file
#[derive(Debug, Clone)]
pub struct CsvSink {
    schema: RecordSchema,
}

impl CsvSink {
    pub fn new(schema: RecordSchema) -> Self {
        Self { schema }
    }
}

impl ResultSink for CsvSink {
    fn save(&self, records: &[Record], destination: &Path) -> SinkResult<()> {
        if records.is_empty() {
            tracing::debug!("No records to save");
            return Ok(());
        }

        let columns = self.schema.column_order(records);
        let mut writer = csv::Writer::from_path(destination)?;

        writer.write_record(&columns)?;
        for record in records {
            writer.write_record(columns.iter().map(|column| {
                record
                    .get(column)
                    .map(|value| value.to_string())
                    .unwrap_or_default()
            }))?;
        }
        writer.flush()?;

        tracing::debug!(
            "Wrote {} row(s) to {}",
            records.len(),
            destination.display()
        );
        Ok(())
    }
}
