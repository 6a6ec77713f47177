use crate::adapters::elastic::bulk_body;
use crate::domain::ports::BulkSink;
use crate::parsers::alarm::{read_archive, AlarmEvent};
use crate::utils::error::Result;
use colored::Colorize;
use serde_json::Value;
use std::fmt;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IndexSummary {
    pub archives: usize,
    pub events: usize,
    pub batches: usize,
    /// Batches the sink rejected outright or answered with `"errors": true`.
    pub failed_batches: usize,
}

impl fmt::Display for IndexSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} archives, {} events, {} batches, {} with errors",
            self.archives, self.events, self.batches, self.failed_batches
        )
    }
}

/// Flattens alarm archives into events and sends them in bulk batches.
pub struct AlarmIndexer<'a> {
    sink: &'a dyn BulkSink,
    index: String,
    batch_size: usize,
}

impl<'a> AlarmIndexer<'a> {
    pub fn new(sink: &'a dyn BulkSink, index: impl Into<String>, batch_size: usize) -> Self {
        Self {
            sink,
            index: index.into(),
            batch_size,
        }
    }

    pub async fn run(&self, archives: &[PathBuf]) -> Result<IndexSummary> {
        let mut summary = IndexSummary::default();
        let mut pending: Vec<AlarmEvent> = Vec::new();
        let mut sequence: Option<Value> = None;

        for (i, path) in archives.iter().enumerate() {
            println!("file {} of {}: {}", i + 1, archives.len(), path.display());
            let batches = match read_archive(path) {
                Ok(batches) => batches,
                Err(e) => {
                    tracing::error!("Skipping {}: {}", path.display(), e);
                    continue;
                }
            };
            summary.archives += 1;

            for batch in batches {
                sequence = batch.sequence;
                for event in batch.events {
                    pending.push(event);
                    summary.events += 1;
                    if pending.len() > self.batch_size {
                        println!("events: {}", summary.events);
                        self.flush(&mut pending, sequence.as_ref(), &mut summary).await?;
                    }
                }
            }

            if !pending.is_empty() {
                println!("remaining events: {}", pending.len());
                self.flush(&mut pending, sequence.as_ref(), &mut summary).await?;
            }
        }

        println!("Done! Total events: {}", summary.events);
        Ok(summary)
    }

    async fn flush(
        &self,
        pending: &mut Vec<AlarmEvent>,
        sequence: Option<&Value>,
        summary: &mut IndexSummary,
    ) -> Result<()> {
        let body = bulk_body(&self.index, pending)?;
        pending.clear();
        summary.batches += 1;

        let sequence = sequence.map(|s| s.to_string()).unwrap_or_else(|| "-".to_string());
        match self.sink.send(body).await {
            Ok(outcome) if outcome.errors => {
                summary.failed_batches += 1;
                println!("{} {}", "Errors! Sequence:".red(), sequence);
            }
            Ok(outcome) => tracing::debug!("Indexed {} events", outcome.items),
            Err(e) => {
                summary.failed_batches += 1;
                tracing::error!("Bulk request failed at sequence {}: {}", sequence, e);
            }
        }
        Ok(())
    }
}
