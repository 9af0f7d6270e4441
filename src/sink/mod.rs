//! Storage sink for normalized bot rows

pub mod bigquery;

pub use bigquery::BigQuerySink;

use async_trait::async_trait;

use crate::error::SinkError;
use crate::models::BotLogRow;

/// Batch-insert seam between the pipeline and the analytics table.
///
/// Implementations must accept at least 500 rows per call and report schema
/// or per-row validation failures as a structured `SinkError`, not a panic.
#[async_trait]
pub trait BotLogSink: Send + Sync {
    async fn insert_batch(&self, rows: &[BotLogRow]) -> Result<(), SinkError>;
}
