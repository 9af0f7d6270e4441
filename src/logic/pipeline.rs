//! Ingestion pipeline
//!
//! One `Ingestor` is built at startup and shared across requests; it holds
//! no per-request state. Flow per delivery: verify signature, parse NDJSON
//! line by line, classify and normalize, then one batch insert. Every
//! failure mode is contained here; the transport acknowledges 200 no matter
//! what, so a misbehaving delivery can never trigger a redelivery storm.

use std::sync::Arc;

use chrono_tz::Tz;

use crate::error::SinkError;
use crate::logic::{signature, transform};
use crate::models::{BotLogRow, LogEntry};
use crate::sink::BotLogSink;

/// Outcome of one webhook delivery, for logging and tests. The transport
/// response does not depend on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngestReport {
    /// False only when a signature was present and failed verification.
    pub accepted: bool,
    /// Entries successfully parsed from the body.
    pub received: usize,
    /// NDJSON lines that were not valid JSON.
    pub parse_failures: usize,
    /// Rows written to storage.
    pub inserted: usize,
}

pub struct Ingestor {
    sink: Arc<dyn BotLogSink>,
    drain_secret: String,
    timezone: Tz,
}

impl Ingestor {
    pub fn new(sink: Arc<dyn BotLogSink>, drain_secret: String, timezone: Tz) -> Self {
        Self {
            sink,
            drain_secret,
            timezone,
        }
    }

    /// Run one delivery through the pipeline.
    ///
    /// An absent signature is tolerated (manual testing, misconfigured
    /// sender); a present-but-wrong signature discards the delivery without
    /// parsing it.
    pub async fn process(&self, raw_body: &[u8], signature_header: Option<&str>) -> IngestReport {
        if signature_header.is_some()
            && !signature::verify(raw_body, signature_header, &self.drain_secret)
        {
            tracing::warn!("invalid drain signature, discarding delivery");
            return IngestReport {
                accepted: false,
                received: 0,
                parse_failures: 0,
                inserted: 0,
            };
        }

        let body = String::from_utf8_lossy(raw_body);
        let mut entries: Vec<LogEntry> = Vec::new();
        let mut parse_failures = 0;
        for (line_no, line) in body.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            match serde_json::from_str::<LogEntry>(line) {
                Ok(entry) => entries.push(entry),
                Err(e) => {
                    parse_failures += 1;
                    tracing::warn!(line = line_no + 1, error = %e, "unparseable log line, skipping");
                }
            }
        }

        let rows: Vec<BotLogRow> = entries
            .iter()
            .filter_map(|entry| transform::normalize(entry, self.timezone))
            .collect();

        tracing::info!(
            received = entries.len(),
            bots = rows.len(),
            parse_failures,
            "processed drain delivery"
        );

        let mut inserted = 0;
        if !rows.is_empty() {
            match self.sink.insert_batch(&rows).await {
                Ok(()) => {
                    inserted = rows.len();
                    tracing::info!(rows = inserted, "inserted bot log rows");
                }
                Err(SinkError::RowErrors { failures }) => {
                    tracing::error!(failed = failures.len(), "storage sink rejected rows");
                    for failure in &failures {
                        for detail in &failure.errors {
                            tracing::error!(
                                row = failure.index,
                                reason = detail.reason.as_deref().unwrap_or("unknown"),
                                location = detail.location.as_deref().unwrap_or(""),
                                message = detail.message.as_deref().unwrap_or(""),
                                "row insert error"
                            );
                        }
                    }
                }
                Err(e) => {
                    tracing::error!(error = %e, "storage insert failed");
                }
            }
        }

        IngestReport {
            accepted: true,
            received: entries.len(),
            parse_failures,
            inserted,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use tokio::sync::Mutex;

    struct RecordingSink {
        rows: Mutex<Vec<BotLogRow>>,
    }

    impl RecordingSink {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                rows: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl BotLogSink for RecordingSink {
        async fn insert_batch(&self, rows: &[BotLogRow]) -> Result<(), SinkError> {
            self.rows.lock().await.extend_from_slice(rows);
            Ok(())
        }
    }

    struct RejectingSink;

    #[async_trait]
    impl BotLogSink for RejectingSink {
        async fn insert_batch(&self, _rows: &[BotLogRow]) -> Result<(), SinkError> {
            Err(SinkError::Rejected {
                status: 400,
                body: "schema mismatch".to_string(),
            })
        }
    }

    const SECRET: &str = "drain-secret";

    fn ingestor(sink: Arc<dyn BotLogSink>) -> Ingestor {
        Ingestor::new(sink, SECRET.to_string(), chrono_tz::America::Vancouver)
    }

    fn edge_line(id: &str, user_agent: &str) -> String {
        format!(
            r#"{{"id":"{id}","deploymentId":"dpl_1","projectId":"prj_1","timestamp":1710066600000,"source":"edge","level":"info","host":"example.com","proxy":{{"timestamp":1710066600000,"method":"GET","host":"example.com","path":"/docs","userAgent":"{user_agent}","region":"sfo1","statusCode":200}}}}"#
        )
    }

    fn build_line(id: &str) -> String {
        format!(
            r#"{{"id":"{id}","deploymentId":"dpl_1","projectId":"prj_1","timestamp":1710066600000,"source":"build","level":"info","host":"example.com","message":"Build completed"}}"#
        )
    }

    #[tokio::test]
    async fn test_malformed_line_is_isolated() {
        let sink = RecordingSink::new();
        let body = format!(
            "{}\nthis is not json\n{}",
            edge_line("log_1", "GPTBot/1.0"),
            edge_line("log_3", "ClaudeBot/1.0")
        );

        let report = ingestor(sink.clone()).process(body.as_bytes(), None).await;

        assert!(report.accepted);
        assert_eq!(report.received, 2);
        assert_eq!(report.parse_failures, 1);
        assert_eq!(report.inserted, 2);

        // Surviving lines keep their input order.
        let rows = sink.rows.lock().await;
        assert_eq!(rows[0].log_id, "log_1");
        assert_eq!(rows[1].log_id, "log_3");
    }

    #[tokio::test]
    async fn test_end_to_end_bot_filtering_with_valid_signature() {
        let sink = RecordingSink::new();
        let body = format!(
            "{}\n{}",
            build_line("log_build"),
            edge_line("log_edge", "Mozilla/5.0 GPTBot/1.0")
        );
        let sig = signature::sign(body.as_bytes(), SECRET);

        let report = ingestor(sink.clone())
            .process(body.as_bytes(), Some(&sig))
            .await;

        assert!(report.accepted);
        assert_eq!(report.received, 2);
        assert_eq!(report.inserted, 1);

        let rows = sink.rows.lock().await;
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].log_id, "log_edge");
        assert_eq!(rows[0].bot_name, "GPTBot");
        assert_eq!(rows[0].bot_category, crate::models::BotCategory::OpenAI);
    }

    #[tokio::test]
    async fn test_absent_signature_is_tolerated() {
        let sink = RecordingSink::new();
        let body = edge_line("log_1", "GPTBot/1.0");

        let report = ingestor(sink.clone()).process(body.as_bytes(), None).await;

        assert!(report.accepted);
        assert_eq!(report.inserted, 1);
    }

    #[tokio::test]
    async fn test_wrong_signature_discards_without_parsing() {
        let sink = RecordingSink::new();
        let body = edge_line("log_1", "GPTBot/1.0");

        let report = ingestor(sink.clone())
            .process(body.as_bytes(), Some("deadbeef"))
            .await;

        assert!(!report.accepted);
        assert_eq!(report.received, 0);
        assert_eq!(report.inserted, 0);
        assert!(sink.rows.lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_sink_failure_is_contained() {
        let body = edge_line("log_1", "GPTBot/1.0");

        let report = ingestor(Arc::new(RejectingSink))
            .process(body.as_bytes(), None)
            .await;

        assert!(report.accepted);
        assert_eq!(report.received, 1);
        assert_eq!(report.inserted, 0);
    }

    #[tokio::test]
    async fn test_empty_body_is_a_no_op() {
        let sink = RecordingSink::new();
        let report = ingestor(sink.clone()).process(b"", None).await;

        assert!(report.accepted);
        assert_eq!(report.received, 0);
        assert_eq!(report.parse_failures, 0);
        assert_eq!(report.inserted, 0);
    }

    #[tokio::test]
    async fn test_single_object_body_without_newline() {
        // Degraded transports deliver one pre-parsed JSON object; from the
        // pipeline's view that is just a one-line body.
        let sink = RecordingSink::new();
        let body = edge_line("log_solo", "Bytespider");

        let report = ingestor(sink.clone()).process(body.as_bytes(), None).await;

        assert_eq!(report.received, 1);
        assert_eq!(report.inserted, 1);
        assert_eq!(sink.rows.lock().await[0].bot_name, "Bytespider");
    }

    #[tokio::test]
    async fn test_non_bot_only_delivery_skips_the_sink() {
        let sink = RecordingSink::new();
        let body = format!(
            "{}\n{}",
            build_line("log_build"),
            edge_line("log_edge", "Mozilla/5.0 Chrome/120.0")
        );

        let report = ingestor(sink.clone()).process(body.as_bytes(), None).await;

        assert_eq!(report.received, 2);
        assert_eq!(report.inserted, 0);
        assert!(sink.rows.lock().await.is_empty());
    }
}
