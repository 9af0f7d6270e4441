//! Error handling
//!
//! Authentication failures and per-line parse faults are logged pipeline
//! outcomes, not errors that escalate: every delivery is acknowledged with
//! 200 regardless, so a misconfigured sender never enters a redelivery loop.
//! The only typed error surface is the storage sink.

use serde::Deserialize;
use thiserror::Error;

/// One error attached to a rejected row, as reported by the table.
#[derive(Debug, Clone, Deserialize)]
pub struct RowErrorDetail {
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Per-row failure detail from a streaming insert response.
#[derive(Debug, Clone, Deserialize)]
pub struct RowFailure {
    pub index: usize,
    #[serde(default)]
    pub errors: Vec<RowErrorDetail>,
}

/// Storage sink failures. Callers log these; they never propagate past the
/// pipeline.
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("token source error: {0}")]
    Auth(String),

    #[error("insert rejected with status {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("{} row(s) rejected by the table", .failures.len())]
    RowErrors { failures: Vec<RowFailure> },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_failures_deserialize_from_insert_errors() {
        let failures: Vec<RowFailure> = serde_json::from_str(
            r#"[
                {"index": 2, "errors": [{"reason": "invalid", "location": "hour", "message": "no such field"}]},
                {"index": 5, "errors": []}
            ]"#,
        )
        .unwrap();

        assert_eq!(failures.len(), 2);
        assert_eq!(failures[0].index, 2);
        assert_eq!(failures[0].errors[0].reason.as_deref(), Some("invalid"));
        assert_eq!(failures[1].errors.len(), 0);
    }
}
