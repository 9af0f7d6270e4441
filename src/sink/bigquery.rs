//! BigQuery streaming insert client
//!
//! Streams rows to `tabledata.insertAll` for the configured table. Bearer
//! tokens come from the `BIGQUERY_ACCESS_TOKEN` env var when set (local
//! development) and from the GCE metadata server otherwise, cached until
//! shortly before expiry. No retry logic lives here: a failed batch is
//! reported once and dropped by the caller.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use super::BotLogSink;
use crate::config::Config;
use crate::error::{RowFailure, SinkError};
use crate::models::BotLogRow;

const BIGQUERY_API_BASE: &str = "https://bigquery.googleapis.com/bigquery/v2";
const METADATA_TOKEN_URL: &str =
    "http://metadata.google.internal/computeMetadata/v1/instance/service-accounts/default/token";

/// Streaming insert guidance: 500 rows per request (hard cap 10,000).
const MAX_ROWS_PER_REQUEST: usize = 500;
/// Refresh cached tokens this long before they actually expire.
const TOKEN_EXPIRY_MARGIN_SECS: u64 = 60;

pub struct BigQuerySink {
    http: reqwest::Client,
    insert_url: String,
    static_token: Option<String>,
    cached_token: Mutex<Option<CachedToken>>,
}

struct CachedToken {
    access_token: String,
    expires_at: Instant,
}

#[derive(Serialize)]
struct InsertAllRequest<'a> {
    rows: Vec<InsertRow<'a>>,
}

#[derive(Serialize)]
struct InsertRow<'a> {
    json: &'a BotLogRow,
}

#[derive(Deserialize)]
struct InsertAllResponse {
    #[serde(default, rename = "insertErrors")]
    insert_errors: Vec<RowFailure>,
}

#[derive(Deserialize)]
struct MetadataToken {
    access_token: String,
    expires_in: u64,
}

impl BigQuerySink {
    pub fn new(config: &Config) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        let insert_url = format!(
            "{}/projects/{}/datasets/{}/tables/{}/insertAll",
            BIGQUERY_API_BASE, config.gcp_project, config.dataset_id, config.table_id
        );

        Self {
            http,
            insert_url,
            static_token: config.bigquery_access_token.clone(),
            cached_token: Mutex::new(None),
        }
    }

    async fn access_token(&self) -> Result<String, SinkError> {
        if let Some(token) = &self.static_token {
            return Ok(token.clone());
        }

        let mut cached = self.cached_token.lock().await;
        if let Some(token) = cached.as_ref() {
            if token.expires_at > Instant::now() {
                return Ok(token.access_token.clone());
            }
        }

        let response = self
            .http
            .get(METADATA_TOKEN_URL)
            .header("Metadata-Flavor", "Google")
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(SinkError::Auth(format!(
                "metadata server returned {}",
                response.status()
            )));
        }

        let token: MetadataToken = response
            .json()
            .await
            .map_err(|e| SinkError::Auth(e.to_string()))?;

        let expires_at = Instant::now()
            + Duration::from_secs(token.expires_in.saturating_sub(TOKEN_EXPIRY_MARGIN_SECS));
        *cached = Some(CachedToken {
            access_token: token.access_token.clone(),
            expires_at,
        });

        Ok(token.access_token)
    }

    async fn insert_chunk(&self, rows: &[BotLogRow]) -> Result<(), SinkError> {
        let token = self.access_token().await?;
        let request = InsertAllRequest {
            rows: rows.iter().map(|row| InsertRow { json: row }).collect(),
        };

        let response = self
            .http
            .post(&self.insert_url)
            .bearer_auth(&token)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SinkError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        // insertAll reports per-row validation failures in a 200 response.
        let parsed: InsertAllResponse = response.json().await?;
        if !parsed.insert_errors.is_empty() {
            return Err(SinkError::RowErrors {
                failures: parsed.insert_errors,
            });
        }

        Ok(())
    }
}

#[async_trait]
impl BotLogSink for BigQuerySink {
    async fn insert_batch(&self, rows: &[BotLogRow]) -> Result<(), SinkError> {
        for chunk in rows.chunks(MAX_ROWS_PER_REQUEST) {
            self.insert_chunk(chunk).await?;
        }
        tracing::debug!(rows = rows.len(), "streamed rows to BigQuery");
        Ok(())
    }
}
