//! Configuration module

use std::env;

use chrono_tz::Tz;

/// Application configuration, read once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server port
    pub port: u16,

    /// GCP project hosting the destination table
    pub gcp_project: String,

    /// BigQuery dataset id
    pub dataset_id: String,

    /// BigQuery table id
    pub table_id: String,

    /// Shared secret Vercel signs drain deliveries with
    pub drain_secret: String,

    /// Token echoed back during Vercel's endpoint verification
    pub verify_token: String,

    /// IANA timezone used for civil date/hour bucketing
    pub timezone: Tz,

    /// Static access token for local development; deployment uses the
    /// metadata server instead
    pub bigquery_access_token: Option<String>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),

            gcp_project: env::var("GCP_PROJECT")
                .unwrap_or_else(|_| "botdrain-dev".to_string()),

            dataset_id: env::var("DATASET_ID")
                .unwrap_or_else(|_| "bot_traffic".to_string()),

            table_id: env::var("TABLE_ID")
                .unwrap_or_else(|_| "bot_logs".to_string()),

            drain_secret: env::var("VERCEL_LOG_DRAIN_SECRET")
                .unwrap_or_else(|_| "dev-drain-secret-change-in-production".to_string()),

            verify_token: env::var("VERCEL_VERIFY_TOKEN")
                .unwrap_or_else(|_| "dev-verify-token".to_string()),

            timezone: env::var("DRAIN_TIMEZONE")
                .ok()
                .and_then(|tz| tz.parse().ok())
                .unwrap_or(chrono_tz::America::Vancouver),

            bigquery_access_token: env::var("BIGQUERY_ACCESS_TOKEN").ok(),
        }
    }
}
