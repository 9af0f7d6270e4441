//! BigQuery output schema for the bot traffic table

use serde::Serialize;

/// Vendor category a matched bot signature belongs to. `Unknown` is only
/// ever produced for non-matches, which never reach the output table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BotCategory {
    OpenAI,
    Anthropic,
    Google,
    Perplexity,
    CommonCrawl,
    ByteDance,
    Diffbot,
    #[serde(rename = "You.com")]
    YouCom,
    Cohere,
    Meta,
    ImageSift,
    Omgili,
    Apple,
    Neeva,
    #[serde(rename = "SMT")]
    Smt,
    #[serde(rename = "LAION")]
    Laion,
    Unknown,
}

/// One normalized row of the bot traffic table. Written once, never updated.
///
/// Every nullable column is an `Option` and serializes as JSON null when
/// absent; the streaming insert payload always carries the full column set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BotLogRow {
    // Core identifiers
    pub log_id: String,
    pub request_id: Option<String>,
    pub trace_id: Option<String>,
    pub span_id: Option<String>,

    // Timestamps
    pub timestamp: String,
    /// YYYY-MM-DD in the configured reporting timezone.
    pub date: String,
    /// 0-23 in the configured reporting timezone.
    pub hour: u32,
    pub proxy_timestamp: Option<String>,
    pub processed_at: String,

    // Bot detection
    pub bot_name: String,
    pub bot_category: BotCategory,
    pub full_user_agent: String,

    // HTTP request details
    pub method: String,
    pub path: Option<String>,
    pub proxy_path: String,
    pub host: String,
    pub proxy_scheme: Option<String>,
    pub proxy_referer: Option<String>,

    // Deployment context
    pub deployment_id: String,
    pub project_id: String,
    pub source: String,
    pub entrypoint: Option<String>,
    pub environment: Option<String>,

    // Response details
    pub status_code: Option<u16>,
    pub proxy_status_code: Option<u16>,
    pub level: String,

    // Network & performance
    pub client_ip: Option<String>,
    pub region: String,
    pub execution_region: Option<String>,

    // Caching
    pub cache_status: Option<String>,
    pub cache_id: Option<String>,

    // Security (WAF)
    pub waf_action: Option<String>,
    pub waf_rule: Option<String>,

    // Additional metadata
    pub raw_message: Option<String>,
}
