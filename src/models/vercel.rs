//! Vercel log drain wire types
//!
//! One `LogEntry` per NDJSON line. Field names on the wire are camelCase;
//! Vercel ships more fields than we map, so unknown keys are ignored.

use serde::Deserialize;

/// Log source category. Only `edge`/`lambda`/`static` style entries carry a
/// proxy object, but the tag itself arrives on every line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogSource {
    Build,
    Edge,
    Lambda,
    Static,
    External,
    Firewall,
    Redirect,
}

impl LogSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogSource::Build => "build",
            LogSource::Edge => "edge",
            LogSource::Lambda => "lambda",
            LogSource::Static => "static",
            LogSource::External => "external",
            LogSource::Firewall => "firewall",
            LogSource::Redirect => "redirect",
        }
    }
}

/// Severity level as emitted by Vercel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
    Fatal,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warning => "warning",
            LogLevel::Error => "error",
            LogLevel::Fatal => "fatal",
        }
    }
}

/// Vercel edge cache outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CacheStatus {
    Miss,
    Hit,
    Stale,
    Bypass,
    Prerender,
    Revalidated,
}

impl CacheStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CacheStatus::Miss => "MISS",
            CacheStatus::Hit => "HIT",
            CacheStatus::Stale => "STALE",
            CacheStatus::Bypass => "BYPASS",
            CacheStatus::Prerender => "PRERENDER",
            CacheStatus::Revalidated => "REVALIDATED",
        }
    }
}

/// Firewall action taken for the request, if any rule matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WafAction {
    Log,
    Challenge,
    Deny,
    Bypass,
    RateLimit,
}

impl WafAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            WafAction::Log => "log",
            WafAction::Challenge => "challenge",
            WafAction::Deny => "deny",
            WafAction::Bypass => "bypass",
            WafAction::RateLimit => "rate_limit",
        }
    }
}

/// The `userAgent` field arrives as a single string or as an ordered list of
/// strings, depending on how many UA headers the edge saw.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum UserAgent {
    One(String),
    Many(Vec<String>),
}

impl UserAgent {
    /// Full user-agent string: lists are joined with single spaces, order
    /// preserved.
    pub fn join(&self) -> String {
        match self {
            UserAgent::One(ua) => ua.clone(),
            UserAgent::Many(parts) => parts.join(" "),
        }
    }
}

/// HTTP request/response detail. Present only on entries that represent an
/// actual proxied request; build and system lines have no proxy object.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProxyInfo {
    pub timestamp: Option<i64>,
    pub method: String,
    pub host: String,
    pub path: String,
    pub user_agent: Option<UserAgent>,
    pub region: String,
    pub referer: Option<String>,
    pub status_code: Option<u16>,
    pub client_ip: Option<String>,
    pub scheme: Option<String>,
    /// Carried on the wire but not part of the output schema.
    #[allow(dead_code)]
    pub response_byte_size: Option<u64>,
    pub cache_id: Option<String>,
    pub vercel_cache: Option<CacheStatus>,
    pub waf_action: Option<WafAction>,
    pub waf_rule_id: Option<String>,
}

/// One log drain line.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    pub id: String,
    pub deployment_id: String,
    pub project_id: String,
    /// Unix timestamp in milliseconds.
    pub timestamp: i64,
    pub source: LogSource,
    pub level: LogLevel,
    /// Deployment alias host; the per-request host is `proxy.host`.
    #[allow(dead_code)]
    pub host: String,
    pub message: Option<String>,
    pub environment: Option<String>,
    pub entrypoint: Option<String>,
    pub path: Option<String>,
    pub status_code: Option<u16>,
    pub request_id: Option<String>,
    pub trace_id: Option<String>,
    pub span_id: Option<String>,
    pub execution_region: Option<String>,
    pub proxy: Option<ProxyInfo>,
}
