//! Log entry normalization
//!
//! Maps one parsed drain entry into the bot traffic schema. Only entries
//! that carry proxy data and match a known bot signature produce a row;
//! everything else is filtered out here.

use chrono::{SecondsFormat, TimeZone, Timelike, Utc};
use chrono_tz::Tz;

use crate::logic::bots;
use crate::models::{BotLogRow, LogEntry, UserAgent};

fn iso_instant(epoch_millis: i64) -> Option<String> {
    Utc.timestamp_millis_opt(epoch_millis)
        .single()
        .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Millis, true))
}

/// Normalize one log entry into a `BotLogRow`.
///
/// Returns None when the entry has no proxy data or its user agent matches
/// no known bot signature. `date` and `hour` are the civil calendar date and
/// hour an observer in `zone` would read for the entry's timestamp.
pub fn normalize(entry: &LogEntry, zone: Tz) -> Option<BotLogRow> {
    let proxy = entry.proxy.as_ref()?;

    let detection = bots::classify(proxy.user_agent.as_ref());
    if !detection.is_bot {
        return None;
    }
    let bot_name = detection.bot_name?;

    let Some(instant) = Utc.timestamp_millis_opt(entry.timestamp).single() else {
        tracing::warn!(
            log_id = %entry.id,
            timestamp = entry.timestamp,
            "log entry timestamp out of range, dropping record"
        );
        return None;
    };
    let local = instant.with_timezone(&zone);

    let full_user_agent = proxy
        .user_agent
        .as_ref()
        .map(UserAgent::join)
        .unwrap_or_default();

    Some(BotLogRow {
        log_id: entry.id.clone(),
        request_id: entry.request_id.clone(),
        trace_id: entry.trace_id.clone(),
        span_id: entry.span_id.clone(),

        timestamp: instant.to_rfc3339_opts(SecondsFormat::Millis, true),
        date: local.format("%Y-%m-%d").to_string(),
        hour: local.hour(),
        proxy_timestamp: proxy.timestamp.and_then(iso_instant),
        processed_at: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),

        bot_name: bot_name.to_string(),
        bot_category: detection.category,
        full_user_agent,

        method: proxy.method.clone(),
        path: entry.path.clone(),
        proxy_path: proxy.path.clone(),
        host: proxy.host.clone(),
        proxy_scheme: proxy.scheme.clone(),
        proxy_referer: proxy.referer.clone(),

        deployment_id: entry.deployment_id.clone(),
        project_id: entry.project_id.clone(),
        source: entry.source.as_str().to_string(),
        entrypoint: entry.entrypoint.clone(),
        environment: entry.environment.clone(),

        status_code: entry.status_code,
        proxy_status_code: proxy.status_code,
        level: entry.level.as_str().to_string(),

        client_ip: proxy.client_ip.clone(),
        region: proxy.region.clone(),
        execution_region: entry.execution_region.clone(),

        cache_status: proxy.vercel_cache.map(|c| c.as_str().to_string()),
        cache_id: proxy.cache_id.clone(),

        waf_action: proxy.waf_action.map(|w| w.as_str().to_string()),
        waf_rule: proxy.waf_rule_id.clone(),

        raw_message: entry.message.clone(),
    })
}
