//! Bot detection and categorization
//!
//! Known crawler signatures are matched against the user-agent string with an
//! ordered table of case-insensitive patterns. Table order is a contract:
//! the first matching entry wins, and entries whose name is a superstring of
//! another entry's name (Applebot-Extended vs Applebot, GoogleOther-Image vs
//! GoogleOther, DiffbotBot vs Diffbot, omgilibot vs omgili) are listed before
//! the generic entry so every input resolves to exactly one signature.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::{BotCategory, UserAgent};

/// Result of matching a user agent against the signature table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BotClassification {
    pub is_bot: bool,
    pub bot_name: Option<&'static str>,
    pub category: BotCategory,
}

impl BotClassification {
    fn no_match() -> Self {
        Self {
            is_bot: false,
            bot_name: None,
            category: BotCategory::Unknown,
        }
    }
}

struct BotPattern {
    name: &'static str,
    pattern: Regex,
    category: BotCategory,
}

fn entry(name: &'static str, pattern: &str, category: BotCategory) -> BotPattern {
    BotPattern {
        name,
        pattern: Regex::new(&format!("(?i){pattern}")).expect("bot pattern must compile"),
        category,
    }
}

/// Known LLM and web crawler signatures, grouped by vendor.
static BOT_PATTERNS: Lazy<Vec<BotPattern>> = Lazy::new(|| {
    use BotCategory::*;

    vec![
        // OpenAI
        entry("GPTBot", "gptbot", OpenAI),
        entry("ChatGPT-User", "chatgpt-user", OpenAI),
        entry("ChatGPT-PageFetcher", "chatgpt.*pagefetcher", OpenAI),
        // Anthropic
        entry("ClaudeBot", "claudebot", Anthropic),
        entry("Anthropic-AI", "anthropic-ai", Anthropic),
        // Google
        entry("Google-Extended", "google-extended", Google),
        entry("GoogleOther-Image", "googleother-image", Google),
        entry("GoogleOther", "googleother", Google),
        // Perplexity
        entry("PerplexityBot", "perplexitybot", Perplexity),
        entry("Perplexity-User", "perplexity-user", Perplexity),
        entry("PPLX-Agent", "pplx.*agent", Perplexity),
        // CommonCrawl
        entry("CCBot", "ccbot", CommonCrawl),
        // ByteDance
        entry("Bytespider", "bytespider", ByteDance),
        // Diffbot
        entry("DiffbotBot", "diffbotbot", Diffbot),
        entry("Diffbot", "diffbot", Diffbot),
        // You.com
        entry("YouBot", "youbot", YouCom),
        // Cohere
        entry("Cohere-AI", "cohere-ai", Cohere),
        entry("Cohere-User-Agent", "cohere.*user.*agent", Cohere),
        // Meta
        entry("FacebookBot", "facebookbot", Meta),
        entry("Meta-ExternalFetcher", "meta.*external.*fetcher", Meta),
        entry("Meta-Indexer", "meta.*indexer", Meta),
        // ImageSift
        entry("ImagesiftBot", "imagesiftbot", ImageSift),
        // Omgili (the bare name only counts at the start of the string)
        entry("omgilibot", "omgilibot", Omgili),
        entry("omgili", "^omgili", Omgili),
        // Apple
        entry("Applebot-Extended", "applebot-extended", Apple),
        entry("Applebot", "applebot", Apple),
        // Neeva
        entry("NeevaBot", "neevabot", Neeva),
        // SMT
        entry("SMTBot", "smtbot", Smt),
        // LAION
        entry("LAION-crawler", "laion.*crawler", Laion),
    ]
});

/// Match a user agent against the signature table.
///
/// Array user agents are joined with single spaces (order preserved) before
/// matching. Absent input and non-matches both classify as non-bot.
pub fn classify(user_agent: Option<&UserAgent>) -> BotClassification {
    let Some(ua) = user_agent else {
        return BotClassification::no_match();
    };

    let haystack = ua.join();
    for bot in BOT_PATTERNS.iter() {
        if bot.pattern.is_match(&haystack) {
            return BotClassification {
                is_bot: true,
                bot_name: Some(bot.name),
                category: bot.category,
            };
        }
    }

    BotClassification::no_match()
}
