//! User agent based crawler detection.

use derive_more::Display;
use serde::{Deserialize, Serialize};

/// Classification label stored in the `bot_detected` field of a record.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Bot {
    GoogleBot,
    GoogleImageBot,
    BingBot,
    BaiduSpider,
    #[display("Yahoo! Slurp")]
    #[serde(rename = "Yahoo! Slurp")]
    YahooSlurp,
    Yandex,
    Human,
}

impl Bot {
    /// Returns `false` for regular traffic, `true` for any known crawler.
    pub fn is_bot(self) -> bool {
        self != Bot::Human
    }
}

/// Lowercase user agent fragments and the crawler they identify.
///
/// Entries are checked from top to bottom and the first match wins, so new
/// crawlers with overlapping signatures need to go above the broader entry.
pub const SIGNATURES: &[(&str, Bot)] = &[
    ("googlebot", Bot::GoogleBot),
    ("googleimageproxy", Bot::GoogleImageBot),
    ("bingbot", Bot::BingBot),
    ("baiduspider", Bot::BaiduSpider),
    ("yahoo!", Bot::YahooSlurp),
    ("yandex", Bot::Yandex),
];

/// Determines which crawler, if any, sent a request with the given user agent.
///
/// Matching is a case-insensitive substring search. User agents that don't
/// match any of the [`SIGNATURES`] are classified as [`Bot::Human`].
pub fn classify(user_agent: &str) -> Bot {
    let user_agent = user_agent.to_lowercase();

    SIGNATURES
        .iter()
        .find(|(signature, _)| user_agent.contains(signature))
        .map(|(_, bot)| *bot)
        .unwrap_or(Bot::Human)
}
