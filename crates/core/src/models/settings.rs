use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use crate::errors::CoreError;

/// Upper bound on concurrent outbound quote requests for one batch.
pub const MAX_CONCURRENCY_CAP: usize = 16;

/// Runtime settings for the tracker core.
///
/// Every field has a default so a partial config file (or none at all) is
/// enough to start.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// The single currency all prices and values are reported in (e.g. "INR").
    pub reporting_currency: String,

    /// Optional API keys for providers that require them.
    /// Keys: provider name ("alphavantage", "coingecko").
    /// Values: the API key string.
    pub api_keys: HashMap<String, String>,

    /// Base URLs of the upstream providers. Overridable for tests and mirrors.
    pub endpoints: ProviderEndpoints,

    /// Timeout for a single provider call, in milliseconds.
    pub request_timeout_ms: u64,

    /// Concurrent outbound lookups per batch. Clamped to 1..=16.
    pub max_concurrency: usize,

    /// Maximum number of hits a search returns.
    pub search_limit: usize,

    /// How many leading equity hits get a live quote attached.
    pub enrich_top_n: usize,

    /// Lifetime of a bearer token: "7d", "12h", "30m", "45s" or plain milliseconds.
    pub token_ttl: String,

    /// JSON price catalog to use instead of the built-in one.
    pub static_catalog_path: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            reporting_currency: "INR".to_string(),
            api_keys: HashMap::new(),
            endpoints: ProviderEndpoints::default(),
            request_timeout_ms: 4000,
            max_concurrency: MAX_CONCURRENCY_CAP,
            search_limit: 10,
            enrich_top_n: 8,
            token_ttl: "7d".to_string(),
            static_catalog_path: None,
        }
    }
}

impl Settings {
    /// A configured, non-blank API key.
    pub fn api_key(&self, provider: &str) -> Option<&str> {
        self.api_keys
            .get(provider)
            .map(|k| k.trim())
            .filter(|k| !k.is_empty())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms.max(1))
    }

    pub fn effective_concurrency(&self) -> usize {
        self.max_concurrency.clamp(1, MAX_CONCURRENCY_CAP)
    }

    pub fn token_lifetime(&self) -> Result<chrono::Duration, CoreError> {
        parse_lifetime(&self.token_ttl)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderEndpoints {
    pub nse: String,
    pub yahoo_search: String,
    pub alphavantage: String,
    pub coingecko: String,
}

impl Default for ProviderEndpoints {
    fn default() -> Self {
        Self {
            nse: "https://www.nseindia.com".to_string(),
            yahoo_search: "https://query2.finance.yahoo.com".to_string(),
            alphavantage: "https://www.alphavantage.co/query".to_string(),
            coingecko: "https://api.coingecko.com/api/v3".to_string(),
        }
    }
}

/// Parse a lifetime string such as `"7d"`, `"12h"`, `"30m"`, `"45s"`,
/// `"250ms"` or `"86400000"` (milliseconds).
pub fn parse_lifetime(raw: &str) -> Result<chrono::Duration, CoreError> {
    let s = raw.trim();
    let invalid = || CoreError::InvalidInput(format!("Invalid token lifetime: {raw:?}"));

    let (digits, millis_per_unit): (&str, i64) = if let Some(n) = s.strip_suffix("ms") {
        (n, 1)
    } else if let Some(n) = s.strip_suffix('d') {
        (n, 24 * 60 * 60 * 1000)
    } else if let Some(n) = s.strip_suffix('h') {
        (n, 60 * 60 * 1000)
    } else if let Some(n) = s.strip_suffix('m') {
        (n, 60 * 1000)
    } else if let Some(n) = s.strip_suffix('s') {
        (n, 1000)
    } else {
        (s, 1)
    };

    let amount: i64 = digits.trim().parse().map_err(|_| invalid())?;
    if amount <= 0 {
        return Err(invalid());
    }
    amount
        .checked_mul(millis_per_unit)
        .and_then(chrono::Duration::try_milliseconds)
        .ok_or_else(invalid)
}
