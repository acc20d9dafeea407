use thiserror::Error;

/// Unified error type for the entire portfolio-tracker-core library.
/// Every public function returns `Result<T, CoreError>`.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Request / Input ─────────────────────────────────────────────
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Symbol {symbol} is already tracked")]
    DuplicateSymbol { symbol: String },

    // ── Auth ────────────────────────────────────────────────────────
    #[error("Unauthenticated: {0}")]
    Unauthenticated(String),

    // ── Entities ────────────────────────────────────────────────────
    #[error("Not found: {0}")]
    NotFound(String),

    // ── API / Network ───────────────────────────────────────────────
    #[error("API error ({provider}): {message}")]
    Api {
        provider: String,
        message: String,
    },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    // ── Internal ────────────────────────────────────────────────────
    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Coarse category of a [`CoreError`], used by boundary layers to pick a
/// response status without matching on every variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidInput,
    Unauthenticated,
    NotFound,
    UpstreamUnavailable,
    Internal,
}

impl CoreError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CoreError::InvalidInput(_) | CoreError::DuplicateSymbol { .. } => ErrorKind::InvalidInput,
            CoreError::Unauthenticated(_) => ErrorKind::Unauthenticated,
            CoreError::NotFound(_) => ErrorKind::NotFound,
            CoreError::Api { .. } | CoreError::Network(_) | CoreError::UpstreamUnavailable(_) => {
                ErrorKind::UpstreamUnavailable
            }
            CoreError::Serialization(_) | CoreError::Internal(_) => ErrorKind::Internal,
        }
    }
}

/// Outcome of a single provider lookup that did not yield a price.
///
/// Both variants make the fallback chain move on to the next source; they are
/// kept apart so a missing instrument can be logged differently from an
/// upstream outage.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum QuoteError {
    #[error("{provider} has no price for {symbol}")]
    NotFound { provider: String, symbol: String },

    #[error("{provider} request failed: {message}")]
    Transient { provider: String, message: String },
}

impl QuoteError {
    pub fn not_found(provider: &str, symbol: &str) -> Self {
        QuoteError::NotFound {
            provider: provider.to_string(),
            symbol: symbol.to_string(),
        }
    }

    pub fn transient(provider: &str, message: impl Into<String>) -> Self {
        QuoteError::Transient {
            provider: provider.to_string(),
            message: message.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, QuoteError::NotFound { .. })
    }
}

// ── Conversion helpers (From impls) ─────────────────────────────────

/// Strip query parameters from anything URL-shaped so API keys never end up
/// in error messages or logs. reqwest errors often contain full URLs.
pub(crate) fn redact_query(message: &str) -> String {
    match message.find('?') {
        Some(idx) => format!("{}?<query redacted>", &message[..idx]),
        None => message.to_string(),
    }
}

impl From<QuoteError> for CoreError {
    fn from(e: QuoteError) -> Self {
        match e {
            QuoteError::NotFound { provider, symbol } => CoreError::Api {
                provider,
                message: format!("No data for {symbol}"),
            },
            QuoteError::Transient { provider, message } => {
                CoreError::UpstreamUnavailable(format!("{provider}: {message}"))
            }
        }
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(e: serde_json::Error) -> Self {
        CoreError::Serialization(e.to_string())
    }
}

impl From<reqwest::Error> for CoreError {
    fn from(e: reqwest::Error) -> Self {
        CoreError::Network(redact_query(&e.to_string()))
    }
}

impl From<std::io::Error> for CoreError {
    fn from(e: std::io::Error) -> Self {
        CoreError::Internal(e.to_string())
    }
}
