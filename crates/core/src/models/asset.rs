use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::errors::CoreError;

/// The class of a tracked instrument.
/// Determines which price providers are consulted and how symbols are normalized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetClass {
    /// Listed stocks / ETFs (TCS, RELIANCE, AAPL)
    #[serde(alias = "stock", alias = "stocks")]
    Equity,
    /// Cryptocurrencies, identified by the aggregator's slug ("bitcoin")
    Crypto,
    /// Mutual fund schemes
    #[serde(alias = "mutual", alias = "mf")]
    MutualFund,
    /// Anything else priced through the generic equity quote providers
    Other,
}

impl AssetClass {
    pub const ALL: [AssetClass; 4] = [
        AssetClass::Equity,
        AssetClass::Crypto,
        AssetClass::MutualFund,
        AssetClass::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AssetClass::Equity => "equity",
            AssetClass::Crypto => "crypto",
            AssetClass::MutualFund => "mutual_fund",
            AssetClass::Other => "other",
        }
    }
}

impl std::fmt::Display for AssetClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AssetClass {
    type Err = CoreError;

    /// Accepts the canonical names plus the labels older clients send
    /// ("stock", "mutual", "mf").
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "equity" | "stock" | "stocks" => Ok(AssetClass::Equity),
            "crypto" => Ok(AssetClass::Crypto),
            "mutual_fund" | "mutual" | "mf" => Ok(AssetClass::MutualFund),
            "other" => Ok(AssetClass::Other),
            other => Err(CoreError::InvalidInput(format!("Unknown asset class: {other}"))),
        }
    }
}

/// Canonicalize a raw symbol for use as a map key.
///
/// Equities, mutual funds and other instruments are trimmed and uppercased.
/// Crypto symbols are aggregator slugs ("bitcoin", not "BTC") and are trimmed
/// and lowercased. Blank input yields an empty string, which callers treat as
/// unresolvable. Idempotent: `normalize(&normalize(s, c), c) == normalize(s, c)`.
pub fn normalize(raw: &str, class: AssetClass) -> String {
    let trimmed = raw.trim();
    match class {
        AssetClass::Crypto => trimmed.to_lowercase(),
        AssetClass::Equity | AssetClass::MutualFund | AssetClass::Other => trimmed.to_uppercase(),
    }
}

/// A normalized `(class, symbol)` pair. The unit of price resolution.
///
/// Keying by class as well as symbol keeps same-text symbols of different
/// classes apart.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SymbolKey {
    pub class: AssetClass,
    pub symbol: String,
}

impl SymbolKey {
    pub fn new(raw: &str, class: AssetClass) -> Self {
        Self {
            class,
            symbol: normalize(raw, class),
        }
    }

    /// An empty key can never be priced.
    pub fn is_resolvable(&self) -> bool {
        !self.symbol.is_empty()
    }
}

impl std::fmt::Display for SymbolKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.class, self.symbol)
    }
}
