use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::asset::{AssetClass, SymbolKey};

/// Where a price came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceSource {
    /// Regional exchange quote API
    Nse,
    /// Yahoo Finance quote endpoint
    YahooFinance,
    /// Alpha Vantage GLOBAL_QUOTE
    AlphaVantage,
    /// CoinGecko simple price
    CoinGecko,
    /// The offline catalog shipped with the process
    StaticFallback,
}

impl std::fmt::Display for PriceSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PriceSource::Nse => write!(f, "NSE"),
            PriceSource::YahooFinance => write!(f, "Yahoo Finance"),
            PriceSource::AlphaVantage => write!(f, "Alpha Vantage"),
            PriceSource::CoinGecko => write!(f, "CoinGecko"),
            PriceSource::StaticFallback => write!(f, "Static fallback"),
        }
    }
}

/// A resolved price for one instrument. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceQuote {
    symbol: String,
    class: AssetClass,
    price: f64,
    source: PriceSource,
    fetched_at: DateTime<Utc>,
}

impl PriceQuote {
    /// Returns `None` unless `price` is finite and strictly positive.
    pub fn new(key: &SymbolKey, price: f64, source: PriceSource) -> Option<Self> {
        if !price.is_finite() || price <= 0.0 {
            return None;
        }
        Some(Self {
            symbol: key.symbol.clone(),
            class: key.class,
            price,
            source,
            fetched_at: Utc::now(),
        })
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn class(&self) -> AssetClass {
        self.class
    }

    pub fn price(&self) -> f64 {
        self.price
    }

    pub fn source(&self) -> PriceSource {
        self.source
    }

    pub fn fetched_at(&self) -> DateTime<Utc> {
        self.fetched_at
    }

    pub fn key(&self) -> SymbolKey {
        SymbolKey {
            class: self.class,
            symbol: self.symbol.clone(),
        }
    }
}

/// The merged result of one batch price resolution.
///
/// Keyed internally by `(class, normalized symbol)`. A missing entry means no
/// source, including the static catalog, could price that symbol.
#[derive(Debug, Clone, Default)]
pub struct PriceMap {
    quotes: HashMap<SymbolKey, PriceQuote>,
}

impl PriceMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, quote: PriceQuote) {
        self.quotes.insert(quote.key(), quote);
    }

    /// Per-class lookup. `symbol` is normalized for `class` before the lookup.
    pub fn get(&self, class: AssetClass, symbol: &str) -> Option<&PriceQuote> {
        self.quotes.get(&SymbolKey::new(symbol, class))
    }

    pub fn price_of(&self, class: AssetClass, symbol: &str) -> Option<f64> {
        self.get(class, symbol).map(PriceQuote::price)
    }

    pub fn len(&self) -> usize {
        self.quotes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quotes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PriceQuote> {
        self.quotes.values()
    }

    /// All quotes of one class, keyed by normalized symbol.
    pub fn for_class(&self, class: AssetClass) -> HashMap<&str, &PriceQuote> {
        self.quotes
            .iter()
            .filter(|(k, _)| k.class == class)
            .map(|(k, q)| (k.symbol.as_str(), q))
            .collect()
    }
}

impl FromIterator<PriceQuote> for PriceMap {
    fn from_iter<I: IntoIterator<Item = PriceQuote>>(iter: I) -> Self {
        let mut map = PriceMap::new();
        for quote in iter {
            map.insert(quote);
        }
        map
    }
}
