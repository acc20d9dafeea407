use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;

use super::http::{get_json, get_json_as};
use super::parse::{Extractor, KeyPath, ParseStrategy};
use super::traits::{PriceProvider, SearchProvider};
use crate::errors::QuoteError;
use crate::models::quote::PriceSource;
use crate::models::search::SearchHit;

const NAME: &str = "NSE";

/// National Stock Exchange of India public quote API.
///
/// - **Free**: no API key, but requires browser-like request headers.
/// - **Coverage**: NSE-listed equities, quoted in INR.
/// - The quote payload shape differs between endpoint revisions, so the
///   price is located through [`NseClient::price_strategy`].
pub struct NseClient {
    client: Client,
    base_url: String,
}

impl NseClient {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// `priceInfo.lastPrice`, then `data[0].lastPrice`, then `lastPrice`.
    pub fn price_strategy() -> ParseStrategy {
        ParseStrategy::new()
            .then(KeyPath::root().key("priceInfo").key("lastPrice"), Extractor::Number)
            .then(KeyPath::root().key("data").index(0).key("lastPrice"), Extractor::Number)
            .then(KeyPath::root().key("lastPrice"), Extractor::Number)
    }

    /// Extract the last traded price from a quote-equity payload.
    pub fn parse_quote(symbol: &str, body: &Value) -> Result<f64, QuoteError> {
        Self::price_strategy()
            .extract_number(body)
            .ok_or_else(|| QuoteError::not_found(NAME, symbol))
    }

    pub fn parse_search(body: AutocompleteResponse, limit: usize) -> Vec<SearchHit> {
        body.symbols
            .into_iter()
            .filter_map(|s| {
                let symbol = s.symbol.filter(|v| !v.trim().is_empty())?;
                let name = s.name.unwrap_or_else(|| symbol.clone());
                Some(SearchHit::new(symbol, name, "NSE"))
            })
            .take(limit)
            .collect()
    }
}

// ── NSE API response types ──────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct AutocompleteResponse {
    #[serde(default)]
    symbols: Vec<AutocompleteSymbol>,
}

#[derive(Debug, Deserialize)]
struct AutocompleteSymbol {
    symbol: Option<String>,
    name: Option<String>,
}

#[async_trait]
impl PriceProvider for NseClient {
    fn name(&self) -> &str {
        NAME
    }

    fn source(&self) -> PriceSource {
        PriceSource::Nse
    }

    async fn fetch_price(&self, symbol: &str) -> Result<f64, QuoteError> {
        let request = self
            .client
            .get(format!("{}/api/quote-equity", self.base_url))
            .query(&[("symbol", symbol), ("json", "true")]);
        let body = get_json(NAME, request).await?;
        Self::parse_quote(symbol, &body)
    }
}

#[async_trait]
impl SearchProvider for NseClient {
    fn name(&self) -> &str {
        NAME
    }

    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchHit>, QuoteError> {
        let request = self
            .client
            .get(format!("{}/api/search/autocomplete", self.base_url))
            .query(&[("q", query)]);
        let body: AutocompleteResponse = get_json_as(NAME, request).await?;
        Ok(Self::parse_search(body, limit))
    }
}
