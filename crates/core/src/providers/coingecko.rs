use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::Deserialize;
use serde_json::Value;

use super::http::{get_json, get_json_as};
use super::parse::{Extractor, KeyPath, ParseStrategy};
use super::traits::{PriceProvider, SearchProvider};
use crate::errors::QuoteError;
use crate::models::quote::PriceSource;
use crate::models::search::SearchHit;

const NAME: &str = "CoinGecko";
const API_KEY_HEADER: &str = "x-cg-demo-api-key";

/// CoinGecko API provider for cryptocurrency prices.
///
/// - **Free**: works without a key; a demo key raises the rate limit.
/// - **Endpoints**: `/simple/price?ids={id}&vs_currencies={cur}`, `/search?query=`
///
/// Note: CoinGecko identifies coins by lowercase ids ("bitcoin",
/// "avalanche-2"), which is also the form crypto symbols are stored in.
pub struct CoinGeckoClient {
    client: Client,
    base_url: String,
    currency: String,
    api_key: Option<String>,
}

impl CoinGeckoClient {
    pub fn new(
        client: Client,
        base_url: impl Into<String>,
        currency: &str,
        api_key: Option<String>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            currency: currency.to_lowercase(),
            api_key,
        }
    }

    /// `{id}.{currency}`: the response is keyed by coin id, then currency.
    pub fn price_strategy(id: &str, currency: &str) -> ParseStrategy {
        ParseStrategy::new().then(
            KeyPath::root().key(id).key(currency.to_lowercase()),
            Extractor::Number,
        )
    }

    pub fn parse_price(id: &str, currency: &str, body: &Value) -> Result<f64, QuoteError> {
        Self::price_strategy(id, currency)
            .extract_number(body)
            .ok_or_else(|| QuoteError::not_found(NAME, id))
    }

    /// Coins become hits with the id as symbol and `"Name (SYM)"` as name.
    pub fn parse_search(body: CoinSearchResponse, limit: usize) -> Vec<SearchHit> {
        body.coins
            .into_iter()
            .filter(|c| !c.id.trim().is_empty())
            .map(|c| {
                let name = format!("{} ({})", c.name, c.symbol);
                SearchHit::new(c.id, name, "CRYPTO")
            })
            .take(limit)
            .collect()
    }

    fn with_key(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.api_key {
            Some(key) => request.header(API_KEY_HEADER, key),
            None => request,
        }
    }
}

// ── CoinGecko API response types ────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct CoinSearchResponse {
    #[serde(default)]
    coins: Vec<CoinHit>,
}

#[derive(Debug, Deserialize)]
struct CoinHit {
    #[serde(default)]
    id: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    symbol: String,
}

#[async_trait]
impl PriceProvider for CoinGeckoClient {
    fn name(&self) -> &str {
        NAME
    }

    fn source(&self) -> PriceSource {
        PriceSource::CoinGecko
    }

    async fn fetch_price(&self, symbol: &str) -> Result<f64, QuoteError> {
        let request = self.with_key(
            self.client
                .get(format!("{}/simple/price", self.base_url))
                .query(&[("ids", symbol), ("vs_currencies", self.currency.as_str())]),
        );
        let body = get_json(NAME, request).await?;
        Self::parse_price(symbol, &self.currency, &body)
    }
}

#[async_trait]
impl SearchProvider for CoinGeckoClient {
    fn name(&self) -> &str {
        NAME
    }

    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchHit>, QuoteError> {
        let request = self.with_key(
            self.client
                .get(format!("{}/search", self.base_url))
                .query(&[("query", query)]),
        );
        let body: CoinSearchResponse = get_json_as(NAME, request).await?;
        Ok(Self::parse_search(body, limit))
    }
}
