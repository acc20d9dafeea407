use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use super::http::get_json;
use super::parse::{Extractor, KeyPath, ParseStrategy};
use super::traits::{PriceProvider, SearchProvider};
use crate::errors::{CoreError, QuoteError};
use crate::models::quote::PriceSource;
use crate::models::search::SearchHit;

const NAME: &str = "Yahoo Finance";

/// Exchange suffixes tried after the bare symbol: NSE, then BSE.
const EXCHANGE_SUFFIXES: [&str; 2] = ["NS", "BO"];

/// Yahoo Finance provider for equities and mutual funds.
///
/// - **Free**: No API key required.
/// - **No strict rate limits** (unofficial public API).
/// - **Coverage**: Global equities, ETFs, indices, mutual funds.
///
/// Quotes go through the `yahoo_finance_api` crate. Symbol search uses the
/// public `/v1/finance/search` endpoint directly, which the crate does not
/// wrap in the shape needed here.
pub struct YahooFinanceProvider {
    connector: yahoo_finance_api::YahooConnector,
    client: Client,
    search_base: String,
}

impl YahooFinanceProvider {
    pub fn new(client: Client, search_base: impl Into<String>) -> Result<Self, CoreError> {
        let connector = yahoo_finance_api::YahooConnector::new().map_err(|e| CoreError::Api {
            provider: NAME.into(),
            message: format!("Failed to create connector: {e}"),
        })?;
        Ok(Self {
            connector,
            client,
            search_base: search_base.into().trim_end_matches('/').to_string(),
        })
    }

    /// Tickers to try for `symbol`, in order. Already exchange-qualified
    /// symbols ("INFY.NS", "BRK.B") are used as-is.
    pub fn symbol_variants(symbol: &str) -> Vec<String> {
        if symbol.contains('.') {
            return vec![symbol.to_string()];
        }
        std::iter::once(symbol.to_string())
            .chain(EXCHANGE_SUFFIXES.iter().map(|sfx| format!("{symbol}.{sfx}")))
            .collect()
    }

    async fn latest_close(&self, ticker: &str) -> Result<f64, QuoteError> {
        let resp = self
            .connector
            .get_latest_quotes(ticker, "1d")
            .await
            .map_err(|e| {
                QuoteError::transient(NAME, format!("Failed to fetch latest quote for {ticker}: {e}"))
            })?;

        let quote = resp
            .last_quote()
            .map_err(|_| QuoteError::not_found(NAME, ticker))?;

        Ok(quote.close)
    }

    fn name_strategy() -> ParseStrategy {
        ParseStrategy::new()
            .then(KeyPath::root().key("shortname"), Extractor::Text)
            .then(KeyPath::root().key("longname"), Extractor::Text)
            .then(KeyPath::root().key("quoteType"), Extractor::Text)
    }

    fn exchange_strategy() -> ParseStrategy {
        ParseStrategy::new()
            .then(KeyPath::root().key("exchDisp"), Extractor::Text)
            .then(KeyPath::root().key("exchange"), Extractor::Text)
    }

    /// Map a `/v1/finance/search` payload to hits. Quotes without a symbol
    /// are skipped; a missing name falls back to the symbol and a missing
    /// exchange to `YAHOO`.
    pub fn parse_search(body: &Value, limit: usize) -> Vec<SearchHit> {
        let Some(quotes) = body.get("quotes").and_then(Value::as_array) else {
            return Vec::new();
        };
        let names = Self::name_strategy();
        let exchanges = Self::exchange_strategy();

        quotes
            .iter()
            .filter_map(|q| {
                let symbol = q.get("symbol")?.as_str()?.trim();
                if symbol.is_empty() {
                    return None;
                }
                let name = names.extract_text(q).unwrap_or_else(|| symbol.to_string());
                let exchange = exchanges.extract_text(q).unwrap_or_else(|| "YAHOO".to_string());
                Some(SearchHit::new(symbol, name, exchange))
            })
            .take(limit)
            .collect()
    }
}

#[async_trait]
impl PriceProvider for YahooFinanceProvider {
    fn name(&self) -> &str {
        NAME
    }

    fn source(&self) -> PriceSource {
        PriceSource::YahooFinance
    }

    async fn fetch_price(&self, symbol: &str) -> Result<f64, QuoteError> {
        let mut last_transient = None;

        for ticker in Self::symbol_variants(symbol) {
            match self.latest_close(&ticker).await {
                Ok(price) if price.is_finite() && price > 0.0 => return Ok(price),
                Ok(price) => {
                    tracing::debug!(ticker = %ticker, price, "Yahoo returned an unusable price");
                }
                Err(e @ QuoteError::Transient { .. }) => last_transient = Some(e),
                Err(QuoteError::NotFound { .. }) => {}
            }
        }

        Err(last_transient.unwrap_or_else(|| QuoteError::not_found(NAME, symbol)))
    }
}

#[async_trait]
impl SearchProvider for YahooFinanceProvider {
    fn name(&self) -> &str {
        NAME
    }

    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchHit>, QuoteError> {
        let request = self
            .client
            .get(format!("{}/v1/finance/search", self.search_base))
            .query(&[("q", query)]);
        let body = get_json(NAME, request).await?;
        Ok(Self::parse_search(&body, limit))
    }
}
