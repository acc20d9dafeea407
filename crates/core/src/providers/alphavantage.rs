use async_trait::async_trait;
use chrono::{NaiveDate, TimeZone, Utc};
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;

use super::http::{get_json, get_json_as};
use super::parse::{parse_number, Extractor, KeyPath, ParseStrategy};
use super::traits::{DividendFeed, NewsFeed, PriceProvider, SearchProvider};
use crate::errors::QuoteError;
use crate::models::dividend::Dividend;
use crate::models::news::NewsArticle;
use crate::models::quote::PriceSource;
use crate::models::search::SearchHit;

const NAME: &str = "Alpha Vantage";

/// Alpha Vantage API client: equity quotes, symbol search, market news and
/// dividend history.
///
/// - **Free tier**: 25 requests/day (across ALL endpoints).
/// - **Requires**: API key (set via settings as "alphavantage").
/// - **Coverage**: 100k+ global equity symbols, BSE via the `.BSE` suffix.
///
/// When the daily quota is spent the API answers 200 with a `Note` or
/// `Information` message instead of data; that is reported as transient.
pub struct AlphaVantageClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl AlphaVantageClient {
    pub fn new(client: Client, base_url: impl Into<String>, api_key: String) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            api_key,
        }
    }

    /// `SYM`, then the BSE listing `SYM.BSE`. Qualified symbols are used as-is.
    pub fn symbol_variants(symbol: &str) -> Vec<String> {
        if symbol.contains('.') {
            vec![symbol.to_string()]
        } else {
            vec![symbol.to_string(), format!("{symbol}.BSE")]
        }
    }

    pub fn price_strategy() -> ParseStrategy {
        ParseStrategy::new().then(
            KeyPath::root().key("Global Quote").key("05. price"),
            Extractor::Number,
        )
    }

    /// Extract the price from a GLOBAL_QUOTE payload.
    pub fn parse_quote(symbol: &str, body: &Value) -> Result<f64, QuoteError> {
        if let Some(message) = throttle_message(body) {
            return Err(QuoteError::transient(NAME, message));
        }
        Self::price_strategy()
            .extract_number(body)
            .ok_or_else(|| QuoteError::not_found(NAME, symbol))
    }

    pub fn parse_search(body: SymbolSearchResponse, limit: usize) -> Vec<SearchHit> {
        body.best_matches
            .into_iter()
            .filter(|m| !m.symbol.trim().is_empty())
            .map(|m| {
                let name = if m.name.trim().is_empty() { m.symbol.clone() } else { m.name };
                SearchHit::new(m.symbol, name, "ALPHA")
            })
            .take(limit)
            .collect()
    }

    /// Feed items that carry both a title and a url, capped at `limit`.
    pub fn parse_news(body: NewsResponse, limit: usize) -> Vec<NewsArticle> {
        body.feed
            .into_iter()
            .filter_map(|item| {
                Some(NewsArticle {
                    title: item.title.filter(|t| !t.trim().is_empty())?,
                    url: item.url.filter(|u| !u.trim().is_empty())?,
                    source: item.source,
                })
            })
            .take(limit)
            .collect()
    }

    /// Days of a daily-adjusted series with a positive dividend amount,
    /// newest first. Unparseable dates and amounts are skipped.
    pub fn parse_dividends(symbol: &str, body: DailyAdjustedResponse) -> Vec<Dividend> {
        let mut out: Vec<Dividend> = body
            .time_series
            .unwrap_or_default()
            .into_iter()
            .filter_map(|(day, entry)| {
                let amount = entry.dividend_amount.as_deref().and_then(parse_number)?;
                if amount <= 0.0 {
                    return None;
                }
                let date = NaiveDate::parse_from_str(&day, "%Y-%m-%d").ok()?;
                let ex_date = Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0)?);
                Some(Dividend::fetched(symbol, amount, ex_date, "alphavantage"))
            })
            .collect();
        out.sort_by(|a, b| b.ex_date.cmp(&a.ex_date));
        out
    }

    async fn global_quote(&self, ticker: &str) -> Result<f64, QuoteError> {
        let request = self.client.get(&self.base_url).query(&[
            ("function", "GLOBAL_QUOTE"),
            ("symbol", ticker),
            ("apikey", &self.api_key),
        ]);
        let body = get_json(NAME, request).await?;
        Self::parse_quote(ticker, &body)
    }
}

fn throttle_message(body: &Value) -> Option<String> {
    ["Note", "Information"]
        .iter()
        .find_map(|k| body.get(*k).and_then(Value::as_str))
        .map(|m| format!("rate limited: {m}"))
}

// ── Alpha Vantage API response types ────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct SymbolSearchResponse {
    #[serde(rename = "bestMatches", default)]
    best_matches: Vec<SymbolMatch>,
}

#[derive(Debug, Deserialize)]
struct SymbolMatch {
    #[serde(rename = "1. symbol", default)]
    symbol: String,
    #[serde(rename = "2. name", default)]
    name: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct NewsResponse {
    #[serde(default)]
    feed: Vec<NewsItem>,
}

#[derive(Debug, Deserialize)]
struct NewsItem {
    title: Option<String>,
    url: Option<String>,
    source: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DailyAdjustedResponse {
    #[serde(rename = "Time Series (Daily)")]
    time_series: Option<HashMap<String, DailyAdjusted>>,
}

#[derive(Debug, Deserialize)]
struct DailyAdjusted {
    #[serde(rename = "7. dividend amount")]
    dividend_amount: Option<String>,
}

#[async_trait]
impl PriceProvider for AlphaVantageClient {
    fn name(&self) -> &str {
        NAME
    }

    fn source(&self) -> PriceSource {
        PriceSource::AlphaVantage
    }

    async fn fetch_price(&self, symbol: &str) -> Result<f64, QuoteError> {
        let mut last_transient = None;

        for ticker in Self::symbol_variants(symbol) {
            match self.global_quote(&ticker).await {
                Ok(price) if price.is_finite() && price > 0.0 => return Ok(price),
                Ok(_) | Err(QuoteError::NotFound { .. }) => {}
                Err(e @ QuoteError::Transient { .. }) => last_transient = Some(e),
            }
        }

        Err(last_transient.unwrap_or_else(|| QuoteError::not_found(NAME, symbol)))
    }
}

#[async_trait]
impl SearchProvider for AlphaVantageClient {
    fn name(&self) -> &str {
        NAME
    }

    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchHit>, QuoteError> {
        let request = self.client.get(&self.base_url).query(&[
            ("function", "SYMBOL_SEARCH"),
            ("keywords", query),
            ("apikey", &self.api_key),
        ]);
        let body: SymbolSearchResponse = get_json_as(NAME, request).await?;
        Ok(Self::parse_search(body, limit))
    }
}

#[async_trait]
impl NewsFeed for AlphaVantageClient {
    async fn latest_news(&self, limit: usize) -> Result<Vec<NewsArticle>, QuoteError> {
        let request = self.client.get(&self.base_url).query(&[
            ("function", "NEWS_SENTIMENT"),
            ("topics", "financial_markets"),
            ("apikey", &self.api_key),
        ]);
        let body: NewsResponse = get_json_as(NAME, request).await?;
        Ok(Self::parse_news(body, limit))
    }
}

#[async_trait]
impl DividendFeed for AlphaVantageClient {
    async fn dividend_history(&self, symbol: &str) -> Result<Vec<Dividend>, QuoteError> {
        let request = self.client.get(&self.base_url).query(&[
            ("function", "TIME_SERIES_DAILY_ADJUSTED"),
            ("symbol", symbol),
            ("apikey", &self.api_key),
        ]);
        let body: DailyAdjustedResponse = get_json_as(NAME, request).await?;
        Ok(Self::parse_dividends(symbol, body))
    }
}
