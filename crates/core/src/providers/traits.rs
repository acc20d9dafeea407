use async_trait::async_trait;

use crate::errors::QuoteError;
use crate::models::dividend::Dividend;
use crate::models::news::NewsArticle;
use crate::models::quote::PriceSource;
use crate::models::search::SearchHit;

/// Trait abstraction for every live price source.
///
/// Each upstream API (NSE, Yahoo Finance, Alpha Vantage, CoinGecko) implements
/// this trait. The resolver only sees the trait, so an API that stops working
/// is replaced by swapping one implementation.
#[async_trait]
pub trait PriceProvider: Send + Sync {
    /// Human-readable name of this provider (for logs/errors).
    fn name(&self) -> &str;

    /// Tag attached to quotes this provider produces.
    fn source(&self) -> PriceSource;

    /// Latest price of an already-normalized symbol in the reporting currency.
    ///
    /// A transport or decoding failure is `QuoteError::Transient`; a
    /// well-formed response without a usable price is `QuoteError::NotFound`.
    async fn fetch_price(&self, symbol: &str) -> Result<f64, QuoteError>;
}

/// A provider that can look symbols up by free-text query.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    fn name(&self) -> &str;

    /// At most `limit` hits, in the provider's own relevance order.
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchHit>, QuoteError>;
}

/// Source of market headlines.
#[async_trait]
pub trait NewsFeed: Send + Sync {
    async fn latest_news(&self, limit: usize) -> Result<Vec<NewsArticle>, QuoteError>;
}

/// Source of historical dividend events for one ticker.
#[async_trait]
pub trait DividendFeed: Send + Sync {
    async fn dividend_history(&self, symbol: &str) -> Result<Vec<Dividend>, QuoteError>;
}
