use std::collections::HashMap;
use std::sync::Arc;

use crate::models::asset::AssetClass;
use crate::models::settings::Settings;

use super::alphavantage::AlphaVantageClient;
use super::catalog::StaticCatalog;
use super::coingecko::CoinGeckoClient;
use super::http::build_client;
use super::nse::NseClient;
use super::traits::{DividendFeed, NewsFeed, PriceProvider, SearchProvider};
use super::yahoo_finance::YahooFinanceProvider;

/// Registry of all configured upstream sources.
///
/// Holds, per asset class, the ordered price chain and the ordered search
/// chain, plus the offline catalog every chain ends in. Order of
/// registration is priority order.
pub struct ProviderRegistry {
    price_chains: HashMap<AssetClass, Vec<Arc<dyn PriceProvider>>>,
    search_chains: HashMap<AssetClass, Vec<Arc<dyn SearchProvider>>>,
    news: Option<Arc<dyn NewsFeed>>,
    dividends: Option<Arc<dyn DividendFeed>>,
    catalog: Arc<StaticCatalog>,
}

impl ProviderRegistry {
    /// Create a registry with no live providers.
    pub fn new(catalog: Arc<StaticCatalog>) -> Self {
        Self {
            price_chains: HashMap::new(),
            search_chains: HashMap::new(),
            news: None,
            dividends: None,
            catalog,
        }
    }

    /// Create a registry with all default providers pre-configured.
    ///
    /// - equity: NSE → Yahoo Finance → Alpha Vantage
    /// - mutual fund / other: Yahoo Finance → Alpha Vantage
    /// - crypto: CoinGecko
    ///
    /// Alpha Vantage is only registered when an API key is configured.
    pub fn new_with_defaults(settings: &Settings, catalog: Arc<StaticCatalog>) -> Self {
        let mut registry = Self::new(catalog);
        let client = build_client(settings.request_timeout());
        let urls = &settings.endpoints;

        let nse = Arc::new(NseClient::new(client.clone(), urls.nse.clone()));

        let yahoo = match YahooFinanceProvider::new(client.clone(), urls.yahoo_search.clone()) {
            Ok(y) => Some(Arc::new(y)),
            Err(e) => {
                tracing::warn!(error = %e, "Yahoo Finance unavailable, skipping");
                None
            }
        };

        let alpha = settings.api_key("alphavantage").map(|key| {
            Arc::new(AlphaVantageClient::new(
                client.clone(),
                urls.alphavantage.clone(),
                key.to_string(),
            ))
        });

        let gecko = Arc::new(CoinGeckoClient::new(
            client,
            urls.coingecko.clone(),
            &settings.reporting_currency,
            settings.api_key("coingecko").map(str::to_string),
        ));

        // Price chains
        registry.register(AssetClass::Equity, nse.clone());
        for class in [AssetClass::Equity, AssetClass::MutualFund, AssetClass::Other] {
            if let Some(y) = &yahoo {
                registry.register(class, y.clone());
            }
            if let Some(a) = &alpha {
                registry.register(class, a.clone());
            }
        }
        registry.register(AssetClass::Crypto, gecko.clone());

        // Search chains
        if let Some(y) = &yahoo {
            registry.register_search(AssetClass::Equity, y.clone());
        }
        registry.register_search(AssetClass::Equity, nse);
        if let Some(a) = &alpha {
            registry.register_search(AssetClass::Equity, a.clone());
        }
        registry.register_search(AssetClass::Crypto, gecko);

        if let Some(a) = alpha {
            registry.set_news_feed(a.clone());
            registry.set_dividend_feed(a);
        }

        registry
    }

    /// Append a price provider to the end of `class`'s chain.
    pub fn register(&mut self, class: AssetClass, provider: Arc<dyn PriceProvider>) {
        self.price_chains.entry(class).or_default().push(provider);
    }

    pub fn register_search(&mut self, class: AssetClass, provider: Arc<dyn SearchProvider>) {
        self.search_chains.entry(class).or_default().push(provider);
    }

    pub fn set_news_feed(&mut self, feed: Arc<dyn NewsFeed>) {
        self.news = Some(feed);
    }

    pub fn set_dividend_feed(&mut self, feed: Arc<dyn DividendFeed>) {
        self.dividends = Some(feed);
    }

    /// Price providers for `class` in priority order. Empty if none.
    pub fn providers_for(&self, class: AssetClass) -> &[Arc<dyn PriceProvider>] {
        self.price_chains.get(&class).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn search_providers_for(&self, class: AssetClass) -> &[Arc<dyn SearchProvider>] {
        self.search_chains.get(&class).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Names of the price chain for `class`, for diagnostics.
    pub fn provider_names(&self, class: AssetClass) -> Vec<String> {
        self.providers_for(class)
            .iter()
            .map(|p| p.name().to_string())
            .collect()
    }

    pub fn news_feed(&self) -> Option<Arc<dyn NewsFeed>> {
        self.news.clone()
    }

    pub fn dividend_feed(&self) -> Option<Arc<dyn DividendFeed>> {
        self.dividends.clone()
    }

    pub fn catalog(&self) -> Arc<StaticCatalog> {
        self.catalog.clone()
    }
}
