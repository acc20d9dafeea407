use futures::future::join_all;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use crate::errors::QuoteError;
use crate::models::asset::{AssetClass, SymbolKey};
use crate::models::search::SearchHit;
use crate::providers::registry::ProviderRegistry;
use crate::providers::traits::SearchProvider;
use crate::services::price_service::PriceService;

/// Queries shorter than this never reach a provider.
pub const MIN_QUERY_LEN: usize = 2;

/// Aggregates symbol search across the providers registered for a class.
///
/// All live providers of the class are queried concurrently and their hits
/// merged in priority order, keeping the first occurrence of each symbol
/// (case-insensitive). The static catalog answers only when every live
/// provider came back empty or failed.
pub struct SearchService {
    registry: Arc<ProviderRegistry>,
    prices: Arc<PriceService>,
    timeout: Duration,
    limit: usize,
    enrich_top_n: usize,
}

impl SearchService {
    pub fn new(
        registry: Arc<ProviderRegistry>,
        prices: Arc<PriceService>,
        timeout: Duration,
        limit: usize,
        enrich_top_n: usize,
    ) -> Self {
        Self {
            registry,
            prices,
            timeout,
            limit: limit.max(1),
            enrich_top_n,
        }
    }

    pub async fn search(&self, query: &str, class: AssetClass) -> Vec<SearchHit> {
        let query = query.trim();
        if query.chars().count() < MIN_QUERY_LEN {
            return Vec::new();
        }

        let mut hits = self.live_hits(query, class).await;

        if hits.is_empty() {
            hits = self.registry.catalog().search(query, class, self.limit);
            tracing::debug!(query, class = %class, count = hits.len(), "Search answered from static catalog");
            return hits;
        }

        if class == AssetClass::Equity {
            self.enrich(&mut hits).await;
        }
        hits
    }

    /// Best live match for `symbol`, used to fill in a missing holding name.
    ///
    /// Providers are asked in priority order until one returns hits; an exact
    /// symbol match wins over the provider's first hit.
    pub async fn resolve_details(&self, symbol: &str, class: AssetClass) -> Option<SearchHit> {
        let symbol = symbol.trim();
        if symbol.chars().count() < MIN_QUERY_LEN {
            return None;
        }

        for provider in self.registry.search_providers_for(class) {
            let hits = match self.query_provider(provider.as_ref(), symbol).await {
                Ok(hits) if !hits.is_empty() => hits,
                Ok(_) => continue,
                Err(e) => {
                    tracing::debug!(provider = provider.name(), error = %e, "Name lookup failed");
                    continue;
                }
            };
            let exact = hits.iter().position(|h| h.symbol.eq_ignore_ascii_case(symbol));
            return hits.into_iter().nth(exact.unwrap_or(0));
        }

        self.registry
            .catalog()
            .entry(class, symbol)
            .map(|e| SearchHit::new(e.symbol.clone(), e.name.clone(), e.exchange.clone()))
    }

    async fn live_hits(&self, query: &str, class: AssetClass) -> Vec<SearchHit> {
        let providers = self.registry.search_providers_for(class);
        let results = join_all(providers.iter().map(|p| self.query_provider(p.as_ref(), query))).await;

        let mut seen = HashSet::new();
        let mut merged = Vec::new();
        for (provider, result) in providers.iter().zip(results) {
            match result {
                Ok(hits) => {
                    for hit in hits {
                        if seen.insert(hit.symbol.to_uppercase()) {
                            merged.push(hit);
                        }
                    }
                }
                Err(e) => {
                    tracing::warn!(provider = provider.name(), query, error = %e, "Search provider failed");
                }
            }
        }
        merged.truncate(self.limit);
        merged
    }

    async fn query_provider(
        &self,
        provider: &dyn SearchProvider,
        query: &str,
    ) -> Result<Vec<SearchHit>, QuoteError> {
        match tokio::time::timeout(self.timeout, provider.search(query, self.limit)).await {
            Ok(result) => result,
            Err(_) => Err(QuoteError::transient(provider.name(), "search timed out")),
        }
    }

    /// Attach a live quote to the leading hits. A failed lookup leaves the
    /// hit without a price.
    async fn enrich(&self, hits: &mut [SearchHit]) {
        let n = self.enrich_top_n.min(hits.len());
        let lookups = hits[..n].iter().map(|hit| {
            let key = SymbolKey::new(&hit.symbol, AssetClass::Equity);
            async move { self.prices.resolve_live(&key).await }
        });
        let quotes = join_all(lookups).await;

        for (hit, quote) in hits.iter_mut().zip(quotes) {
            if let Some(q) = quote {
                hit.price = Some(q.price());
            }
        }
    }
}
