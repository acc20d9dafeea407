use std::sync::Arc;
use std::time::Duration;

use crate::errors::QuoteError;
use crate::models::asset::{AssetClass, SymbolKey};
use crate::models::quote::{PriceQuote, PriceSource};
use crate::providers::registry::ProviderRegistry;

/// Resolves one symbol to a price through its class's fallback chain.
///
/// Chain order:
/// 1. Live providers registered for the class, in registration order.
/// 2. The static catalog, tagged [`PriceSource::StaticFallback`].
///
/// Every provider call is bounded by its own timeout. A timeout, a transport
/// error, a NotFound and a price that is not strictly positive all mean
/// "try the next source". Nothing here ever produces a price ≤ 0.
///
/// **Note on precision**: prices are `f64`, which is sufficient for display
/// and percentage math at portfolio scale.
pub struct PriceService {
    registry: Arc<ProviderRegistry>,
    timeout: Duration,
}

impl PriceService {
    pub fn new(registry: Arc<ProviderRegistry>, timeout: Duration) -> Self {
        Self { registry, timeout }
    }

    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    /// Check if at least one live provider is registered for `class`.
    pub fn has_provider_for(&self, class: AssetClass) -> bool {
        !self.registry.providers_for(class).is_empty()
    }

    /// Full chain: live providers, then the static catalog. `None` is Absent.
    pub async fn resolve(&self, key: &SymbolKey) -> Option<PriceQuote> {
        if let Some(quote) = self.resolve_live(key).await {
            return Some(quote);
        }

        let quote = self
            .registry
            .catalog()
            .price(key.class, &key.symbol)
            .and_then(|price| PriceQuote::new(key, price, PriceSource::StaticFallback));

        match &quote {
            Some(q) => tracing::debug!(symbol = %key, price = q.price(), "Using static fallback price"),
            None => tracing::warn!(symbol = %key, "No price from any source"),
        }
        quote
    }

    /// Live providers only, skipping the static catalog.
    pub async fn resolve_live(&self, key: &SymbolKey) -> Option<PriceQuote> {
        if !key.is_resolvable() {
            return None;
        }

        for provider in self.registry.providers_for(key.class) {
            tracing::debug!(provider = provider.name(), symbol = %key, "Requesting price");

            let outcome = match tokio::time::timeout(self.timeout, provider.fetch_price(&key.symbol)).await {
                Ok(result) => result,
                Err(_) => Err(QuoteError::transient(
                    provider.name(),
                    format!("timed out after {} ms", self.timeout.as_millis()),
                )),
            };

            match outcome {
                Ok(price) => match PriceQuote::new(key, price, provider.source()) {
                    Some(quote) => return Some(quote),
                    None => tracing::warn!(
                        provider = provider.name(),
                        symbol = %key,
                        price,
                        "Discarding non-positive price, falling through"
                    ),
                },
                Err(e) if e.is_not_found() => {
                    tracing::debug!(provider = provider.name(), symbol = %key, "Not found, falling through");
                }
                Err(e) => {
                    tracing::warn!(provider = provider.name(), symbol = %key, error = %e, "Provider failed, falling through");
                }
            }
        }

        None
    }
}
