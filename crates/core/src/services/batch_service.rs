use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::models::asset::{AssetClass, SymbolKey};
use crate::models::quote::PriceMap;
use crate::models::settings::MAX_CONCURRENCY_CAP;
use crate::services::price_service::PriceService;

/// Resolves many symbols at once with bounded fan-out.
///
/// Each distinct `(class, symbol)` runs as its own spawned task, so a panic
/// or a slow chain in one lookup never touches the others. A semaphore caps
/// how many chains are in flight at the same time.
pub struct BatchPriceFetcher {
    prices: Arc<PriceService>,
    max_concurrency: usize,
}

impl BatchPriceFetcher {
    /// `max_concurrency` is clamped to `1..=16`.
    pub fn new(prices: Arc<PriceService>, max_concurrency: usize) -> Self {
        Self {
            prices,
            max_concurrency: max_concurrency.clamp(1, MAX_CONCURRENCY_CAP),
        }
    }

    pub fn max_concurrency(&self) -> usize {
        self.max_concurrency
    }

    /// Resolve every key. Blank symbols are dropped, duplicates collapse to
    /// one lookup. The result is the same whatever order lookups finish in.
    pub async fn fetch_all<I>(&self, keys: I) -> PriceMap
    where
        I: IntoIterator<Item = SymbolKey>,
    {
        let by_class = partition(keys);
        let requested: usize = by_class.values().map(BTreeSet::len).sum();
        if requested == 0 {
            return PriceMap::new();
        }

        let semaphore = Arc::new(Semaphore::new(self.max_concurrency));
        let mut tasks = JoinSet::new();

        for (class, symbols) in by_class {
            tracing::debug!(class = %class, count = symbols.len(), "Dispatching price lookups");
            for key in symbols {
                let prices = Arc::clone(&self.prices);
                let semaphore = Arc::clone(&semaphore);
                tasks.spawn(async move {
                    // The semaphore is never closed, so acquire only fails if it were.
                    let _permit = semaphore.acquire_owned().await.ok();
                    let quote = prices.resolve(&key).await;
                    (key, quote)
                });
            }
        }

        let mut map = PriceMap::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((_, Some(quote))) => map.insert(quote),
                Ok((key, None)) => tracing::debug!(symbol = %key, "Symbol left unpriced"),
                Err(e) => tracing::warn!(error = %e, "Price lookup task aborted"),
            }
        }

        tracing::info!(requested, resolved = map.len(), "Batch price resolution finished");
        map
    }
}

/// Group resolvable keys by class, dropping duplicates.
fn partition<I>(keys: I) -> BTreeMap<AssetClass, BTreeSet<SymbolKey>>
where
    I: IntoIterator<Item = SymbolKey>,
{
    let mut by_class: BTreeMap<AssetClass, BTreeSet<SymbolKey>> = BTreeMap::new();
    for key in keys {
        let key = SymbolKey::new(&key.symbol, key.class);
        if key.is_resolvable() {
            by_class.entry(key.class).or_default().insert(key);
        }
    }
    by_class
}
