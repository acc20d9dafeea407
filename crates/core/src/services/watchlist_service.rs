use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

use crate::errors::CoreError;
use crate::models::watchlist::{PricedWatchlistEntry, WatchlistEntry, WatchlistInput};
use crate::services::batch_service::BatchPriceFetcher;
use crate::services::search_service::SearchService;
use crate::storage::traits::WatchlistStore;

pub struct WatchlistService {
    store: Arc<dyn WatchlistStore>,
    fetcher: Arc<BatchPriceFetcher>,
    search: Arc<SearchService>,
}

impl WatchlistService {
    pub fn new(
        store: Arc<dyn WatchlistStore>,
        fetcher: Arc<BatchPriceFetcher>,
        search: Arc<SearchService>,
    ) -> Self {
        Self { store, fetcher, search }
    }

    /// The owner's entries with their last price; `None` when unresolved.
    pub async fn list(&self, owner_id: Uuid) -> Result<Vec<PricedWatchlistEntry>, CoreError> {
        let entries = self.store.find_by_owner(owner_id)?;
        let prices = self.fetcher.fetch_all(entries.iter().map(WatchlistEntry::key)).await;

        Ok(entries
            .into_iter()
            .map(|entry| {
                let last_price = prices.price_of(entry.class, &entry.symbol);
                PricedWatchlistEntry { entry, last_price }
            })
            .collect())
    }

    pub async fn add(&self, owner_id: Uuid, input: WatchlistInput) -> Result<WatchlistEntry, CoreError> {
        input.validate()?;
        let symbol = input.normalized_symbol();

        let name = match input.name.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
            Some(n) => n.to_string(),
            None => self
                .search
                .resolve_details(&symbol, input.class())
                .await
                .map(|hit| hit.name)
                .unwrap_or_else(|| symbol.clone()),
        };

        let entry = WatchlistEntry {
            id: Uuid::new_v4(),
            owner_id,
            class: input.class(),
            symbol,
            name,
            added_at: Utc::now(),
        };
        self.store.save(entry)
    }

    pub fn delete(&self, owner_id: Uuid, id: Uuid) -> Result<(), CoreError> {
        if self.store.find_by_id_and_owner(id, owner_id)?.is_none() {
            return Err(CoreError::NotFound(format!("Watchlist entry {id} not found")));
        }
        self.store.delete_by_id(id)?;
        Ok(())
    }
}
