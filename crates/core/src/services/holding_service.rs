use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

use crate::errors::CoreError;
use crate::models::holding::{Holding, HoldingInput, HoldingRecord};
use crate::services::search_service::SearchService;
use crate::storage::traits::HoldingStore;

/// CRUD over one owner's holdings.
///
/// Every operation takes an already-resolved owner id. A holding that exists
/// but belongs to someone else is reported exactly like a missing one.
pub struct HoldingService {
    store: Arc<dyn HoldingStore>,
    search: Arc<SearchService>,
}

impl HoldingService {
    pub fn new(store: Arc<dyn HoldingStore>, search: Arc<SearchService>) -> Self {
        Self { store, search }
    }

    pub fn list(&self, owner_id: Uuid) -> Result<Vec<Holding>, CoreError> {
        self.store
            .find_by_owner(owner_id)?
            .into_iter()
            .map(Holding::try_from)
            .collect()
    }

    pub fn get(&self, owner_id: Uuid, id: Uuid) -> Result<Holding, CoreError> {
        let record = self
            .store
            .find_by_id_and_owner(id, owner_id)?
            .ok_or_else(|| not_found(id))?;
        Holding::try_from(record)
    }

    /// Validate, fill in a missing name, and store a new holding.
    pub async fn create(&self, owner_id: Uuid, input: HoldingInput) -> Result<Holding, CoreError> {
        input.validate()?;
        let (name, sector) = self.resolve_name(&input).await;

        let holding = Holding {
            id: Uuid::new_v4(),
            owner_id,
            class: input.class(),
            symbol: input.normalized_symbol(),
            name,
            quantity: input.quantity,
            avg_cost_price: input.avg_cost_price,
            acquired_at: input.acquired_at.unwrap_or_else(Utc::now),
            sector,
            tags: input.tags,
        };

        let saved = self.store.save(HoldingRecord::try_from(&holding)?)?;
        tracing::info!(owner = %owner_id, symbol = %holding.symbol, "Holding created");
        Holding::try_from(saved)
    }

    /// Replace the editable fields of an existing holding. Without a new
    /// name the stored one is kept unless the symbol changed.
    pub async fn update(&self, owner_id: Uuid, id: Uuid, input: HoldingInput) -> Result<Holding, CoreError> {
        input.validate()?;
        let existing = self.get(owner_id, id)?;
        let same_instrument = existing.class == input.class() && existing.symbol == input.normalized_symbol();
        let (name, sector) = if same_instrument && input.provided_name().is_none() {
            let sector = input.sector.clone().filter(|s| !s.trim().is_empty());
            (existing.name.clone(), sector.or(existing.sector.clone()))
        } else {
            self.resolve_name(&input).await
        };

        let holding = Holding {
            id: existing.id,
            owner_id: existing.owner_id,
            class: input.class(),
            symbol: input.normalized_symbol(),
            name,
            quantity: input.quantity,
            avg_cost_price: input.avg_cost_price,
            acquired_at: input.acquired_at.unwrap_or(existing.acquired_at),
            sector,
            tags: input.tags,
        };

        let saved = self.store.save(HoldingRecord::try_from(&holding)?)?;
        Holding::try_from(saved)
    }

    pub fn delete(&self, owner_id: Uuid, id: Uuid) -> Result<(), CoreError> {
        if self.store.find_by_id_and_owner(id, owner_id)?.is_none() {
            return Err(not_found(id));
        }
        self.store.delete_by_id(id)?;
        tracing::info!(owner = %owner_id, holding = %id, "Holding deleted");
        Ok(())
    }

    /// Provided name wins. Otherwise the best search match supplies the name
    /// and, when no sector was given, its exchange label as sector. With no
    /// match the symbol doubles as name.
    async fn resolve_name(&self, input: &HoldingInput) -> (String, Option<String>) {
        let sector = input.sector.clone().filter(|s| !s.trim().is_empty());
        if let Some(name) = input.provided_name() {
            return (name.to_string(), sector);
        }

        let symbol = input.normalized_symbol();
        match self.search.resolve_details(&symbol, input.class()).await {
            Some(hit) => {
                let sector = sector.or(Some(hit.exchange_label));
                (hit.name, sector)
            }
            None => (symbol, sector),
        }
    }
}

fn not_found(id: Uuid) -> CoreError {
    CoreError::NotFound(format!("Holding {id} not found"))
}
