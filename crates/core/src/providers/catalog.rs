use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::errors::CoreError;
use crate::models::asset::{AssetClass, SymbolKey};
use crate::models::search::SearchHit;

const BUILTIN_CATALOG: &str = include_str!("../../data/static_catalog.json");

/// One row of the offline price table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub class: AssetClass,
    pub symbol: String,
    pub name: String,
    pub exchange: String,
    pub price: f64,
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    entries: Vec<CatalogEntry>,
}

/// Read-only offline prices and search entries, loaded once.
///
/// Consulted by the resolver after every live provider of a class has failed,
/// and by the search aggregator when live search comes back empty. Shared
/// behind an `Arc` and never mutated after construction.
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    entries: BTreeMap<SymbolKey, CatalogEntry>,
}

impl StaticCatalog {
    pub fn empty() -> Self {
        Self::default()
    }

    /// The catalog embedded in the binary.
    pub fn builtin() -> Result<Self, CoreError> {
        Self::from_json(BUILTIN_CATALOG)
    }

    /// Parse `{"entries": [{class, symbol, name, exchange, price}, ...]}`.
    pub fn from_json(json: &str) -> Result<Self, CoreError> {
        let file: CatalogFile = serde_json::from_str(json)?;
        Ok(Self::from_entries(file.entries))
    }

    pub fn from_path(path: &Path) -> Result<Self, CoreError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Symbols are normalized per class. Later duplicates replace earlier ones.
    pub fn from_entries(entries: impl IntoIterator<Item = CatalogEntry>) -> Self {
        let entries = entries
            .into_iter()
            .filter_map(|mut e| {
                let key = SymbolKey::new(&e.symbol, e.class);
                if !key.is_resolvable() {
                    return None;
                }
                e.symbol = key.symbol.clone();
                Some((key, e))
            })
            .collect();
        Self { entries }
    }

    pub fn entry(&self, class: AssetClass, symbol: &str) -> Option<&CatalogEntry> {
        self.entries.get(&SymbolKey::new(symbol, class))
    }

    /// Offline price, only if strictly positive.
    pub fn price(&self, class: AssetClass, symbol: &str) -> Option<f64> {
        self.entry(class, symbol)
            .map(|e| e.price)
            .filter(|p| p.is_finite() && *p > 0.0)
    }

    /// Case-insensitive substring match on symbol or name within `class`,
    /// ordered by symbol, at most `limit` hits. Hits carry the offline price.
    pub fn search(&self, query: &str, class: AssetClass, limit: usize) -> Vec<SearchHit> {
        let needle = query.trim().to_lowercase();
        self.entries
            .values()
            .filter(|e| e.class == class)
            .filter(|e| {
                needle.is_empty()
                    || e.symbol.to_lowercase().contains(&needle)
                    || e.name.to_lowercase().contains(&needle)
            })
            .take(limit)
            .map(|e| SearchHit {
                symbol: e.symbol.clone(),
                name: e.name.clone(),
                exchange_label: e.exchange.clone(),
                price: Some(e.price),
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
