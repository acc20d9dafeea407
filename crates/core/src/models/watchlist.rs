use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::CoreError;

use super::asset::{normalize, AssetClass, SymbolKey};

/// An instrument a user follows without holding it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchlistEntry {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub class: AssetClass,
    pub symbol: String,
    pub name: String,
    pub added_at: DateTime<Utc>,
}

impl WatchlistEntry {
    pub fn key(&self) -> SymbolKey {
        SymbolKey {
            class: self.class,
            symbol: self.symbol.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchlistInput {
    #[serde(default, rename = "type", alias = "class")]
    pub class: Option<AssetClass>,
    pub symbol: String,
    #[serde(default)]
    pub name: Option<String>,
}

impl WatchlistInput {
    pub fn class(&self) -> AssetClass {
        self.class.unwrap_or(AssetClass::Equity)
    }

    pub fn normalized_symbol(&self) -> String {
        normalize(&self.symbol, self.class())
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        if self.normalized_symbol().is_empty() {
            return Err(CoreError::InvalidInput("Symbol is required".into()));
        }
        Ok(())
    }
}

/// A watchlist entry with its last resolved price, `None` when no source had one.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PricedWatchlistEntry {
    #[serde(flatten)]
    pub entry: WatchlistEntry,
    pub last_price: Option<f64>,
}
