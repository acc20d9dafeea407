use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::CoreError;

use super::asset::{normalize, AssetClass, SymbolKey};

/// A position owned by exactly one user.
///
/// `(owner_id, symbol)` is unique within a user's holdings. The symbol is
/// stored normalized for its class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Holding {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub class: AssetClass,
    pub symbol: String,
    pub name: String,
    pub quantity: f64,
    pub avg_cost_price: f64,
    pub acquired_at: DateTime<Utc>,
    pub sector: Option<String>,
    pub tags: Vec<String>,
}

impl Holding {
    pub fn key(&self) -> SymbolKey {
        SymbolKey {
            class: self.class,
            symbol: self.symbol.clone(),
        }
    }

    pub fn cost_basis(&self) -> f64 {
        self.quantity * self.avg_cost_price
    }
}

/// Fields a user supplies when creating or replacing a holding.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HoldingInput {
    #[serde(rename = "type", alias = "class")]
    pub class: Option<AssetClass>,
    pub symbol: String,
    #[serde(default)]
    pub name: Option<String>,
    pub quantity: f64,
    #[serde(default, alias = "avgBuyPrice", alias = "avg_buy_price")]
    pub avg_cost_price: f64,
    #[serde(default)]
    pub sector: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub acquired_at: Option<DateTime<Utc>>,
}

impl HoldingInput {
    pub fn class(&self) -> AssetClass {
        self.class.unwrap_or(AssetClass::Equity)
    }

    /// Normalized symbol for this input's class.
    pub fn normalized_symbol(&self) -> String {
        normalize(&self.symbol, self.class())
    }

    /// Reject inputs that can never form a valid holding.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.normalized_symbol().is_empty() {
            return Err(CoreError::InvalidInput("Symbol is required".into()));
        }
        if !self.quantity.is_finite() || self.quantity < 0.0 {
            return Err(CoreError::InvalidInput(
                "Quantity must be zero or positive".into(),
            ));
        }
        if !self.avg_cost_price.is_finite() || self.avg_cost_price < 0.0 {
            return Err(CoreError::InvalidInput(
                "Average cost price must be zero or positive".into(),
            ));
        }
        Ok(())
    }

    /// A name counts as provided only if it has non-whitespace content.
    pub fn provided_name(&self) -> Option<&str> {
        self.name.as_deref().map(str::trim).filter(|n| !n.is_empty())
    }
}

/// Row shape of a persisted holding. Tags are kept as a JSON array string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HoldingRecord {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub class: AssetClass,
    pub symbol: String,
    pub name: String,
    pub quantity: f64,
    pub avg_cost_price: f64,
    pub acquired_at: DateTime<Utc>,
    pub sector: Option<String>,
    pub tags: String,
}

/// Serialize tags as a JSON array string, preserving order and exact values.
pub fn encode_tags(tags: &[String]) -> Result<String, CoreError> {
    serde_json::to_string(tags).map_err(CoreError::from)
}

/// Inverse of [`encode_tags`]. A blank column decodes to no tags.
pub fn decode_tags(raw: &str) -> Result<Vec<String>, CoreError> {
    if raw.trim().is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_str(raw)
        .map_err(|e| CoreError::Serialization(format!("Invalid tags column {raw:?}: {e}")))
}

impl TryFrom<&Holding> for HoldingRecord {
    type Error = CoreError;

    fn try_from(h: &Holding) -> Result<Self, Self::Error> {
        Ok(Self {
            id: h.id,
            owner_id: h.owner_id,
            class: h.class,
            symbol: h.symbol.clone(),
            name: h.name.clone(),
            quantity: h.quantity,
            avg_cost_price: h.avg_cost_price,
            acquired_at: h.acquired_at,
            sector: h.sector.clone(),
            tags: encode_tags(&h.tags)?,
        })
    }
}

impl TryFrom<HoldingRecord> for Holding {
    type Error = CoreError;

    fn try_from(r: HoldingRecord) -> Result<Self, Self::Error> {
        let tags = decode_tags(&r.tags)?;
        Ok(Self {
            id: r.id,
            owner_id: r.owner_id,
            class: r.class,
            symbol: r.symbol,
            name: r.name,
            quantity: r.quantity,
            avg_cost_price: r.avg_cost_price,
            acquired_at: r.acquired_at,
            sector: r.sector,
            tags,
        })
    }
}
