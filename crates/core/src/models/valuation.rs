use serde::{Deserialize, Serialize};

use super::asset::AssetClass;
use super::holding::Holding;
use super::quote::PriceSource;

/// One holding valued against the resolved prices. Derived, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValuationLine {
    pub holding: Holding,

    /// Price used for the line. The holding's average cost when nothing resolved.
    pub live_price: f64,

    /// Where `live_price` came from; `None` means it is the cost fallback
    pub price_source: Option<PriceSource>,

    /// quantity × live_price
    pub market_value: f64,

    /// quantity × avg_cost_price
    pub cost_basis: f64,

    /// market_value − cost_basis
    pub pnl: f64,

    /// pnl / cost_basis × 100, or 0 when there is no cost basis
    pub return_pct: f64,

    /// Share of the total market value, in percent
    pub weight: f64,
}

impl ValuationLine {
    pub fn is_priced(&self) -> bool {
        self.price_source.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocationEntry {
    pub class: AssetClass,
    pub symbol: String,
    pub name: String,
    pub value: f64,
    pub weight: f64,
}

/// Result of valuing a user's holdings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Valuation {
    /// One line per input holding, in input order
    pub lines: Vec<ValuationLine>,
    pub total_market_value: f64,
    pub total_cost_basis: f64,
    pub total_pnl: f64,
    pub total_return_pct: f64,
    pub allocation: Vec<AllocationEntry>,
}
