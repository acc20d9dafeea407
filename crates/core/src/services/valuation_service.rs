use crate::models::holding::Holding;
use crate::models::quote::PriceMap;
use crate::models::valuation::{AllocationEntry, Valuation, ValuationLine};

/// Computes market value, P&L, returns and allocation for a set of holdings.
///
/// Pure CPU work over an already-resolved [`PriceMap`]. Two passes: the
/// first values every line and accumulates the total, the second derives
/// weights from that total.
pub struct ValuationService;

impl ValuationService {
    pub fn new() -> Self {
        Self
    }

    /// Value `holdings` against `prices`.
    ///
    /// Always returns one line per holding, in input order. A holding with
    /// no resolved price is valued at its own average cost (flat, 0% return)
    /// and its line has no `price_source`.
    pub fn valuate(&self, holdings: &[Holding], prices: &PriceMap) -> Valuation {
        // 1. Market value per line and the portfolio total
        let mut lines = Vec::with_capacity(holdings.len());
        let mut total_market_value = 0.0;
        let mut total_cost_basis = 0.0;

        for holding in holdings {
            let quote = prices.get(holding.class, &holding.symbol);
            let live_price = quote.map_or(holding.avg_cost_price, |q| q.price());

            let market_value = holding.quantity * live_price;
            let cost_basis = holding.cost_basis();
            let pnl = market_value - cost_basis;
            let return_pct = if cost_basis > 0.0 {
                pnl / cost_basis * 100.0
            } else {
                0.0
            };

            total_market_value += market_value;
            total_cost_basis += cost_basis;

            lines.push(ValuationLine {
                holding: holding.clone(),
                live_price,
                price_source: quote.map(|q| q.source()),
                market_value,
                cost_basis,
                pnl,
                return_pct,
                weight: 0.0, // filled below
            });
        }

        // 2. Allocation weights, now that the total is known
        for line in &mut lines {
            line.weight = allocation_weight(line.market_value, total_market_value);
        }

        let allocation = lines
            .iter()
            .map(|l| AllocationEntry {
                class: l.holding.class,
                symbol: l.holding.symbol.clone(),
                name: l.holding.name.clone(),
                value: l.market_value,
                weight: l.weight,
            })
            .collect();

        let total_pnl = total_market_value - total_cost_basis;
        let total_return_pct = if total_cost_basis > 0.0 {
            total_pnl / total_cost_basis * 100.0
        } else {
            0.0
        };

        Valuation {
            lines,
            total_market_value,
            total_cost_basis,
            total_pnl,
            total_return_pct,
            allocation,
        }
    }
}

impl Default for ValuationService {
    fn default() -> Self {
        Self::new()
    }
}

/// Share of `total`, in percent. Multiply first: 700 of 1000 must be exactly 70.
fn allocation_weight(value: f64, total: f64) -> f64 {
    if total > 0.0 {
        value * 100.0 / total
    } else {
        0.0
    }
}
