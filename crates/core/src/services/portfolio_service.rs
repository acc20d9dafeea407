use std::sync::Arc;
use uuid::Uuid;

use crate::errors::CoreError;
use crate::models::holding::Holding;
use crate::models::valuation::Valuation;
use crate::services::batch_service::BatchPriceFetcher;
use crate::services::holding_service::HoldingService;
use crate::services::valuation_service::ValuationService;

/// Values an owner's holdings against freshly resolved prices.
///
/// Prices are fetched once per call for every distinct symbol held; provider
/// failures degrade individual lines to cost valuation and never fail the call.
pub struct PortfolioService {
    holdings: Arc<HoldingService>,
    fetcher: Arc<BatchPriceFetcher>,
    valuation: ValuationService,
}

impl PortfolioService {
    pub fn new(holdings: Arc<HoldingService>, fetcher: Arc<BatchPriceFetcher>) -> Self {
        Self {
            holdings,
            fetcher,
            valuation: ValuationService::new(),
        }
    }

    pub async fn summary(&self, owner_id: Uuid) -> Result<Valuation, CoreError> {
        let holdings = self.holdings.list(owner_id)?;
        Ok(self.valuate(&holdings).await)
    }

    pub async fn valuate(&self, holdings: &[Holding]) -> Valuation {
        let prices = self.fetcher.fetch_all(holdings.iter().map(Holding::key)).await;
        self.valuation.valuate(holdings, &prices)
    }
}
