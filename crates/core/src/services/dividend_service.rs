use chrono::{Duration, Utc};
use std::sync::Arc;
use uuid::Uuid;

use crate::errors::CoreError;
use crate::models::dividend::Dividend;
use crate::providers::registry::ProviderRegistry;
use crate::storage::traits::{DividendStore, HoldingStore};

/// Window used by `list_upcoming` when the caller gives none.
pub const DEFAULT_UPCOMING_DAYS: i64 = 30;

const MAX_UPCOMING_DAYS: i64 = 3650;

/// Stored dividend events and their refresh from the dividend feed.
pub struct DividendService {
    store: Arc<dyn DividendStore>,
    holdings: Arc<dyn HoldingStore>,
    registry: Arc<ProviderRegistry>,
}

impl DividendService {
    pub fn new(
        store: Arc<dyn DividendStore>,
        holdings: Arc<dyn HoldingStore>,
        registry: Arc<ProviderRegistry>,
    ) -> Self {
        Self {
            store,
            holdings,
            registry,
        }
    }

    /// Insert, or update the record already stored for `(ticker, ex_date)`.
    /// A dividend without an ex-date is always a new record.
    pub fn save(&self, mut dividend: Dividend) -> Result<Dividend, CoreError> {
        dividend.ticker = dividend.ticker.trim().to_uppercase();
        if dividend.ticker.is_empty() {
            return Err(CoreError::InvalidInput("Ticker is required".into()));
        }
        if dividend.amount.is_some_and(|a| !a.is_finite() || a < 0.0) {
            return Err(CoreError::InvalidInput("Amount must be a non-negative number".into()));
        }

        let existing = match dividend.ex_date {
            Some(ex_date) => self
                .store
                .find_by_ticker(&dividend.ticker)?
                .into_iter()
                .find(|d| d.ex_date == Some(ex_date)),
            None => None,
        };

        let record = match existing {
            Some(mut stored) => {
                stored.amount = dividend.amount;
                stored.source = dividend.source;
                stored.fetched_at = Some(Utc::now());
                stored
            }
            None => {
                dividend.fetched_at.get_or_insert_with(Utc::now);
                dividend
            }
        };
        self.store.save(record)
    }

    /// Ex-dates between now and `days` ahead, soonest first.
    pub fn list_upcoming(&self, days: Option<i64>) -> Result<Vec<Dividend>, CoreError> {
        let days = days.unwrap_or(DEFAULT_UPCOMING_DAYS);
        if days < 0 {
            return Err(CoreError::InvalidInput("days must not be negative".into()));
        }
        let from = Utc::now();
        let to = from + Duration::days(days.min(MAX_UPCOMING_DAYS));
        self.store.find_ex_date_between(from, to)
    }

    /// Newest ex-date first.
    pub fn by_ticker(&self, ticker: &str) -> Result<Vec<Dividend>, CoreError> {
        self.store.find_by_ticker(&ticker.trim().to_uppercase())
    }

    pub fn delete(&self, id: Uuid) -> Result<(), CoreError> {
        if !self.store.delete_by_id(id)? {
            return Err(CoreError::NotFound(format!("Dividend {id} not found")));
        }
        Ok(())
    }

    /// Pull the dividend history of one symbol and store it. Returns how
    /// many records were written.
    pub async fn refresh_for_symbol(&self, symbol: &str) -> Result<usize, CoreError> {
        let feed = self
            .registry
            .dividend_feed()
            .ok_or_else(|| CoreError::UpstreamUnavailable("No dividend feed configured".into()))?;

        let history = feed
            .dividend_history(symbol.trim())
            .await
            .map_err(|e| CoreError::UpstreamUnavailable(e.to_string()))?;

        let mut written = 0;
        for dividend in history {
            self.save(dividend)?;
            written += 1;
        }
        tracing::debug!(symbol, written, "Dividends refreshed");
        Ok(written)
    }

    /// Refresh every symbol anyone holds. One symbol failing does not stop
    /// the rest.
    pub async fn refresh_all(&self) -> Result<usize, CoreError> {
        let symbols = self.holdings.distinct_symbols()?;
        let mut total = 0;
        for key in &symbols {
            match self.refresh_for_symbol(&key.symbol).await {
                Ok(n) => total += n,
                Err(e) => tracing::warn!(symbol = %key, error = %e, "Dividend refresh failed"),
            }
        }
        tracing::info!(symbols = symbols.len(), stored = total, "Dividend refresh finished");
        Ok(total)
    }
}
