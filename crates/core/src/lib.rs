pub mod errors;
pub mod models;
pub mod providers;
pub mod services;
pub mod storage;

use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

use errors::CoreError;
use models::{
    asset::{AssetClass, SymbolKey},
    dividend::Dividend,
    holding::{Holding, HoldingInput},
    news::NewsArticle,
    performance::{PerformanceChart, Snapshot},
    quote::{PriceMap, PriceQuote},
    search::SearchHit,
    settings::Settings,
    user::{Credentials, Session},
    valuation::Valuation,
    watchlist::{PricedWatchlistEntry, WatchlistEntry, WatchlistInput},
};
use providers::{catalog::StaticCatalog, registry::ProviderRegistry};
use services::{
    auth_service::{AuthService, PasswordParams},
    batch_service::BatchPriceFetcher,
    dividend_service::DividendService,
    holding_service::HoldingService,
    news_service::NewsService,
    performance_service::PerformanceService,
    portfolio_service::PortfolioService,
    price_service::PriceService,
    search_service::SearchService,
    watchlist_service::WatchlistService,
};
use storage::memory::MemoryStore;

/// Main entry point for the Portfolio Tracker core library.
///
/// Owns the provider registry, the store and every service built on them.
/// Per-user operations take an owner id already resolved from a bearer
/// token via [`PortfolioTracker::resolve_owner`].
#[must_use]
pub struct PortfolioTracker {
    settings: Settings,
    store: Arc<MemoryStore>,
    prices: Arc<PriceService>,
    fetcher: Arc<BatchPriceFetcher>,
    search: Arc<SearchService>,
    holdings: Arc<HoldingService>,
    portfolio: PortfolioService,
    watchlist: WatchlistService,
    auth: AuthService,
    dividends: DividendService,
    news: NewsService,
    performance: PerformanceService,
}

impl std::fmt::Debug for PortfolioTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PortfolioTracker")
            .field("reporting_currency", &self.settings.reporting_currency)
            .field("catalog_entries", &self.prices.registry().catalog().len())
            .field("max_concurrency", &self.fetcher.max_concurrency())
            .finish()
    }
}

impl PortfolioTracker {
    /// Build with the default provider chains and an empty in-memory store.
    ///
    /// The static catalog comes from `settings.static_catalog_path` when set,
    /// otherwise from the built-in table.
    pub fn new(settings: Settings) -> Result<Self, CoreError> {
        let catalog = match &settings.static_catalog_path {
            Some(path) => StaticCatalog::from_path(path)?,
            None => StaticCatalog::builtin()?,
        };
        let registry = ProviderRegistry::new_with_defaults(&settings, Arc::new(catalog));
        Self::with_registry(settings, registry, Arc::new(MemoryStore::new()))
    }

    /// Build around a caller-supplied registry and store.
    pub fn with_registry(
        settings: Settings,
        registry: ProviderRegistry,
        store: Arc<MemoryStore>,
    ) -> Result<Self, CoreError> {
        let session_lifetime = settings.token_lifetime()?;
        let registry = Arc::new(registry);

        let prices = Arc::new(PriceService::new(Arc::clone(&registry), settings.request_timeout()));
        let fetcher = Arc::new(BatchPriceFetcher::new(
            Arc::clone(&prices),
            settings.effective_concurrency(),
        ));
        let search = Arc::new(SearchService::new(
            Arc::clone(&registry),
            Arc::clone(&prices),
            settings.request_timeout(),
            settings.search_limit,
            settings.enrich_top_n,
        ));
        let holdings = Arc::new(HoldingService::new(store.clone(), Arc::clone(&search)));

        for class in AssetClass::ALL {
            tracing::info!(class = %class, providers = ?registry.provider_names(class), "Price chain");
        }

        Ok(Self {
            portfolio: PortfolioService::new(Arc::clone(&holdings), Arc::clone(&fetcher)),
            watchlist: WatchlistService::new(store.clone(), Arc::clone(&fetcher), Arc::clone(&search)),
            auth: AuthService::new(store.clone(), store.clone(), session_lifetime, PasswordParams::default()),
            dividends: DividendService::new(store.clone(), store.clone(), Arc::clone(&registry)),
            news: NewsService::new(Arc::clone(&registry)),
            performance: PerformanceService::new(settings.reporting_currency.clone()),
            settings,
            store,
            prices,
            fetcher,
            search,
            holdings,
        })
    }

    /// Replace the Argon2 cost parameters used for new password hashes.
    pub fn with_password_params(mut self, params: PasswordParams) -> Result<Self, CoreError> {
        let lifetime = self.settings.token_lifetime()?;
        self.auth = AuthService::new(self.store.clone(), self.store.clone(), lifetime, params);
        Ok(self)
    }

    #[must_use]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    // ── Authentication ──────────────────────────────────────────────

    pub fn register(&self, credentials: &Credentials) -> Result<Session, CoreError> {
        self.auth.register(credentials)
    }

    pub fn login(&self, credentials: &Credentials) -> Result<Session, CoreError> {
        self.auth.login(credentials)
    }

    /// Map a bearer token to the owner id every other call expects.
    pub fn resolve_owner(&self, token: &str) -> Result<Uuid, CoreError> {
        self.auth.resolve_owner(token)
    }

    pub fn logout(&self, token: &str) -> Result<(), CoreError> {
        self.auth.logout(token)
    }

    pub fn forgot_password(&self, email: &str) -> Result<Option<String>, CoreError> {
        self.auth.forgot_password(email)
    }

    pub fn validate_reset_token(&self, token: &str) -> Result<bool, CoreError> {
        self.auth.validate_reset_token(token)
    }

    pub fn reset_password(&self, token: &str, new_password: &str) -> Result<(), CoreError> {
        self.auth.reset_password(token, new_password)
    }

    // ── Holdings & Valuation ────────────────────────────────────────

    pub fn list_holdings(&self, owner_id: Uuid) -> Result<Vec<Holding>, CoreError> {
        self.holdings.list(owner_id)
    }

    pub fn get_holding(&self, owner_id: Uuid, id: Uuid) -> Result<Holding, CoreError> {
        self.holdings.get(owner_id, id)
    }

    pub async fn create_holding(&self, owner_id: Uuid, input: HoldingInput) -> Result<Holding, CoreError> {
        self.holdings.create(owner_id, input).await
    }

    pub async fn update_holding(
        &self,
        owner_id: Uuid,
        id: Uuid,
        input: HoldingInput,
    ) -> Result<Holding, CoreError> {
        self.holdings.update(owner_id, id, input).await
    }

    pub fn delete_holding(&self, owner_id: Uuid, id: Uuid) -> Result<(), CoreError> {
        self.holdings.delete(owner_id, id)
    }

    /// Value every holding of `owner_id` at live prices.
    pub async fn portfolio_summary(&self, owner_id: Uuid) -> Result<Valuation, CoreError> {
        self.portfolio.summary(owner_id).await
    }

    // ── Watchlist ───────────────────────────────────────────────────

    pub async fn list_watchlist(&self, owner_id: Uuid) -> Result<Vec<PricedWatchlistEntry>, CoreError> {
        self.watchlist.list(owner_id).await
    }

    pub async fn add_to_watchlist(
        &self,
        owner_id: Uuid,
        input: WatchlistInput,
    ) -> Result<WatchlistEntry, CoreError> {
        self.watchlist.add(owner_id, input).await
    }

    pub fn remove_from_watchlist(&self, owner_id: Uuid, id: Uuid) -> Result<(), CoreError> {
        self.watchlist.delete(owner_id, id)
    }

    // ── Prices & Search ─────────────────────────────────────────────

    /// Resolve one symbol through its fallback chain.
    pub async fn resolve_price(&self, symbol: &str, class: AssetClass) -> Option<PriceQuote> {
        self.prices.resolve(&SymbolKey::new(symbol, class)).await
    }

    /// Resolve many symbols concurrently.
    pub async fn fetch_prices<I>(&self, keys: I) -> PriceMap
    where
        I: IntoIterator<Item = SymbolKey>,
    {
        self.fetcher.fetch_all(keys).await
    }

    pub async fn search(&self, query: &str, class: AssetClass) -> Vec<SearchHit> {
        self.search.search(query, class).await
    }

    // ── Dividends ───────────────────────────────────────────────────

    pub fn upcoming_dividends(&self, days: Option<i64>) -> Result<Vec<Dividend>, CoreError> {
        self.dividends.list_upcoming(days)
    }

    pub fn dividends_for(&self, ticker: &str) -> Result<Vec<Dividend>, CoreError> {
        self.dividends.by_ticker(ticker)
    }

    pub fn save_dividend(&self, dividend: Dividend) -> Result<Dividend, CoreError> {
        self.dividends.save(dividend)
    }

    pub fn delete_dividend(&self, id: Uuid) -> Result<(), CoreError> {
        self.dividends.delete(id)
    }

    /// Refresh dividend history for every held symbol; returns records written.
    pub async fn refresh_dividends(&self) -> Result<usize, CoreError> {
        self.dividends.refresh_all().await
    }

    // ── News & Performance ──────────────────────────────────────────

    pub async fn latest_news(&self) -> Result<Vec<NewsArticle>, CoreError> {
        self.news.latest().await
    }

    pub fn performance_chart(&self, owner_id: Uuid) -> Result<PerformanceChart, CoreError> {
        let holdings = self.holdings.list(owner_id)?;
        Ok(self.performance.chart(&holdings, Utc::now().date_naive()))
    }

    #[must_use]
    pub fn snapshots(&self) -> Vec<Snapshot> {
        self.performance.snapshots(Utc::now().date_naive())
    }
}
