pub mod auth_service;
pub mod batch_service;
pub mod dividend_service;
pub mod holding_service;
pub mod news_service;
pub mod performance_service;
pub mod portfolio_service;
pub mod price_service;
pub mod search_service;
pub mod valuation_service;
pub mod watchlist_service;
