pub mod asset;
pub mod dividend;
pub mod holding;
pub mod news;
pub mod performance;
pub mod quote;
pub mod search;
pub mod settings;
pub mod user;
pub mod valuation;
pub mod watchlist;
