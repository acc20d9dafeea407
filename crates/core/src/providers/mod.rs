pub mod catalog;
pub mod http;
pub mod parse;
pub mod registry;
pub mod traits;

// API provider implementations
pub mod alphavantage;
pub mod coingecko;
pub mod nse;
pub mod yahoo_finance;
