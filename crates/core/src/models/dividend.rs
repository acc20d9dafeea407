use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A dividend event for one ticker.
///
/// At most one record exists per `(ticker, ex_date)`; saving another record
/// with the same pair updates the stored one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dividend {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    pub ticker: String,
    #[serde(default)]
    pub amount: Option<f64>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub declaration_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub ex_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub record_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub pay_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub frequency: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub fetched_at: Option<DateTime<Utc>>,
}

impl Dividend {
    /// A minimal record as produced by the daily-adjusted series fetch.
    pub fn fetched(ticker: &str, amount: f64, ex_date: DateTime<Utc>, source: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            ticker: ticker.trim().to_uppercase(),
            amount: Some(amount),
            currency: Some("USD".to_string()),
            declaration_date: None,
            ex_date: Some(ex_date),
            record_date: None,
            pay_date: None,
            frequency: None,
            source: Some(source.to_string()),
            fetched_at: Some(Utc::now()),
        }
    }
}
