use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A single point of the synthetic performance chart.
///
/// The series is generated, not measured. It gives the frontend a stable
/// curve to render until real history is recorded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformancePoint {
    pub date: NaiveDate,

    /// Portfolio value in the reporting currency, rounded to 2 dp
    pub value: f64,

    /// Percent change against the series start, rounded to 2 dp
    pub change: f64,
}

/// The full chart payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceChart {
    pub data: Vec<PerformancePoint>,
    pub currency: String,
    pub period: String,
}

/// One synthetic daily snapshot of total portfolio value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub as_of_date: NaiveDate,
    pub total_value: f64,
}
