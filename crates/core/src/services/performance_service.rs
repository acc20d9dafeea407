use chrono::{Days, NaiveDate};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::models::holding::Holding;
use crate::models::performance::{PerformanceChart, PerformancePoint, Snapshot};

const CHART_SEED: u64 = 12_345;
const SNAPSHOT_SEED: u64 = 67_890;

const CHART_DAYS: u64 = 30;
const SNAPSHOT_DAYS: u64 = 7;

/// Added to the cost basis to form the chart's starting value.
const CHART_BASE_VALUE: f64 = 100_000.0;
/// Daily move is uniform in `±DAILY_SWING / 2`.
const DAILY_SWING: f64 = 0.04;
/// Upward drift applied every day on top of the random move.
const DAILY_DRIFT: f64 = 1.0003;

const SNAPSHOT_BASE_VALUE: f64 = 50_000.0;
const SNAPSHOT_SPREAD: f64 = 10_000.0;

/// Synthetic performance history.
///
/// Both series come from fixed seeds, so the same holdings and the same
/// `today` always produce the same output.
pub struct PerformanceService {
    currency: String,
}

impl PerformanceService {
    pub fn new(currency: impl Into<String>) -> Self {
        Self {
            currency: currency.into(),
        }
    }

    /// Thirty daily points ending at `today`, starting from the base value
    /// plus the holdings' cost basis.
    pub fn chart(&self, holdings: &[Holding], today: NaiveDate) -> PerformanceChart {
        let initial = CHART_BASE_VALUE + holdings.iter().map(Holding::cost_basis).sum::<f64>();
        let mut rng = StdRng::seed_from_u64(CHART_SEED);
        let mut current = initial;

        let data = trailing_days(today, CHART_DAYS)
            .map(|date| {
                let change = (rng.gen::<f64>() - 0.5) * DAILY_SWING;
                current *= 1.0 + change;
                current *= DAILY_DRIFT;
                PerformancePoint {
                    date,
                    value: round2(current),
                    change: round2((current - initial) / initial * 100.0),
                }
            })
            .collect();

        PerformanceChart {
            data,
            currency: self.currency.clone(),
            period: format!("{CHART_DAYS}_DAYS"),
        }
    }

    /// Seven daily totals ending at `today`, each in `[50 000, 60 000)`.
    pub fn snapshots(&self, today: NaiveDate) -> Vec<Snapshot> {
        let mut rng = StdRng::seed_from_u64(SNAPSHOT_SEED);
        trailing_days(today, SNAPSHOT_DAYS)
            .map(|as_of_date| Snapshot {
                as_of_date,
                total_value: round2(SNAPSHOT_BASE_VALUE + rng.gen::<f64>() * SNAPSHOT_SPREAD),
            })
            .collect()
    }
}

/// `count` consecutive dates, oldest first, the last being `today`.
fn trailing_days(today: NaiveDate, count: u64) -> impl Iterator<Item = NaiveDate> {
    (0..count)
        .rev()
        .filter_map(move |back| today.checked_sub_days(Days::new(back)))
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
