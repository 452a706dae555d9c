//! Day-by-day portfolio simulation with periodic rebalancing.

use super::allocation::allocate;
use super::calendar::rebalance_dates;
use crate::types::{Holdings, PerformanceRow, PriceRow, PriceTable, RebalancePeriod, TargetWeights};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Tolerance before a weight sum is reported as not adding up to 1.
const WEIGHT_SUM_TOLERANCE: f64 = 0.001;

/// Simulate a fixed-weight portfolio over a price history.
///
/// Holdings are bought at the first row's prices. Each row is valued and
/// recorded before any rebalancing happens on that date, so a rebalance
/// row shows the drift that triggered it. The first row is never
/// rebalanced, even when it closes a calendar period.
///
/// # Arguments
///
/// * `prices` - Price history; must contain a column for every weighted ticker
/// * `weights` - Target weights (not required to sum to 1)
/// * `initial_cash` - Starting capital, must be positive
/// * `period` - Rebalance frequency
///
/// # Errors
///
/// * `Error::EmptyData` if the table has no rows
/// * `Error::InvalidInput` for non-positive cash, a missing ticker column,
///   or a non-positive price on an allocation date
pub fn simulate(
    prices: &PriceTable,
    weights: &TargetWeights,
    initial_cash: f64,
    period: RebalancePeriod,
) -> Result<Vec<PerformanceRow>> {
    if !initial_cash.is_finite() || initial_cash <= 0.0 {
        return Err(Error::InvalidInput(format!(
            "Initial cash must be positive, got {}",
            initial_cash
        )));
    }

    let first = prices.rows().first().ok_or_else(|| {
        Error::EmptyData("Empty price data. Cannot initialize portfolio.".to_string())
    })?;

    if let Some(missing) = weights.keys().find(|t| !prices.has_ticker(t)) {
        return Err(Error::InvalidInput(format!(
            "No price column for {}",
            missing
        )));
    }

    let rebalance_on = rebalance_dates(&prices.dates(), period);
    let initial = allocate(initial_cash, &first.prices, weights)?;

    tracing::debug!(
        "Simulating {} days, {} tickers, {} rebalance dates ({})",
        prices.len(),
        weights.len(),
        rebalance_on.len(),
        period
    );

    let (_, records) = prices.rows().iter().enumerate().try_fold(
        (initial, Vec::with_capacity(prices.len())),
        |(holdings, mut records), (idx, row)| {
            let record = record_day(row, &holdings, weights);
            let total = record.total;
            records.push(record);

            let holdings = if idx > 0 && rebalance_on.contains(&row.date) {
                tracing::debug!("Rebalancing on {} at total value {:.2}", row.date, total);
                allocate(total, &row.prices, weights)?
            } else {
                holdings
            };

            Ok::<_, Error>((holdings, records))
        },
    )?;

    Ok(records)
}

/// Value the holdings at one row's prices.
fn record_day(row: &PriceRow, holdings: &Holdings, weights: &TargetWeights) -> PerformanceRow {
    let positions = holdings.position_values(&row.prices);
    let total = holdings.total_value(&row.prices);

    let max_weight_deviation = weights
        .iter()
        .map(|(ticker, target)| {
            let value = positions.get(ticker).copied().unwrap_or(0.0);
            let current = if total > 0.0 { value / total } else { 0.0 };
            (current - target).abs()
        })
        .fold(0.0, f64::max);

    PerformanceRow {
        date: row.date,
        positions,
        cash: holdings.cash,
        total,
        max_weight_deviation,
    }
}

/// Returns the weight sum when it is not within tolerance of 1.
///
/// The simulation accepts any weights; this only exists so callers can warn.
pub fn weight_sum_warning(weights: &TargetWeights) -> Option<f64> {
    let sum: f64 = weights.values().sum();
    if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
        Some(sum)
    } else {
        None
    }
}

/// Target versus current weight for one ticker.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AllocationDrift {
    pub ticker: String,
    pub target: f64,
    pub current: f64,
}

/// Current allocation of a performance row compared with its targets.
pub fn allocation_drift(row: &PerformanceRow, weights: &TargetWeights) -> Vec<AllocationDrift> {
    weights
        .iter()
        .map(|(ticker, &target)| AllocationDrift {
            ticker: ticker.clone(),
            target,
            current: row.weight(ticker),
        })
        .collect()
}

/// Average absolute deviation from target weights across the whole history.
///
/// For each row, the mean over tickers of |current - target|; then the mean
/// over rows. Returns 0 for an empty history or empty weights.
pub fn average_deviation(performance: &[PerformanceRow], weights: &TargetWeights) -> f64 {
    if performance.is_empty() || weights.is_empty() {
        return 0.0;
    }

    let total: f64 = performance
        .iter()
        .map(|row| {
            weights
                .iter()
                .map(|(ticker, target)| (row.weight(ticker) - target).abs())
                .sum::<f64>()
                / weights.len() as f64
        })
        .sum();

    total / performance.len() as f64
}
