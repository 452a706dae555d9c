//! End-to-end backtest: simulation, returns, metrics and benchmark comparison.

use crate::analytics::{
    align_returns, compare, metrics, monthly_table, price_returns, returns, MonthlyReturnsTable,
};
use crate::config::BacktestConfig;
use crate::portfolio::{allocation_drift, average_deviation, simulate, AllocationDrift};
use crate::types::{ComparisonReport, MetricsReport, PerformanceRow, PriceTable, ReturnSeries};
use crate::{Error, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Everything a presentation layer needs to display a backtest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BacktestReport {
    /// Configuration the backtest ran with
    pub config: BacktestConfig,
    /// First trading date
    pub start_date: NaiveDate,
    /// Last trading date
    pub end_date: NaiveDate,
    /// Daily portfolio state
    pub performance: Vec<PerformanceRow>,
    /// Daily, monthly and annual returns
    pub returns: ReturnSeries,
    /// Performance statistics of the daily returns
    pub metrics: MetricsReport,
    /// Statistics relative to the benchmark, when benchmark prices were given
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comparison: Option<ComparisonReport>,
    /// Monthly returns by year, in percent
    pub monthly_returns: MonthlyReturnsTable,
    /// Target versus current weight on the last day
    pub allocation: Vec<AllocationDrift>,
    /// Mean absolute weight deviation over the whole history
    pub average_deviation: f64,
}

/// Run a full backtest.
///
/// # Arguments
///
/// * `config` - Portfolio weights, rebalance frequency, starting capital and benchmark ticker
/// * `prices` - Price history for the portfolio's tickers
/// * `benchmark` - Optional price history containing the configured benchmark ticker
///
/// # Errors
///
/// Fails on an invalid config or any structural problem reported by
/// [`simulate`]. A benchmark table without the configured ticker is an
/// `Error::InvalidInput`.
pub fn run_backtest(
    config: &BacktestConfig,
    prices: &PriceTable,
    benchmark: Option<&PriceTable>,
) -> Result<BacktestReport> {
    config.validate()?;

    let performance = simulate(prices, &config.weights, config.initial_cash, config.rebalance)?;
    let series = returns(&performance);
    let report = metrics(&series.daily_values());

    let comparison = match (benchmark, config.benchmark.as_deref()) {
        (Some(table), Some(ticker)) => {
            let bench = price_returns(table, ticker)?;
            let (portfolio_daily, benchmark_daily) = align_returns(&series.daily, &bench);
            tracing::debug!(
                "Comparing against {} over {} common days",
                ticker,
                portfolio_daily.len()
            );
            Some(compare(&portfolio_daily, &benchmark_daily)?)
        }
        (Some(_), None) => {
            tracing::warn!("Benchmark prices given but no benchmark ticker configured");
            None
        }
        (None, _) => None,
    };

    let (start_date, end_date, allocation) = match (performance.first(), performance.last()) {
        (Some(first), Some(last)) => (
            first.date,
            last.date,
            allocation_drift(last, &config.weights),
        ),
        _ => return Err(Error::EmptyData("Simulation produced no rows".to_string())),
    };

    tracing::info!(
        "Backtest {} to {}: total return {:.2}%, {} rebalancing",
        start_date,
        end_date,
        report.total_return * 100.0,
        config.rebalance
    );

    Ok(BacktestReport {
        config: config.clone(),
        start_date,
        end_date,
        monthly_returns: monthly_table(&series.monthly),
        average_deviation: average_deviation(&performance, &config.weights),
        allocation,
        performance,
        returns: series,
        metrics: report,
        comparison,
    })
}

/// Load a price table from a JSON file of `{"date", "prices"}` rows.
pub fn load_price_table(path: &Path) -> Result<PriceTable> {
    let content = fs::read_to_string(path)?;
    let table: PriceTable = serde_json::from_str(&content)?;
    tracing::debug!(
        "Loaded {} rows for {:?} from {}",
        table.len(),
        table.tickers(),
        path.display()
    );
    Ok(table)
}
