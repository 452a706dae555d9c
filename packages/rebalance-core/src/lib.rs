//! Rebalance Core - Fixed-weight portfolio backtesting library.
//!
//! This crate simulates a buy-and-rebalance portfolio over a table of adjusted
//! close prices and reports how it performed:
//!
//! - **Allocation**: Integer share allocation from cash and target weights
//! - **Simulation**: Day-by-day valuation with calendar rebalancing
//! - **Returns**: Daily, monthly and annual return series
//! - **Risk metrics**: Volatility, Sharpe, Sortino, max drawdown, VaR
//! - **Benchmark comparison**: Beta, alpha, tracking error, information ratio
//!
//! # Example
//!
//! ```rust
//! use chrono::NaiveDate;
//! use rebalance_core::{metrics, returns, simulate, PriceRow, PriceTable, RebalancePeriod};
//! use std::collections::BTreeMap;
//!
//! let day = |d| NaiveDate::from_ymd_opt(2024, 1, d).unwrap();
//! let row = |d, a: f64, b: f64| {
//!     PriceRow::new(day(d), [("VTI".to_string(), a), ("BND".to_string(), b)].into())
//! };
//! let prices = PriceTable::new(vec![row(2, 100.0, 50.0), row(3, 101.0, 50.5)]).unwrap();
//!
//! let weights = BTreeMap::from([("VTI".to_string(), 0.6), ("BND".to_string(), 0.4)]);
//! let performance = simulate(&prices, &weights, 100_000.0, RebalancePeriod::Quarterly).unwrap();
//!
//! let series = returns(&performance);
//! let report = metrics(&series.daily_values());
//! println!("Total return: {:.2}%", report.total_return * 100.0);
//! ```

pub mod analytics;
pub mod backtest;
pub mod config;
pub mod portfolio;
pub mod types;

// Re-export commonly used types
pub use types::{
    ApiResponse, ComparisonReport, Holdings, MetricsReport, PerformanceRow, PeriodReturn,
    PriceRow, PriceTable, RebalancePeriod, ReturnSeries, TargetWeights,
};

// Re-export main functionality
pub use analytics::{
    align_returns, compare, metrics, monthly_table, normalize_to_base, price_returns, returns,
    with_blend, MonthlyReturnsTable,
};
pub use backtest::{run_backtest, BacktestReport};
pub use config::BacktestConfig;
pub use portfolio::{
    allocate, allocation_drift, average_deviation, rebalance_dates, simulate, AllocationDrift,
};

/// Error types for rebalance-core operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("TOML serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Empty data: {0}")]
    EmptyData(String),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),
}

/// Result type for rebalance-core operations.
pub type Result<T> = std::result::Result<T, Error>;
