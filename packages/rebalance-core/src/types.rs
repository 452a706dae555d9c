//! Core data types for the rebalancing backtester.

use crate::{Error, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Target allocation: ticker to fraction of portfolio value.
///
/// Weights are expected to sum to roughly 1 but this is never enforced.
pub type TargetWeights = BTreeMap<String, f64>;

/// Adjusted close prices for every ticker on one trading day.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PriceRow {
    /// Trading date
    pub date: NaiveDate,
    /// Ticker to adjusted close price
    pub prices: BTreeMap<String, f64>,
}

impl PriceRow {
    /// Create a new price row.
    pub fn new(date: NaiveDate, prices: BTreeMap<String, f64>) -> Self {
        Self { date, prices }
    }

    /// Price of a ticker on this date, if present.
    pub fn price(&self, ticker: &str) -> Option<f64> {
        self.prices.get(ticker).copied()
    }
}

/// Price history: one row per trading day, dates strictly increasing.
///
/// Every row carries the same set of tickers. Missing values must be
/// forward-filled by whoever supplies the data; the table rejects rows with
/// gaps rather than guessing.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(try_from = "Vec<PriceRow>", into = "Vec<PriceRow>")]
pub struct PriceTable {
    rows: Vec<PriceRow>,
}

impl PriceTable {
    /// Build a table, validating ordering and column consistency.
    pub fn new(rows: Vec<PriceRow>) -> Result<Self> {
        if let Some(first) = rows.first() {
            for pair in rows.windows(2) {
                if pair[1].date <= pair[0].date {
                    return Err(Error::InvalidInput(format!(
                        "Dates must be strictly increasing: {} follows {}",
                        pair[1].date, pair[0].date
                    )));
                }
            }

            for row in &rows {
                if !row.prices.keys().eq(first.prices.keys()) {
                    return Err(Error::InvalidInput(format!(
                        "Row {} has a different set of tickers than {}",
                        row.date, first.date
                    )));
                }
                if let Some((ticker, _)) = row.prices.iter().find(|(_, p)| !p.is_finite()) {
                    return Err(Error::InvalidInput(format!(
                        "Price for {} on {} is not a finite number",
                        ticker, row.date
                    )));
                }
            }
        }

        Ok(Self { rows })
    }

    /// All rows in chronological order.
    pub fn rows(&self) -> &[PriceRow] {
        &self.rows
    }

    /// Trading dates in chronological order.
    pub fn dates(&self) -> Vec<NaiveDate> {
        self.rows.iter().map(|r| r.date).collect()
    }

    /// Column names (tickers). Empty for an empty table.
    pub fn tickers(&self) -> Vec<String> {
        self.rows
            .first()
            .map(|r| r.prices.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Whether the table has a column for this ticker.
    pub fn has_ticker(&self, ticker: &str) -> bool {
        self.rows
            .first()
            .map(|r| r.prices.contains_key(ticker))
            .unwrap_or(false)
    }

    /// A single column as dated prices.
    pub fn column(&self, ticker: &str) -> Option<Vec<(NaiveDate, f64)>> {
        self.rows
            .iter()
            .map(|r| r.price(ticker).map(|p| (r.date, p)))
            .collect()
    }

    /// Number of trading days.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl TryFrom<Vec<PriceRow>> for PriceTable {
    type Error = Error;

    fn try_from(rows: Vec<PriceRow>) -> Result<Self> {
        Self::new(rows)
    }
}

impl From<PriceTable> for Vec<PriceRow> {
    fn from(table: PriceTable) -> Self {
        table.rows
    }
}

/// Shares owned per ticker plus uninvested cash.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Holdings {
    /// Whole shares per ticker
    pub shares: BTreeMap<String, u64>,
    /// Cash left over after rounding down to whole shares
    pub cash: f64,
}

impl Holdings {
    /// Market value of each position at the given prices.
    ///
    /// Tickers without a price are valued at zero.
    pub fn position_values(&self, prices: &BTreeMap<String, f64>) -> BTreeMap<String, f64> {
        self.shares
            .iter()
            .map(|(ticker, &shares)| {
                let price = prices.get(ticker).copied().unwrap_or(0.0);
                (ticker.clone(), shares as f64 * price)
            })
            .collect()
    }

    /// Total value of positions and cash.
    pub fn total_value(&self, prices: &BTreeMap<String, f64>) -> f64 {
        self.position_values(prices).values().sum::<f64>() + self.cash
    }
}

/// Portfolio state recorded at the close of one trading day.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PerformanceRow {
    /// Trading date
    pub date: NaiveDate,
    /// Market value per ticker
    pub positions: BTreeMap<String, f64>,
    /// Uninvested cash
    pub cash: f64,
    /// Sum of position values and cash
    pub total: f64,
    /// Largest absolute gap between current and target weight
    pub max_weight_deviation: f64,
}

impl PerformanceRow {
    /// Current weight of a ticker in this row (0 if absent or total is not positive).
    pub fn weight(&self, ticker: &str) -> f64 {
        match self.positions.get(ticker) {
            Some(value) if self.total > 0.0 => value / self.total,
            _ => 0.0,
        }
    }
}

/// A fractional return labeled with the end of its period.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct PeriodReturn {
    /// Period end date
    pub date: NaiveDate,
    /// Fractional return (0.01 for 1%)
    pub value: f64,
}

/// Daily, monthly and annual returns derived from portfolio totals.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ReturnSeries {
    pub daily: Vec<PeriodReturn>,
    pub monthly: Vec<PeriodReturn>,
    pub annual: Vec<PeriodReturn>,
}

impl ReturnSeries {
    /// Daily returns without their dates.
    pub fn daily_values(&self) -> Vec<f64> {
        self.daily.iter().map(|r| r.value).collect()
    }
}

/// Scalar performance statistics of a daily return series.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct MetricsReport {
    /// (1 + mean daily return)^252 - 1
    pub annualized_return: f64,
    /// Sample standard deviation scaled by sqrt(252)
    pub annualized_volatility: f64,
    pub sharpe_ratio: f64,
    pub sortino_ratio: f64,
    /// Worst peak-to-trough decline, as a negative fraction
    pub max_drawdown: f64,
    /// 5th percentile of a normal fit to daily returns
    pub var_95: f64,
    pub total_return: f64,
}

/// Portfolio statistics relative to a benchmark.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ComparisonReport {
    pub beta: f64,
    /// Annualized return unexplained by beta (risk-free rate of 0)
    pub alpha: f64,
    pub tracking_error: f64,
    pub information_ratio: f64,
}

/// How often the portfolio is brought back to its target weights.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum RebalancePeriod {
    /// Buy once, never rebalance
    Never,
    /// Last trading day of each month
    Monthly,
    /// Last trading day of each quarter
    #[default]
    Quarterly,
    /// Last trading day of each year
    Annually,
}

impl RebalancePeriod {
    /// Short period code (`N`, `M`, `Q`, `A`).
    pub fn code(&self) -> &'static str {
        match self {
            RebalancePeriod::Never => "N",
            RebalancePeriod::Monthly => "M",
            RebalancePeriod::Quarterly => "Q",
            RebalancePeriod::Annually => "A",
        }
    }

    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            RebalancePeriod::Never => "Never",
            RebalancePeriod::Monthly => "Monthly",
            RebalancePeriod::Quarterly => "Quarterly",
            RebalancePeriod::Annually => "Annually",
        }
    }
}

impl FromStr for RebalancePeriod {
    type Err = Error;

    /// Accepts the codes above, their long names, and multi-year codes such
    /// as `100Y`: any span longer than a year never closes inside a price
    /// history and parses as `Never`.
    fn from_str(s: &str) -> Result<Self> {
        let code = s.trim().to_uppercase();
        match code.as_str() {
            "N" | "NEVER" | "NONE" => return Ok(RebalancePeriod::Never),
            "M" | "ME" | "MONTHLY" => return Ok(RebalancePeriod::Monthly),
            "Q" | "QE" | "QUARTERLY" => return Ok(RebalancePeriod::Quarterly),
            "A" | "Y" | "YE" | "ANNUALLY" | "YEARLY" => return Ok(RebalancePeriod::Annually),
            _ => {}
        }

        let years = code
            .strip_suffix(['Y', 'A'])
            .and_then(|n| n.parse::<u32>().ok());
        match years {
            Some(1) => Ok(RebalancePeriod::Annually),
            Some(n) if n > 1 => Ok(RebalancePeriod::Never),
            _ => Err(Error::InvalidConfig(format!(
                "Unknown rebalance period: {}",
                s.trim()
            ))),
        }
    }
}

impl TryFrom<String> for RebalancePeriod {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<RebalancePeriod> for String {
    fn from(period: RebalancePeriod) -> Self {
        period.code().to_string()
    }
}

impl fmt::Display for RebalancePeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// API response wrapper for CLI output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    /// Create a successful response.
    pub fn ok(data: T) -> Self {
        Self {
            ok: true,
            data: Some(data),
            error: None,
        }
    }

    /// Create an error response.
    pub fn err(error: impl Into<String>) -> Self {
        Self {
            ok: false,
            data: None,
            error: Some(error.into()),
        }
    }
}
