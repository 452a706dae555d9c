//! Portfolio performance and risk metrics.
//!
//! Provides annualized return and volatility, Sharpe and Sortino ratios,
//! max drawdown, and parametric VaR over a daily return series.
//!
//! All ratios resolve to 0 rather than NaN or infinity when their
//! denominator vanishes.

use super::stats::{mean, norm_ppf, sample_std};
use crate::types::MetricsReport;

/// Trading days per year used for annualization.
pub const TRADING_DAYS: f64 = 252.0;

/// VaR reported when a normal fit cannot be made.
pub const VAR_FALLBACK: f64 = -0.02;

/// Lower tail probability for VaR.
const VAR_TAIL: f64 = 0.05;

/// Calculate all performance metrics for a daily return series.
///
/// # Arguments
///
/// * `daily_returns` - Fractional daily returns (e.g., 0.01 for 1%)
///
/// # Returns
///
/// A `MetricsReport`. Never fails: an empty or constant series yields
/// zeros and the VaR fallback.
pub fn metrics(daily_returns: &[f64]) -> MetricsReport {
    let annualized_return = annualized_return(daily_returns);
    let annualized_volatility = annualized_volatility(daily_returns);

    let report = MetricsReport {
        annualized_return,
        annualized_volatility,
        sharpe_ratio: sharpe_ratio(daily_returns),
        sortino_ratio: sortino_ratio(daily_returns),
        max_drawdown: max_drawdown(daily_returns),
        var_95: value_at_risk(daily_returns),
        total_return: total_return(daily_returns),
    };

    if daily_returns.len() < 2 {
        tracing::warn!(
            "Only {} daily returns available, metrics are degenerate",
            daily_returns.len()
        );
    }

    report
}

/// Compound the mean daily return over a year: (1 + mean)^252 - 1.
///
/// Returns 0 for an empty series.
pub fn annualized_return(daily_returns: &[f64]) -> f64 {
    if daily_returns.is_empty() {
        return 0.0;
    }
    (1.0 + mean(daily_returns)).powf(TRADING_DAYS) - 1.0
}

/// Sample standard deviation of daily returns scaled by sqrt(252).
///
/// Returns 0 with fewer than two returns.
pub fn annualized_volatility(daily_returns: &[f64]) -> f64 {
    sample_std(daily_returns)
        .map(|std| std * TRADING_DAYS.sqrt())
        .unwrap_or(0.0)
}

/// Annualized return divided by annualized volatility (risk-free rate of 0).
///
/// Returns 0 when volatility is 0.
pub fn sharpe_ratio(daily_returns: &[f64]) -> f64 {
    let vol = annualized_volatility(daily_returns);
    if vol > 0.0 {
        annualized_return(daily_returns) / vol
    } else {
        0.0
    }
}

/// Annualized return divided by annualized downside deviation.
///
/// Downside deviation is the sample standard deviation of the negative
/// returns only. Returns 0 when there are no negative returns or their
/// deviation is undefined or zero.
pub fn sortino_ratio(daily_returns: &[f64]) -> f64 {
    let downside: Vec<f64> = daily_returns.iter().filter(|&&r| r < 0.0).copied().collect();

    let downside_dev = sample_std(&downside)
        .map(|std| std * TRADING_DAYS.sqrt())
        .unwrap_or(0.0);

    if downside_dev > 0.0 {
        annualized_return(daily_returns) / downside_dev
    } else {
        0.0
    }
}

/// Calculate maximum drawdown from a series of returns.
///
/// Returns the worst decline of the compounded series from its running peak
/// as a non-positive fraction (e.g., -0.15 for a 15% drawdown).
pub fn max_drawdown(daily_returns: &[f64]) -> f64 {
    let mut cumulative = 1.0;
    let mut running_max = f64::NEG_INFINITY;
    let mut worst: f64 = 0.0;

    for r in daily_returns {
        cumulative *= 1.0 + r;
        running_max = running_max.max(cumulative);
        if running_max > 0.0 {
            worst = worst.min(cumulative / running_max - 1.0);
        }
    }

    worst
}

/// Parametric 95% Value at Risk of a daily return.
///
/// The 5th percentile of a normal distribution fitted to the mean and sample
/// standard deviation of the returns, as a fractional (usually negative)
/// return. Falls back to `VAR_FALLBACK` when the fit is undefined: fewer
/// than two returns, zero deviation, or a non-finite result.
pub fn value_at_risk(daily_returns: &[f64]) -> f64 {
    let var = match sample_std(daily_returns) {
        Some(std) if std > 0.0 => mean(daily_returns) + std * norm_ppf(VAR_TAIL),
        _ => return VAR_FALLBACK,
    };

    if var.is_finite() {
        var
    } else {
        VAR_FALLBACK
    }
}

/// Compounded return over the whole series, 0 when empty.
pub fn total_return(daily_returns: &[f64]) -> f64 {
    if daily_returns.is_empty() {
        return 0.0;
    }
    daily_returns.iter().map(|r| 1.0 + r).product::<f64>() - 1.0
}
