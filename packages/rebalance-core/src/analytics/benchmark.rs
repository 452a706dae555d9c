//! Benchmark preparation and relative performance statistics.

use super::metrics::TRADING_DAYS;
use super::returns::pct_change;
use super::stats::{mean, sample_covariance, sample_std, sample_variance};
use crate::types::{ComparisonReport, PeriodReturn, PriceRow, PriceTable};
use crate::{Error, Result};
use std::collections::BTreeMap;

/// Compare portfolio returns with benchmark returns.
///
/// Both slices must hold daily returns for the same dates in the same order;
/// use [`align_returns`] to pair dated series first.
///
/// - beta: sample covariance / sample variance of the benchmark, 1 when the
///   benchmark variance is 0 or undefined
/// - alpha: annualized portfolio mean - beta * annualized benchmark mean
/// - tracking_error: annualized sample deviation of the return difference
/// - information_ratio: annualized mean difference / tracking error, 0 when
///   tracking error is 0
///
/// # Errors
///
/// Returns `Error::InvalidInput` if the slices differ in length.
pub fn compare(portfolio: &[f64], benchmark: &[f64]) -> Result<ComparisonReport> {
    if portfolio.len() != benchmark.len() {
        return Err(Error::InvalidInput(format!(
            "Portfolio has {} returns but benchmark has {}",
            portfolio.len(),
            benchmark.len()
        )));
    }

    let beta = match (
        sample_covariance(portfolio, benchmark),
        sample_variance(benchmark),
    ) {
        (Some(cov), Some(var)) if var > 0.0 => cov / var,
        _ => 1.0,
    };

    let portfolio_mean = mean(portfolio);
    let benchmark_mean = mean(benchmark);
    let alpha = portfolio_mean * TRADING_DAYS - beta * benchmark_mean * TRADING_DAYS;

    let diff: Vec<f64> = portfolio.iter().zip(benchmark).map(|(p, b)| p - b).collect();
    let tracking_error = sample_std(&diff)
        .map(|std| std * TRADING_DAYS.sqrt())
        .unwrap_or(0.0);

    let information_ratio = if tracking_error > 0.0 {
        (portfolio_mean - benchmark_mean) * TRADING_DAYS / tracking_error
    } else {
        0.0
    };

    Ok(ComparisonReport {
        beta,
        alpha,
        tracking_error,
        information_ratio,
    })
}

/// Pair two dated return series on their common dates.
///
/// Dates present in only one series are dropped. The output keeps the
/// portfolio's order.
pub fn align_returns(portfolio: &[PeriodReturn], benchmark: &[PeriodReturn]) -> (Vec<f64>, Vec<f64>) {
    let by_date: BTreeMap<_, f64> = benchmark.iter().map(|r| (r.date, r.value)).collect();

    portfolio
        .iter()
        .filter_map(|p| by_date.get(&p.date).map(|b| (p.value, *b)))
        .unzip()
}

/// Daily returns of a single price column.
pub fn price_returns(prices: &PriceTable, ticker: &str) -> Result<Vec<PeriodReturn>> {
    let column = prices
        .column(ticker)
        .ok_or_else(|| Error::InvalidInput(format!("No price column for {}", ticker)))?;

    let values: Vec<f64> = column.iter().map(|(_, p)| *p).collect();

    Ok(column
        .iter()
        .skip(1)
        .zip(pct_change(&values))
        .map(|((date, _), value)| PeriodReturn { date: *date, value })
        .collect())
}

/// Rescale every column so it starts at `base` (e.g. 100).
///
/// # Errors
///
/// Returns `Error::InvalidInput` if a column starts at a non-positive price.
pub fn normalize_to_base(prices: &PriceTable, base: f64) -> Result<PriceTable> {
    let Some(first) = prices.rows().first() else {
        return Ok(prices.clone());
    };

    if let Some((ticker, p)) = first.prices.iter().find(|(_, p)| **p <= 0.0) {
        return Err(Error::InvalidInput(format!(
            "Cannot normalize {} from a starting price of {}",
            ticker, p
        )));
    }

    let rows = prices
        .rows()
        .iter()
        .map(|row| {
            let scaled = row
                .prices
                .iter()
                .map(|(ticker, p)| (ticker.clone(), p / first.prices[ticker] * base))
                .collect();
            PriceRow::new(row.date, scaled)
        })
        .collect();

    PriceTable::new(rows)
}

/// Add a column that is a fixed-weight blend of existing columns.
///
/// The blend is a weighted sum of the component prices on each date, so it
/// is usually applied to a table already normalized to a common base. The
/// classic 60/40 benchmark is `with_blend(&t, "60/40", &[("^GSPC", 0.6), ("BND", 0.4)])`.
///
/// # Errors
///
/// Returns `Error::InvalidInput` if a component column is missing or the
/// blend name is already a column.
pub fn with_blend(prices: &PriceTable, name: &str, components: &[(&str, f64)]) -> Result<PriceTable> {
    if prices.is_empty() {
        return Ok(prices.clone());
    }
    if prices.has_ticker(name) {
        return Err(Error::InvalidInput(format!("Column {} already exists", name)));
    }
    if let Some((missing, _)) = components.iter().find(|(t, _)| !prices.has_ticker(t)) {
        return Err(Error::InvalidInput(format!(
            "No price column for {}",
            missing
        )));
    }

    let rows = prices
        .rows()
        .iter()
        .map(|row| {
            let blended: f64 = components
                .iter()
                .map(|(ticker, weight)| row.prices.get(*ticker).copied().unwrap_or(0.0) * weight)
                .sum();
            let mut prices = row.prices.clone();
            prices.insert(name.to_string(), blended);
            PriceRow::new(row.date, prices)
        })
        .collect();

    PriceTable::new(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use chrono::NaiveDate;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    fn table(rows: &[(u32, &[(&str, f64)])]) -> PriceTable {
        PriceTable::new(
            rows.iter()
                .map(|(d, prices)| {
                    PriceRow::new(date(*d), prices.iter().map(|(t, p)| (t.to_string(), *p)).collect())
                })
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_compare_identical_series() {
        let returns = vec![0.01, -0.02, 0.015, 0.003, -0.007, 0.012];

        let report = compare(&returns, &returns).unwrap();

        assert_abs_diff_eq!(report.beta, 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(report.alpha, 0.0, epsilon = 1e-12);
        assert_eq!(report.tracking_error, 0.0);
        assert_eq!(report.information_ratio, 0.0);
    }

    #[test]
    fn test_compare_leveraged_portfolio() {
        let benchmark = vec![0.01, -0.02, 0.015, 0.003, -0.007, 0.012];
        let portfolio: Vec<f64> = benchmark.iter().map(|r| 2.0 * r).collect();

        let report = compare(&portfolio, &benchmark).unwrap();

        assert_abs_diff_eq!(report.beta, 2.0, epsilon = 1e-9);
        // alpha = 252 * (2m - 2m) = 0
        assert_abs_diff_eq!(report.alpha, 0.0, epsilon = 1e-9);
        // difference equals the benchmark itself
        let expected_te = sample_std(&benchmark).unwrap() * TRADING_DAYS.sqrt();
        assert_abs_diff_eq!(report.tracking_error, expected_te, epsilon = 1e-12);
        assert_abs_diff_eq!(
            report.information_ratio,
            mean(&benchmark) * TRADING_DAYS / expected_te,
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_compare_flat_benchmark() {
        let portfolio = vec![0.01, 0.02, -0.01];
        let benchmark = vec![0.0, 0.0, 0.0];

        let report = compare(&portfolio, &benchmark).unwrap();

        assert_eq!(report.beta, 1.0);
        assert_abs_diff_eq!(report.alpha, mean(&portfolio) * 252.0, epsilon = 1e-12);
        assert!(report.tracking_error > 0.0);
    }

    #[test]
    fn test_compare_constant_series() {
        // Constant benchmark: no variance, so beta falls back to 1
        let portfolio = vec![0.01, -0.02, 0.015, 0.003];
        let report = compare(&portfolio, &[0.001; 4]).unwrap();
        assert_eq!(report.beta, 1.0);

        // Constant return gap: no tracking error, no information ratio
        let benchmark = vec![0.003; 40];
        let portfolio: Vec<f64> = benchmark.iter().map(|r| r + 0.001).collect();
        let report = compare(&portfolio, &benchmark).unwrap();
        assert_eq!(report.tracking_error, 0.0);
        assert_eq!(report.information_ratio, 0.0);
    }

    #[test]
    fn test_compare_degenerate_lengths() {
        let report = compare(&[], &[]).unwrap();
        assert_eq!(report.beta, 1.0);
        assert_eq!(report.alpha, 0.0);
        assert_eq!(report.tracking_error, 0.0);
        assert_eq!(report.information_ratio, 0.0);

        let result = compare(&[0.01, 0.02], &[0.01]);
        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_align_returns() {
        let portfolio = vec![
            PeriodReturn { date: date(4), value: 0.01 },
            PeriodReturn { date: date(5), value: 0.02 },
            PeriodReturn { date: date(6), value: 0.03 },
        ];
        let benchmark = vec![
            PeriodReturn { date: date(5), value: -0.02 },
            PeriodReturn { date: date(6), value: -0.03 },
            PeriodReturn { date: date(7), value: -0.04 },
        ];

        let (p, b) = align_returns(&portfolio, &benchmark);
        assert_eq!(p, vec![0.02, 0.03]);
        assert_eq!(b, vec![-0.02, -0.03]);
    }

    #[test]
    fn test_price_returns() {
        let prices = table(&[
            (4, &[("^GSPC", 100.0)]),
            (5, &[("^GSPC", 102.0)]),
            (6, &[("^GSPC", 99.96)]),
        ]);

        let returns = price_returns(&prices, "^GSPC").unwrap();
        assert_eq!(returns.len(), 2);
        assert_eq!(returns[0].date, date(5));
        assert_abs_diff_eq!(returns[0].value, 0.02, epsilon = 1e-12);
        assert_abs_diff_eq!(returns[1].value, -0.02, epsilon = 1e-12);

        assert!(matches!(price_returns(&prices, "BND"), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_normalize_and_blend() {
        let prices = table(&[
            (4, &[("^GSPC", 5000.0), ("BND", 72.0)]),
            (5, &[("^GSPC", 5100.0), ("BND", 71.28)]),
        ]);

        let normalized = normalize_to_base(&prices, 100.0).unwrap();
        assert_eq!(normalized.rows()[0].prices["^GSPC"], 100.0);
        assert_eq!(normalized.rows()[0].prices["BND"], 100.0);
        assert_abs_diff_eq!(normalized.rows()[1].prices["^GSPC"], 102.0, epsilon = 1e-9);
        assert_abs_diff_eq!(normalized.rows()[1].prices["BND"], 99.0, epsilon = 1e-9);

        let blended = with_blend(&normalized, "60/40", &[("^GSPC", 0.6), ("BND", 0.4)]).unwrap();
        assert!(blended.has_ticker("60/40"));
        assert_abs_diff_eq!(blended.rows()[0].prices["60/40"], 100.0, epsilon = 1e-9);
        // 0.6 * 102 + 0.4 * 99
        assert_abs_diff_eq!(blended.rows()[1].prices["60/40"], 100.8, epsilon = 1e-9);

        let missing = with_blend(&normalized, "mix", &[("VTI", 1.0)]);
        assert!(matches!(missing, Err(Error::InvalidInput(_))));
        let duplicate = with_blend(&blended, "60/40", &[("BND", 1.0)]);
        assert!(matches!(duplicate, Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_normalize_rejects_non_positive_start() {
        let prices = table(&[(4, &[("X", 0.0)]), (5, &[("X", 1.0)])]);
        assert!(matches!(normalize_to_base(&prices, 100.0), Err(Error::InvalidInput(_))));
        assert!(normalize_to_base(&PriceTable::default(), 100.0).unwrap().is_empty());
    }
}
