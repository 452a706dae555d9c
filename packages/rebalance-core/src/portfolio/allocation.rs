//! Whole-share allocation of cash across target weights.

use crate::types::{Holdings, TargetWeights};
use crate::{Error, Result};
use std::collections::BTreeMap;

/// Convert cash into whole shares at the given prices.
///
/// Each ticker receives `cash * weight`, rounded down to a whole number of
/// shares. Whatever cannot buy a whole share is kept as cash.
///
/// # Arguments
///
/// * `cash` - Amount to invest (non-negative)
/// * `prices` - Ticker to current price; must cover every weighted ticker
/// * `weights` - Ticker to target fraction
///
/// # Errors
///
/// Returns `Error::InvalidInput` if a weighted ticker has no price, a price is
/// not positive, or cash or a weight is negative or not finite.
pub fn allocate(
    cash: f64,
    prices: &BTreeMap<String, f64>,
    weights: &TargetWeights,
) -> Result<Holdings> {
    if !cash.is_finite() || cash < 0.0 {
        return Err(Error::InvalidInput(format!(
            "Cash to allocate must be a non-negative number, got {}",
            cash
        )));
    }

    let mut shares = BTreeMap::new();
    let mut invested = 0.0;

    for (ticker, &weight) in weights {
        if !weight.is_finite() || weight < 0.0 {
            return Err(Error::InvalidInput(format!(
                "Weight for {} must be a non-negative number, got {}",
                ticker, weight
            )));
        }

        let price = prices
            .get(ticker)
            .copied()
            .ok_or_else(|| Error::InvalidInput(format!("No price for {}", ticker)))?;

        if !price.is_finite() || price <= 0.0 {
            return Err(Error::InvalidInput(format!(
                "Price for {} must be positive, got {}",
                ticker, price
            )));
        }

        let count = (cash * weight / price).floor() as u64;
        invested += count as f64 * price;
        shares.insert(ticker.clone(), count);
    }

    Ok(Holdings {
        shares,
        cash: cash - invested,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn map(entries: &[(&str, f64)]) -> BTreeMap<String, f64> {
        entries.iter().map(|(t, v)| (t.to_string(), *v)).collect()
    }

    #[test]
    fn test_allocate_even_split() {
        let prices = map(&[("A", 100.0), ("B", 100.0)]);
        let weights = map(&[("A", 0.5), ("B", 0.5)]);

        let holdings = allocate(10_000.0, &prices, &weights).unwrap();

        assert_eq!(holdings.shares["A"], 50);
        assert_eq!(holdings.shares["B"], 50);
        assert_eq!(holdings.cash, 0.0);
    }

    #[test]
    fn test_allocate_rounds_down_and_keeps_leftover() {
        let prices = map(&[("VTI", 233.0), ("BND", 72.5)]);
        let weights = map(&[("VTI", 0.6), ("BND", 0.4)]);

        let holdings = allocate(10_000.0, &prices, &weights).unwrap();

        // 6000 / 233 = 25.75 -> 25, 4000 / 72.5 = 55.17 -> 55
        assert_eq!(holdings.shares["VTI"], 25);
        assert_eq!(holdings.shares["BND"], 55);
        // 10000 - (25 * 233 + 55 * 72.5) = 10000 - 9812.5
        assert_abs_diff_eq!(holdings.cash, 187.5, epsilon = 1e-9);
        assert!(holdings.cash >= 0.0);
    }

    #[test]
    fn test_allocate_price_above_allocation() {
        let prices = map(&[("BRK", 600_000.0)]);
        let weights = map(&[("BRK", 1.0)]);

        let holdings = allocate(1_000.0, &prices, &weights).unwrap();

        assert_eq!(holdings.shares["BRK"], 0);
        assert_eq!(holdings.cash, 1_000.0);
    }

    #[test]
    fn test_allocate_weights_need_not_sum_to_one() {
        let prices = map(&[("A", 10.0), ("B", 10.0)]);
        let weights = map(&[("A", 0.3), ("B", 0.3)]);

        let holdings = allocate(1_000.0, &prices, &weights).unwrap();

        assert_eq!(holdings.shares["A"], 30);
        assert_eq!(holdings.shares["B"], 30);
        assert_abs_diff_eq!(holdings.cash, 400.0, epsilon = 1e-9);
    }

    #[test]
    fn test_allocate_missing_price() {
        let prices = map(&[("A", 10.0)]);
        let weights = map(&[("A", 0.5), ("B", 0.5)]);

        let result = allocate(1_000.0, &prices, &weights);
        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_allocate_non_positive_price() {
        let weights = map(&[("A", 1.0)]);

        let zero = allocate(1_000.0, &map(&[("A", 0.0)]), &weights);
        assert!(matches!(zero, Err(Error::InvalidInput(_))));

        let negative = allocate(1_000.0, &map(&[("A", -5.0)]), &weights);
        assert!(matches!(negative, Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_allocate_invalid_cash_or_weight() {
        let prices = map(&[("A", 10.0)]);

        let result = allocate(-1.0, &prices, &map(&[("A", 1.0)]));
        assert!(matches!(result, Err(Error::InvalidInput(_))));

        let result = allocate(100.0, &prices, &map(&[("A", -0.5)]));
        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }
}
