//! Calendar bucketing of trading dates.
//!
//! Trading dates are grouped into calendar periods (month, quarter or year)
//! and the last trading date of each period marks a rebalance.

use crate::types::RebalancePeriod;
use chrono::{Datelike, NaiveDate};
use std::collections::BTreeSet;

/// A calendar period, identified by its year and final month.
///
/// Monthly periods end in their own month, quarters end in March, June,
/// September or December, and years end in December.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PeriodKey {
    pub year: i32,
    pub last_month: u32,
}

impl PeriodKey {
    /// Calendar period containing `date`, or `None` for `RebalancePeriod::Never`.
    pub fn of(date: NaiveDate, period: RebalancePeriod) -> Option<Self> {
        let last_month = match period {
            RebalancePeriod::Never => return None,
            RebalancePeriod::Monthly => date.month(),
            RebalancePeriod::Quarterly => (date.month() - 1) / 3 * 3 + 3,
            RebalancePeriod::Annually => 12,
        };

        Some(Self {
            year: date.year(),
            last_month,
        })
    }

    /// Last calendar day of the period.
    pub fn end_date(&self) -> Option<NaiveDate> {
        let next_start = if self.last_month == 12 {
            NaiveDate::from_ymd_opt(self.year + 1, 1, 1)
        } else {
            NaiveDate::from_ymd_opt(self.year, self.last_month + 1, 1)
        };
        next_start.and_then(|d| d.pred_opt())
    }
}

/// Last calendar day of the period containing `date`.
pub fn period_end(date: NaiveDate, period: RebalancePeriod) -> Option<NaiveDate> {
    PeriodKey::of(date, period).and_then(|key| key.end_date())
}

/// Indices of the last trading date in each calendar period.
///
/// `dates` must be sorted. Returns an empty vector for `RebalancePeriod::Never`.
pub(crate) fn period_last_indices(dates: &[NaiveDate], period: RebalancePeriod) -> Vec<usize> {
    if period == RebalancePeriod::Never {
        return vec![];
    }

    let keys: Vec<Option<PeriodKey>> = dates.iter().map(|d| PeriodKey::of(*d, period)).collect();

    (0..keys.len())
        .filter(|&i| i + 1 == keys.len() || keys[i + 1] != keys[i])
        .collect()
}

/// Dates on which the portfolio is rebalanced.
///
/// For every calendar period touched by `dates`, the last trading date inside
/// that period. The final period counts even if the data ends before the
/// calendar period does.
pub fn rebalance_dates(dates: &[NaiveDate], period: RebalancePeriod) -> BTreeSet<NaiveDate> {
    period_last_indices(dates, period)
        .into_iter()
        .map(|i| dates[i])
        .collect()
}
