//! Return series derived from simulated portfolio values.

use crate::portfolio::PeriodKey;
use crate::types::{PerformanceRow, PeriodReturn, RebalancePeriod, ReturnSeries};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Fractional change between consecutive values.
///
/// The output is one shorter than the input. A zero previous value yields a
/// 0 return instead of an infinite one.
pub fn pct_change(values: &[f64]) -> Vec<f64> {
    values
        .windows(2)
        .map(|w| if w[0] != 0.0 { w[1] / w[0] - 1.0 } else { 0.0 })
        .collect()
}

/// Daily, monthly and annual returns of the portfolio total.
///
/// Daily returns compare consecutive trading days. Monthly and annual returns
/// compare the last total of each calendar month or year with the previous
/// one, labeled with the calendar end of the period. The first observation
/// or period has no return, so any granularity with fewer than two points
/// is empty.
pub fn returns(performance: &[PerformanceRow]) -> ReturnSeries {
    let totals: Vec<f64> = performance.iter().map(|r| r.total).collect();

    let daily = performance
        .iter()
        .skip(1)
        .zip(pct_change(&totals))
        .map(|(row, value)| PeriodReturn {
            date: row.date,
            value,
        })
        .collect();

    ReturnSeries {
        daily,
        monthly: period_returns(performance, RebalancePeriod::Monthly),
        annual: period_returns(performance, RebalancePeriod::Annually),
    }
}

/// Last observed total of a calendar period.
struct PeriodClose {
    key: PeriodKey,
    date: NaiveDate,
    total: f64,
}

impl PeriodClose {
    /// Calendar end of the period, or the last trading date if it has none.
    fn label(&self) -> NaiveDate {
        self.key.end_date().unwrap_or(self.date)
    }
}

/// Returns between the closing totals of consecutive calendar periods.
fn period_returns(performance: &[PerformanceRow], period: RebalancePeriod) -> Vec<PeriodReturn> {
    let mut closes: Vec<PeriodClose> = Vec::new();

    for row in performance {
        let Some(key) = PeriodKey::of(row.date, period) else {
            continue;
        };
        match closes.last_mut() {
            Some(close) if close.key == key => {
                close.date = row.date;
                close.total = row.total;
            }
            _ => closes.push(PeriodClose {
                key,
                date: row.date,
                total: row.total,
            }),
        }
    }

    let totals: Vec<f64> = closes.iter().map(|c| c.total).collect();

    closes
        .iter()
        .skip(1)
        .zip(pct_change(&totals))
        .map(|(close, value)| PeriodReturn {
            date: close.label(),
            value,
        })
        .collect()
}

/// Monthly returns of one calendar year, in percent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct YearReturns {
    pub year: i32,
    /// January through December; `None` where no return exists
    pub months: [Option<f64>; 12],
}

/// Monthly returns pivoted into a year by month grid.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct MonthlyReturnsTable {
    /// One entry per year, oldest first
    pub years: Vec<YearReturns>,
}

impl MonthlyReturnsTable {
    /// Return for a given year and month (1-12), in percent.
    pub fn get(&self, year: i32, month: u32) -> Option<f64> {
        let idx = month.checked_sub(1).filter(|m| *m < 12)? as usize;
        self.years
            .iter()
            .find(|y| y.year == year)
            .and_then(|y| y.months[idx])
    }
}

/// Pivot monthly returns into a year by month table of percentages.
pub fn monthly_table(monthly: &[PeriodReturn]) -> MonthlyReturnsTable {
    let mut grid: BTreeMap<i32, [Option<f64>; 12]> = BTreeMap::new();

    for r in monthly {
        let months = grid.entry(r.date.year()).or_insert([None; 12]);
        months[r.date.month0() as usize] = Some(r.value * 100.0);
    }

    MonthlyReturnsTable {
        years: grid
            .into_iter()
            .map(|(year, months)| YearReturns { year, months })
            .collect(),
    }
}
