//! Portfolio construction and simulation.
//!
//! Provides whole-share allocation, rebalance scheduling, and the
//! day-by-day portfolio simulation.

mod allocation;
mod calendar;
mod simulator;

pub use allocation::allocate;
pub use calendar::{period_end, rebalance_dates, PeriodKey};
pub use simulator::{
    allocation_drift, average_deviation, simulate, weight_sum_warning, AllocationDrift,
};
