//! Return series, risk metrics and benchmark comparison.
//!
//! Everything here is a pure function of its inputs. Numerically degenerate
//! inputs (too few points, zero variance) resolve to documented fallback
//! values instead of errors so results can always be displayed.

mod benchmark;
mod metrics;
mod returns;
pub mod stats;

pub use benchmark::{align_returns, compare, normalize_to_base, price_returns, with_blend};
pub use metrics::{
    annualized_return, annualized_volatility, max_drawdown, metrics, sharpe_ratio,
    sortino_ratio, total_return, value_at_risk, TRADING_DAYS, VAR_FALLBACK,
};
pub use returns::{monthly_table, pct_change, returns, MonthlyReturnsTable, YearReturns};
