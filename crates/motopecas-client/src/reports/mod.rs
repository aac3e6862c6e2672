//! Pure reporting over a ledger snapshot: settlement fees, dashboard totals,
//! and month-over-month comparison.

pub mod aggregate;
pub mod cache;
pub mod dashboard;
pub mod date;
pub mod fees;
pub mod period;
pub mod policy;

pub use aggregate::{CategoryTotal, ExpenseComposition, Stats, aggregate, category_breakdown};
pub use cache::ReportCache;
pub use dashboard::Dashboard;
pub use fees::{FeeBreakdown, FeeSchedule, compute_net};
pub use period::{MonthComparison, MonthTotals, compare_months, growth_pct};
