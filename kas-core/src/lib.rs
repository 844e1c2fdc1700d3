//! kas-core: transaction model, category vocabulary and the aggregation
//! engine behind the Kas Virtual dashboard. No I/O lives here.

pub mod aggregation;
pub mod category;
pub mod dashboard;
pub mod error;
pub mod time;
pub mod transaction;

pub use aggregation::{
    DayBucket, MAX_WINDOW_DAYS, MonthlyTotals, SeriesValues, category_breakdown, has_any_data, monthly_totals,
    overall_balance, time_series,
};
pub use category::{EXPENSE_CATEGORIES, INCOME_CATEGORIES, categories_for};
pub use dashboard::{CategoryShare, DEFAULT_RECENT_LIMIT, Dashboard, TimeRange, category_shares};
pub use error::ValidationError;
pub use transaction::{NewTransaction, Transaction, TransactionType, validate_amount};
