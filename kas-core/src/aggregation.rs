//! Derived views over a transaction snapshot.
//!
//! Every function here is pure and total: it reads the slice it is given,
//! never mutates it, and returns zeros or empty collections for an empty
//! snapshot instead of failing.

use chrono::{Datelike, Days, NaiveDate};
use serde::Serialize;
use std::collections::HashMap;

use crate::transaction::{Transaction, TransactionType};

/// Longest trend window, roughly ten years of daily buckets.
pub const MAX_WINDOW_DAYS: usize = 3660;

/// Income and expense sums for one calendar month.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct MonthlyTotals {
    pub total_income: f64,
    pub total_expense: f64,
}

impl MonthlyTotals {
    /// Income minus expense within the month. Not the same as
    /// [`overall_balance`], which covers every transaction ever recorded.
    pub fn net(&self) -> f64 {
        self.total_income - self.total_expense
    }
}

/// One day slot of the trend series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DayBucket {
    /// Raw date; label formatting is left to the caller.
    pub date: NaiveDate,
    pub income_sum: f64,
    pub expense_sum: f64,
}

/// Sum income and expense for transactions dated in the same month and year
/// as `reference_date`.
pub fn monthly_totals(snapshot: &[Transaction], reference_date: NaiveDate) -> MonthlyTotals {
    let (year, month) = (reference_date.year(), reference_date.month());

    snapshot
        .iter()
        .filter(|t| t.date.year() == year && t.date.month() == month)
        .fold(MonthlyTotals::default(), |mut acc, t| {
            match t.kind {
                TransactionType::Income => acc.total_income += t.amount,
                TransactionType::Expense => acc.total_expense += t.amount,
            }
            acc
        })
}

/// Lifetime balance: `+amount` for income and `-amount` for expense over the
/// whole snapshot, regardless of date.
pub fn overall_balance(snapshot: &[Transaction]) -> f64 {
    snapshot.iter().map(Transaction::signed_amount).sum()
}

/// Daily income/expense sums for the `window_days` days ending on
/// `reference_date` (inclusive), oldest first.
///
/// Days without transactions report zero. A window of zero days yields an
/// empty series; windows longer than [`MAX_WINDOW_DAYS`] are shortened to it.
pub fn time_series(
    snapshot: &[Transaction],
    window_days: usize,
    reference_date: NaiveDate,
) -> Vec<DayBucket> {
    if window_days == 0 {
        return Vec::new();
    }
    let window_days = window_days.min(MAX_WINDOW_DAYS);

    let back = Days::new(window_days as u64 - 1);
    let start = reference_date
        .checked_sub_days(back)
        .unwrap_or(NaiveDate::MIN);

    let mut sums: HashMap<NaiveDate, (f64, f64)> = HashMap::new();
    for t in snapshot
        .iter()
        .filter(|t| t.date >= start && t.date <= reference_date)
    {
        let entry = sums.entry(t.date).or_insert((0.0, 0.0));
        match t.kind {
            TransactionType::Income => entry.0 += t.amount,
            TransactionType::Expense => entry.1 += t.amount,
        }
    }

    start
        .iter_days()
        .take_while(|d| *d <= reference_date)
        .take(window_days)
        .map(|date| {
            let (income_sum, expense_sum) = sums.get(&date).copied().unwrap_or((0.0, 0.0));
            DayBucket {
                date,
                income_sum,
                expense_sum,
            }
        })
        .collect()
}

/// Sum amounts per category for one transaction type.
///
/// Categories with no matching transaction are absent from the map, not
/// reported as zero. The map has no ordering.
pub fn category_breakdown(snapshot: &[Transaction], kind: TransactionType) -> HashMap<String, f64> {
    let mut totals: HashMap<String, f64> = HashMap::new();

    for t in snapshot.iter().filter(|t| t.kind == kind) {
        *totals.entry(t.category.clone()).or_insert(0.0) += t.amount;
    }

    totals
}

/// Anything that can be scanned for chartable values.
pub trait SeriesValues {
    fn series_values(&self) -> impl Iterator<Item = f64> + '_;
}

impl SeriesValues for [DayBucket] {
    fn series_values(&self) -> impl Iterator<Item = f64> + '_ {
        self.iter().flat_map(|b| [b.income_sum, b.expense_sum])
    }
}

impl SeriesValues for Vec<DayBucket> {
    fn series_values(&self) -> impl Iterator<Item = f64> + '_ {
        self.as_slice().series_values()
    }
}

impl<K> SeriesValues for HashMap<K, f64> {
    fn series_values(&self) -> impl Iterator<Item = f64> + '_ {
        self.values().copied()
    }
}

/// True iff at least one value is strictly greater than zero. Callers use
/// this to pick between drawing a chart and showing an empty state.
pub fn has_any_data<S: SeriesValues + ?Sized>(series: &S) -> bool {
    series.series_values().any(|v| v > 0.0)
}
