//! Dashboard view model: summary cards, recent list, range presets and
//! category shares, all derived from a snapshot.

use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::aggregation::{MAX_WINDOW_DAYS, MonthlyTotals, monthly_totals, overall_balance};
use crate::transaction::Transaction;

/// How many transactions the recent list shows by default.
pub const DEFAULT_RECENT_LIMIT: usize = 10;

/// Everything the summary cards and the recent table need.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    pub year: i32,
    pub month: u32,
    /// Month-scoped income/expense cards
    pub totals: MonthlyTotals,
    /// Lifetime balance card
    pub balance: f64,
    pub transaction_count: usize,
    /// Newest first, by insertion order
    pub recent: Vec<Transaction>,
}

impl Dashboard {
    pub fn build(snapshot: &[Transaction], today: NaiveDate, recent_limit: usize) -> Self {
        Self {
            year: today.year(),
            month: today.month(),
            totals: monthly_totals(snapshot, today),
            balance: overall_balance(snapshot),
            transaction_count: snapshot.len(),
            recent: snapshot.iter().take(recent_limit).cloned().collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.transaction_count == 0
    }
}

/// Trend chart range presets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum TimeRange {
    #[default]
    Week,
    Month,
    Quarter,
    /// Any other positive number of days
    Days(usize),
}

impl TimeRange {
    pub fn days(&self) -> usize {
        match self {
            TimeRange::Week => 7,
            TimeRange::Month => 30,
            TimeRange::Quarter => 90,
            TimeRange::Days(n) => *n,
        }
    }

    pub fn from_days(days: usize) -> Self {
        match days {
            7 => TimeRange::Week,
            30 => TimeRange::Month,
            90 => TimeRange::Quarter,
            n => TimeRange::Days(n),
        }
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "last {} days", self.days())
    }
}

impl FromStr for TimeRange {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "week" => Ok(TimeRange::Week),
            "month" => Ok(TimeRange::Month),
            "quarter" => Ok(TimeRange::Quarter),
            other => match other.parse::<usize>() {
                Ok(0) => Err("range must be at least one day".to_string()),
                Ok(n) if n > MAX_WINDOW_DAYS => {
                    Err(format!("range is limited to {MAX_WINDOW_DAYS} days"))
                }
                Ok(n) => Ok(TimeRange::from_days(n)),
                Err(_) => Err(format!(
                    "invalid range '{other}' (use week, month, quarter or a number of days)"
                )),
            },
        }
    }
}

/// One slice of the category chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryShare {
    pub category: String,
    pub amount: f64,
    /// 0.0 - 100.0
    pub percent: f64,
}

/// Turn a breakdown into legend rows: largest first, ties broken by name so
/// the output is stable.
pub fn category_shares(breakdown: &HashMap<String, f64>) -> Vec<CategoryShare> {
    let total: f64 = breakdown.values().sum();

    let mut shares: Vec<CategoryShare> = breakdown
        .iter()
        .map(|(category, amount)| CategoryShare {
            category: category.clone(),
            amount: *amount,
            percent: if total > 0.0 { amount / total * 100.0 } else { 0.0 },
        })
        .collect();

    shares.sort_by(|a, b| {
        b.amount
            .total_cmp(&a.amount)
            .then_with(|| a.category.cmp(&b.category))
    });
    shares
}
