//! Terminal rendering of derived views. Formatting only; every number shown
//! here was computed by kas-core.

use chrono::NaiveDate;
use kas_core::{CategoryShare, Dashboard, DayBucket, Transaction, TransactionType};

const BAR_WIDTH: usize = 30;

/// Indonesian grouping: `1234567.5` -> `1.234.567,5`.
pub fn format_number(value: f64) -> String {
    let cents = (value.abs() * 100.0).round() as u128;
    let whole = cents / 100;
    let frac = cents % 100;

    let digits = whole.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }

    if frac != 0 {
        let frac = format!("{frac:02}");
        grouped.push(',');
        grouped.push_str(frac.trim_end_matches('0'));
    }

    if value < 0.0 && cents != 0 {
        format!("-{grouped}")
    } else {
        grouped
    }
}

pub fn format_money(symbol: &str, value: f64) -> String {
    format!("{symbol} {}", format_number(value))
}

/// "01 May 2024"
pub fn format_date(date: NaiveDate) -> String {
    date.format("%d %b %Y").to_string()
}

/// Trend axis label; shorter as the window grows.
pub fn bucket_label(date: NaiveDate, window_days: usize) -> String {
    if window_days <= 7 {
        format_date(date)
    } else if window_days <= 30 {
        date.format("%d %b").to_string()
    } else {
        date.format("%b %d").to_string()
    }
}

fn bar(value: f64, max: f64) -> String {
    if max <= 0.0 || value <= 0.0 {
        return String::new();
    }
    let len = ((value / max) * BAR_WIDTH as f64).ceil() as usize;
    "#".repeat(len.clamp(1, BAR_WIDTH))
}

pub fn render_dashboard(dash: &Dashboard, symbol: &str) -> String {
    let mut s = String::new();
    s.push_str(&format!("# Dashboard {:04}-{:02}\n\n", dash.year, dash.month));
    s.push_str(&format!(
        "Income (this month):   {}\n",
        format_money(symbol, dash.totals.total_income)
    ));
    s.push_str(&format!(
        "Expense (this month):  {}\n",
        format_money(symbol, dash.totals.total_expense)
    ));
    s.push_str(&format!(
        "Balance (all time):    {}\n",
        format_money(symbol, dash.balance)
    ));
    s.push_str(&format!("Transactions:          {}\n\n", dash.transaction_count));

    s.push_str("## Recent\n\n");
    s.push_str(&render_transactions(&dash.recent, symbol));
    s
}

pub fn render_transactions(rows: &[Transaction], symbol: &str) -> String {
    if rows.is_empty() {
        return "No transactions yet\n".to_string();
    }

    let mut s = String::new();
    s.push_str(&format!(
        "{:<15} {:<12} {:<14} {:>18}  {}\n",
        "ID", "DATE", "CATEGORY", "AMOUNT", "DESCRIPTION"
    ));
    for t in rows {
        let sign = if t.is_expense() { '-' } else { '+' };
        s.push_str(&format!(
            "{:<15} {:<12} {:<14} {:>18}  {}\n",
            t.id,
            format_date(t.date),
            t.category,
            format!("{sign} {}", format_money(symbol, t.amount)),
            t.description
        ));
    }
    s
}

pub fn render_trend(series: &[DayBucket], symbol: &str, has_data: bool) -> String {
    if !has_data {
        return "No data for the selected range\n".to_string();
    }

    let window = series.len();
    let max = series
        .iter()
        .flat_map(|b| [b.income_sum, b.expense_sum])
        .fold(0.0_f64, f64::max);

    let mut s = String::new();
    for b in series {
        s.push_str(&format!(
            "{:<12} in  {:>16} {}\n",
            bucket_label(b.date, window),
            format_money(symbol, b.income_sum),
            bar(b.income_sum, max)
        ));
        s.push_str(&format!(
            "{:<12} out {:>16} {}\n",
            "",
            format_money(symbol, b.expense_sum),
            bar(b.expense_sum, max)
        ));
    }
    s
}

pub fn render_categories(kind: TransactionType, shares: &[CategoryShare], symbol: &str) -> String {
    if shares.is_empty() {
        return format!("No {kind} data yet\n");
    }

    let mut s = String::new();
    for share in shares {
        s.push_str(&format!(
            "{:<14} {:>18} ({:.1}%)\n",
            share.category,
            format_money(symbol, share.amount),
            share.percent
        ));
    }
    s
}
