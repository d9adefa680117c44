//! Derived ledger views
//!
//! Pure functions over the transaction log. Nothing here touches storage;
//! the services load the log and hand it in. Orderings break date ties by
//! transaction id so results are deterministic.

use chrono::{DateTime, Datelike, NaiveDate, TimeZone, Utc};
use serde::Serialize;

use crate::domain::result::{Error, Result};
use crate::domain::Transaction;

/// An account's transactions in creation (log) order
pub fn account_transactions(transactions: &[Transaction], account_number: &str) -> Vec<Transaction> {
    transactions
        .iter()
        .filter(|tx| tx.account_number == account_number)
        .cloned()
        .collect()
}

/// The `limit` most recent transactions of an account, newest first
pub fn recent_transactions(
    transactions: &[Transaction],
    account_number: &str,
    limit: usize,
) -> Vec<Transaction> {
    let mut recent = account_transactions(transactions, account_number);
    recent.sort_by(|a, b| (b.date, &b.id).cmp(&(a.date, &a.id)));
    recent.truncate(limit);
    recent
}

/// Half-open UTC range `[first day of month, first day of next month)`
pub fn month_bounds(year: i32, month: u32) -> Result<(DateTime<Utc>, DateTime<Utc>)> {
    let start = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| Error::validation(format!("invalid statement month: {}-{}", year, month)))?;
    let (next_year, next_month) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };
    let end = NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .ok_or_else(|| Error::validation(format!("invalid statement month: {}-{}", year, month)))?;

    let to_utc = |d: NaiveDate| Utc.from_utc_datetime(&d.and_time(chrono::NaiveTime::MIN));
    Ok((to_utc(start), to_utc(end)))
}

/// An account's transactions within a calendar month, oldest first
pub fn monthly_statement(
    transactions: &[Transaction],
    account_number: &str,
    year: i32,
    month: u32,
) -> Result<Vec<Transaction>> {
    let (start, end) = month_bounds(year, month)?;
    let mut lines: Vec<Transaction> = transactions
        .iter()
        .filter(|tx| tx.account_number == account_number && tx.date >= start && tx.date < end)
        .cloned()
        .collect();
    lines.sort_by(|a, b| (a.date, &a.id).cmp(&(b.date, &b.id)));
    Ok(lines)
}

/// A transaction whose recorded `balance_after` disagrees with the replay
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReplayMismatch {
    pub transaction_id: String,
    pub expected: i64,
    pub recorded: i64,
}

/// Outcome of replaying an account from balance zero
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Replay {
    pub balance: i64,
    pub transaction_count: usize,
    pub mismatches: Vec<ReplayMismatch>,
}

impl Replay {
    pub fn is_consistent_with(&self, stored_balance: i64) -> bool {
        self.mismatches.is_empty() && self.balance == stored_balance
    }
}

/// Replay an account's transactions in log order starting from zero
pub fn replay(transactions: &[Transaction], account_number: &str) -> Replay {
    let mut balance = 0i64;
    let mut transaction_count = 0;
    let mut mismatches = Vec::new();

    for tx in transactions.iter().filter(|tx| tx.account_number == account_number) {
        balance = balance.saturating_add(tx.signed_amount());
        transaction_count += 1;
        if tx.balance_after != balance {
            mismatches.push(ReplayMismatch {
                transaction_id: tx.id.clone(),
                expected: balance,
                recorded: tx.balance_after,
            });
        }
    }

    Replay {
        balance,
        transaction_count,
        mismatches,
    }
}

/// Credit and debit totals over a set of transactions
///
/// Sums saturate at the `i64` bounds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Totals {
    pub credits: i64,
    pub debits: i64,
    pub count: usize,
}

impl Totals {
    pub fn net(&self) -> i64 {
        self.credits.saturating_sub(self.debits)
    }
}

pub fn summarize(transactions: &[Transaction]) -> Totals {
    transactions.iter().fold(Totals::default(), |mut totals, tx| {
        if tx.kind.is_debit() {
            totals.debits = totals.debits.saturating_add(tx.amount);
        } else {
            totals.credits = totals.credits.saturating_add(tx.amount);
        }
        totals.count += 1;
        totals
    })
}

/// Year and month of a timestamp, for picking the current statement
pub fn year_month(at: DateTime<Utc>) -> (i32, u32) {
    (at.year(), at.month())
}
