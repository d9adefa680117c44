//! Statement service - monthly account statements and CSV export

use std::io::Write;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::result::{Error, Result};
use crate::domain::Transaction;
use crate::ports::Store;
use crate::services::views::{self, Totals};

/// One calendar month of an account's activity
#[derive(Debug, Clone, Serialize)]
pub struct Statement {
    pub account_number: String,
    pub year: i32,
    pub month: u32,
    /// Balance before the first line of the month
    pub opening_balance: i64,
    pub closing_balance: i64,
    pub totals: Totals,
    pub lines: Vec<Transaction>,
}

/// Row written to the CSV export
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StatementRow<'a> {
    date: DateTime<Utc>,
    reference: &'a str,
    #[serde(rename = "type")]
    kind: &'a str,
    description: &'a str,
    amount: i64,
    balance_after: i64,
}

pub struct StatementService {
    store: Arc<dyn Store>,
}

impl StatementService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub fn statement(&self, account_number: &str, year: i32, month: u32) -> Result<Statement> {
        let (accounts, transactions) = {
            let _lock = self.store.lock()?;
            (self.store.get_accounts()?, self.store.get_transactions()?)
        };
        if !accounts.iter().any(|a| a.account_number == account_number) {
            return Err(Error::AccountNotFound(account_number.to_string()));
        }

        let lines = views::monthly_statement(&transactions, account_number, year, month)?;
        let (start, end) = views::month_bounds(year, month)?;

        // Log order is creation order; the last entry before a bound holds
        // the balance at that bound.
        let balance_before = |bound: DateTime<Utc>| {
            transactions
                .iter()
                .filter(|tx| tx.account_number == account_number && tx.date < bound)
                .last()
                .map_or(0, |tx| tx.balance_after)
        };

        Ok(Statement {
            account_number: account_number.to_string(),
            year,
            month,
            opening_balance: balance_before(start),
            closing_balance: balance_before(end),
            totals: views::summarize(&lines),
            lines,
        })
    }

    /// Write the statement lines as CSV with signed amounts
    pub fn write_csv<W: Write>(&self, statement: &Statement, writer: W) -> Result<()> {
        let mut csv = csv::Writer::from_writer(writer);
        for tx in &statement.lines {
            csv.serialize(StatementRow {
                date: tx.date,
                reference: &tx.reference,
                kind: tx.kind.as_str(),
                description: &tx.description,
                amount: tx.signed_amount(),
                balance_after: tx.balance_after,
            })?;
        }
        csv.flush()?;
        Ok(())
    }
}
