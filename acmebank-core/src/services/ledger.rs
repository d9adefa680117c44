//! Ledger service - balance mutation and the append-only transaction log
//!
//! Every balance change goes through [`LedgerService::perform_transaction`].
//! The account update and the new log entry are validated up front and then
//! persisted together while the store's write lock is held, so the log
//! always replays to the stored balances.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::domain::result::{Error, Result};
use crate::domain::{
    generate_reference, generate_transaction_id, Account, Transaction, TransactionType,
};
use crate::ports::Store;
use crate::services::views::{self, Replay};

/// Description recorded for deposits made from the dashboard
pub const DEPOSIT_DESCRIPTION: &str = "Electronic channel deposit";
/// Description recorded for withdrawals made from the dashboard
pub const WITHDRAWAL_DESCRIPTION: &str = "Withdrawal";

/// Ledger service for balance changes and transaction history
pub struct LedgerService {
    store: Arc<dyn Store>,
}

impl LedgerService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Apply a balance change to an account and record it in the log
    ///
    /// Nothing is written unless every check passes: the account must
    /// exist, the amount must be positive and debits must be covered by
    /// the current balance.
    pub fn perform_transaction(
        &self,
        account_number: &str,
        amount: i64,
        kind: TransactionType,
        description: &str,
    ) -> Result<Transaction> {
        let _lock = self.store.lock()?;
        self.apply_locked(account_number, amount, kind, description)
    }

    /// Body of [`perform_transaction`](Self::perform_transaction) for
    /// callers already holding the store lock
    pub(crate) fn apply_locked(
        &self,
        account_number: &str,
        amount: i64,
        kind: TransactionType,
        description: &str,
    ) -> Result<Transaction> {
        let mut accounts = self.store.get_accounts()?;
        let index = accounts
            .iter()
            .position(|a| a.account_number == account_number)
            .ok_or_else(|| Error::AccountNotFound(account_number.to_string()))?;
        let balance_after = accounts[index].balance_after(kind, amount)?;

        let mut transactions = self.store.get_transactions()?;
        let date = next_date(&transactions, account_number, Utc::now());
        let (id, reference) = unique_identifiers(&transactions, date);

        let transaction = Transaction {
            id,
            account_number: account_number.to_string(),
            date,
            reference,
            kind,
            description: description.trim().to_string(),
            amount,
            balance_after,
        };

        let account = &mut accounts[index];
        account.balance = balance_after;
        account.transactions.push(transaction.id.clone());
        transactions.push(transaction.clone());

        self.store.save_ledger(&accounts, &transactions)?;
        Ok(transaction)
    }

    /// Same as [`perform_transaction`](Self::perform_transaction) with the
    /// type given as text (`deposit`, `withdrawal` or `payment`)
    pub fn perform_transaction_raw(
        &self,
        account_number: &str,
        amount: i64,
        kind: &str,
        description: &str,
    ) -> Result<Transaction> {
        let kind: TransactionType = kind.parse()?;
        self.perform_transaction(account_number, amount, kind, description)
    }

    pub fn deposit(&self, account_number: &str, amount: i64) -> Result<Transaction> {
        self.perform_transaction(
            account_number,
            amount,
            TransactionType::Deposit,
            DEPOSIT_DESCRIPTION,
        )
    }

    pub fn withdraw(&self, account_number: &str, amount: i64) -> Result<Transaction> {
        self.perform_transaction(
            account_number,
            amount,
            TransactionType::Withdrawal,
            WITHDRAWAL_DESCRIPTION,
        )
    }

    /// Pay a utility or other service from the account
    pub fn pay_service(&self, account_number: &str, amount: i64, service: &str) -> Result<Transaction> {
        let service = service.trim();
        if service.is_empty() {
            return Err(Error::validation("service name is required"));
        }
        self.perform_transaction(
            account_number,
            amount,
            TransactionType::Payment,
            &format!("Service payment: {}", service),
        )
    }

    // === Reads ===

    pub fn get_account(&self, account_number: &str) -> Result<Account> {
        self.store
            .get_accounts()?
            .into_iter()
            .find(|a| a.account_number == account_number)
            .ok_or_else(|| Error::AccountNotFound(account_number.to_string()))
    }

    /// An account together with its `limit` newest transactions
    ///
    /// Both are read under the store lock, so the balance always matches
    /// the returned log entries.
    pub fn account_overview(&self, account_number: &str, limit: usize) -> Result<(Account, Vec<Transaction>)> {
        let (accounts, transactions) = {
            let _lock = self.store.lock()?;
            (self.store.get_accounts()?, self.store.get_transactions()?)
        };
        let account = accounts
            .into_iter()
            .find(|a| a.account_number == account_number)
            .ok_or_else(|| Error::AccountNotFound(account_number.to_string()))?;
        let recent = views::recent_transactions(&transactions, account_number, limit);
        Ok((account, recent))
    }

    /// All of an account's transactions in creation order
    pub fn account_transactions(&self, account_number: &str) -> Result<Vec<Transaction>> {
        let transactions = self.store.get_transactions()?;
        Ok(views::account_transactions(&transactions, account_number))
    }

    pub fn recent_transactions(&self, account_number: &str, limit: usize) -> Result<Vec<Transaction>> {
        let transactions = self.store.get_transactions()?;
        Ok(views::recent_transactions(&transactions, account_number, limit))
    }

    pub fn monthly_statement(
        &self,
        account_number: &str,
        year: i32,
        month: u32,
    ) -> Result<Vec<Transaction>> {
        let transactions = self.store.get_transactions()?;
        views::monthly_statement(&transactions, account_number, year, month)
    }

    /// Recompute an account's balance from its log entries
    pub fn replay_balance(&self, account_number: &str) -> Result<Replay> {
        let transactions = self.store.get_transactions()?;
        Ok(views::replay(&transactions, account_number))
    }
}

/// Timestamp for a new entry, never earlier than the account's last entry
fn next_date(transactions: &[Transaction], account_number: &str, now: DateTime<Utc>) -> DateTime<Utc> {
    transactions
        .iter()
        .filter(|tx| tx.account_number == account_number)
        .map(|tx| tx.date)
        .max()
        .map_or(now, |last| last.max(now))
}

fn unique_identifiers(transactions: &[Transaction], at: DateTime<Utc>) -> (String, String) {
    let ids: HashSet<&str> = transactions.iter().map(|tx| tx.id.as_str()).collect();
    let references: HashSet<&str> = transactions.iter().map(|tx| tx.reference.as_str()).collect();

    let mut id = generate_transaction_id(at);
    while ids.contains(id.as_str()) {
        id = generate_transaction_id(at);
    }
    let mut reference = generate_reference();
    while references.contains(reference.as_str()) {
        reference = generate_reference();
    }
    (id, reference)
}
