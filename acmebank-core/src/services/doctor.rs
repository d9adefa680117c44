//! Doctor service - ledger health checks

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use serde::Serialize;
use serde_json::json;

use crate::domain::result::Result;
use crate::domain::{Account, Transaction, User};
use crate::ports::Store;
use crate::services::views;

/// Doctor service for health checks
pub struct DoctorService {
    store: Arc<dyn Store>,
}

impl DoctorService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Run all health checks
    ///
    /// The collections are read under the store lock so a concurrent ledger
    /// write is never seen half committed.
    pub fn run_checks(&self) -> Result<DoctorResult> {
        let (users, accounts, transactions) = {
            let _lock = self.store.lock()?;
            (
                self.store.get_users()?,
                self.store.get_accounts()?,
                self.store.get_transactions()?,
            )
        };

        let mut checks = HashMap::new();
        checks.insert("balance_replay".to_string(), check_replay(&accounts, &transactions));
        checks.insert(
            "transaction_index".to_string(),
            check_transaction_index(&accounts, &transactions),
        );
        checks.insert(
            "orphaned_transactions".to_string(),
            check_orphaned_transactions(&accounts, &transactions),
        );
        checks.insert(
            "duplicate_transaction_ids".to_string(),
            duplicates_check(transactions.iter().map(|tx| tx.id.as_str()), "transaction id"),
        );
        checks.insert(
            "duplicate_references".to_string(),
            duplicates_check(transactions.iter().map(|tx| tx.reference.as_str()), "reference"),
        );
        checks.insert("account_owners".to_string(), check_account_owners(&users, &accounts));

        // Calculate summary
        let passed = checks.values().filter(|c| c.status == "pass").count() as i64;
        let warnings = checks.values().filter(|c| c.status == "warning").count() as i64;
        let errors = checks.values().filter(|c| c.status == "error").count() as i64;

        Ok(DoctorResult {
            checks,
            summary: DoctorSummary { passed, warnings, errors },
        })
    }
}

/// Every account's log must replay to its stored balance
fn check_replay(accounts: &[Account], transactions: &[Transaction]) -> CheckResult {
    let details: Vec<serde_json::Value> = accounts
        .iter()
        .filter_map(|account| {
            let replay = views::replay(transactions, &account.account_number);
            if replay.is_consistent_with(account.balance) {
                return None;
            }
            Some(json!({
                "account_number": account.account_number,
                "stored_balance": account.balance,
                "replayed_balance": replay.balance,
                "mismatched_transactions": replay
                    .mismatches
                    .iter()
                    .map(|m| m.transaction_id.clone())
                    .collect::<Vec<_>>(),
            }))
        })
        .collect();

    CheckResult::from_findings(
        details,
        "error",
        "All account balances match their transaction history".to_string(),
        |n| format!("{} account(s) do not replay to their stored balance", n),
    )
}

/// An account's id list must name exactly its log entries, in log order
fn check_transaction_index(accounts: &[Account], transactions: &[Transaction]) -> CheckResult {
    let details: Vec<serde_json::Value> = accounts
        .iter()
        .filter_map(|account| {
            let logged: Vec<&str> = transactions
                .iter()
                .filter(|tx| tx.account_number == account.account_number)
                .map(|tx| tx.id.as_str())
                .collect();
            let listed: Vec<&str> = account.transactions.iter().map(String::as_str).collect();
            if logged == listed {
                return None;
            }
            Some(json!({
                "account_number": account.account_number,
                "listed": listed.len(),
                "logged": logged.len(),
            }))
        })
        .collect();

    CheckResult::from_findings(
        details,
        "warning",
        "Account transaction lists match the log".to_string(),
        |n| format!("{} account(s) list transactions that differ from the log", n),
    )
}

fn check_orphaned_transactions(accounts: &[Account], transactions: &[Transaction]) -> CheckResult {
    let known: HashSet<&str> = accounts.iter().map(|a| a.account_number.as_str()).collect();
    let details: Vec<serde_json::Value> = transactions
        .iter()
        .filter(|tx| !known.contains(tx.account_number.as_str()))
        .map(|tx| {
            json!({
                "transaction_id": tx.id,
                "account_number": tx.account_number
            })
        })
        .collect();

    CheckResult::from_findings(
        details,
        "error",
        "No orphaned transactions found".to_string(),
        |n| format!("{} transaction(s) reference missing accounts", n),
    )
}

fn duplicates_check<'a>(values: impl Iterator<Item = &'a str>, what: &str) -> CheckResult {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for value in values {
        *counts.entry(value).or_default() += 1;
    }
    let mut duplicated: Vec<(&str, usize)> = counts.into_iter().filter(|(_, c)| *c > 1).collect();
    duplicated.sort();
    let details = duplicated
        .into_iter()
        .map(|(value, count)| json!({ "value": value, "count": count }))
        .collect();

    CheckResult::from_findings(
        details,
        "error",
        format!("No duplicate {}s found", what),
        |n| format!("{} {}(s) used more than once", n, what),
    )
}

fn check_account_owners(users: &[User], accounts: &[Account]) -> CheckResult {
    let owners: HashSet<&str> = users.iter().map(|u| u.id_number.as_str()).collect();
    let details = accounts
        .iter()
        .filter(|a| !owners.contains(a.user_id.as_str()))
        .map(|a| {
            json!({
                "account_number": a.account_number,
                "user_id": a.user_id
            })
        })
        .collect();

    CheckResult::from_findings(
        details,
        "warning",
        "Every account has an owner".to_string(),
        |n| format!("{} account(s) reference missing users", n),
    )
}

#[derive(Debug, Serialize)]
pub struct DoctorResult {
    pub checks: HashMap<String, CheckResult>,
    pub summary: DoctorSummary,
}

impl DoctorResult {
    pub fn is_healthy(&self) -> bool {
        self.summary.errors == 0
    }
}

#[derive(Debug, Serialize)]
pub struct CheckResult {
    pub status: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<serde_json::Value>>,
}

impl CheckResult {
    fn from_findings(
        details: Vec<serde_json::Value>,
        failing_status: &str,
        pass_message: String,
        fail_message: impl FnOnce(usize) -> String,
    ) -> Self {
        if details.is_empty() {
            Self {
                status: "pass".to_string(),
                message: pass_message,
                details: None,
            }
        } else {
            Self {
                status: failing_status.to_string(),
                message: fail_message(details.len()),
                details: Some(details),
            }
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DoctorSummary {
    pub passed: i64,
    pub warnings: i64,
    pub errors: i64,
}
