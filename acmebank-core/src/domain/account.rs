//! Account domain model

use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Number;

use super::result::{Error, Result};
use super::transaction::{whole_units, TransactionType};

/// Lowest and highest generated account numbers (9 digits)
pub const ACCOUNT_NUMBER_MIN: u32 = 100_000_000;
pub const ACCOUNT_NUMBER_MAX: u32 = 999_999_999;

/// Account type shown when none is stored
pub const DEFAULT_ACCOUNT_TYPE: &str = "Savings";

fn account_number_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[0-9]{6,20}$").expect("valid account number regex"))
}

/// A balance-bearing account belonging to one user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "AccountRecord")]
pub struct Account {
    pub account_number: String,
    /// Id number of the owning user
    pub user_id: String,
    /// Current balance in minor currency units, never negative
    pub balance: i64,
    pub created_at: DateTime<Utc>,
    /// Ids of this account's transactions, in creation order
    pub transactions: Vec<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub account_type: Option<String>,
}

impl Account {
    /// Create a new empty account
    pub fn new(account_number: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            account_number: account_number.into(),
            user_id: user_id.into(),
            balance: 0,
            created_at: Utc::now(),
            transactions: Vec::new(),
            account_type: None,
        }
    }

    /// Display name of the account type
    pub fn type_label(&self) -> &str {
        self.account_type.as_deref().unwrap_or(DEFAULT_ACCOUNT_TYPE)
    }

    /// Balance this account would have after applying a transaction
    ///
    /// Pure check, the account is not modified.
    pub fn balance_after(&self, kind: TransactionType, amount: i64) -> Result<i64> {
        if amount <= 0 {
            return Err(Error::InvalidAmount(amount));
        }
        if kind.is_debit() {
            if self.balance < amount {
                return Err(Error::InsufficientFunds {
                    balance: self.balance,
                    requested: amount,
                });
            }
            Ok(self.balance - amount)
        } else {
            self.balance
                .checked_add(amount)
                .ok_or_else(|| Error::validation("deposit would overflow the account balance"))
        }
    }

    /// Check whether a string is a well-formed account number
    pub fn is_valid_number(account_number: &str) -> bool {
        account_number_re().is_match(account_number)
    }

    /// Validate account data
    pub fn validate(&self) -> Result<()> {
        if !Self::is_valid_number(&self.account_number) {
            return Err(Error::malformed(format!(
                "invalid account number: {:?}",
                self.account_number
            )));
        }
        if self.user_id.trim().is_empty() {
            return Err(Error::malformed(format!(
                "account {} has no owner",
                self.account_number
            )));
        }
        if self.balance < 0 {
            return Err(Error::malformed(format!(
                "account {} has a negative balance",
                self.account_number
            )));
        }
        Ok(())
    }
}

/// Raw persisted shape of an account, before validation
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountRecord {
    pub account_number: String,
    pub user_id: String,
    pub balance: Number,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub transactions: Vec<String>,
    #[serde(rename = "type", default)]
    pub account_type: Option<String>,
}

impl TryFrom<AccountRecord> for Account {
    type Error = Error;

    fn try_from(raw: AccountRecord) -> Result<Self> {
        let balance = whole_units(&raw.balance).ok_or_else(|| {
            Error::malformed(format!(
                "account {} balance is not a whole number",
                raw.account_number
            ))
        })?;
        let account = Self {
            account_number: raw.account_number,
            user_id: raw.user_id,
            balance,
            created_at: raw.created_at,
            transactions: raw.transactions,
            account_type: raw.account_type,
        };
        account.validate()?;
        Ok(account)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_balance_after_deposit() {
        let mut account = Account::new("100000001", "123456789");
        account.balance = 5_000_000;
        assert_eq!(
            account.balance_after(TransactionType::Deposit, 500_000).unwrap(),
            5_500_000
        );
        // Account itself is untouched
        assert_eq!(account.balance, 5_000_000);
    }

    #[test]
    fn test_balance_after_debit() {
        let mut account = Account::new("100000001", "123456789");
        account.balance = 1_000;

        assert_eq!(account.balance_after(TransactionType::Withdrawal, 1_000).unwrap(), 0);
        assert_eq!(account.balance_after(TransactionType::Payment, 400).unwrap(), 600);

        let err = account.balance_after(TransactionType::Payment, 1_001).unwrap_err();
        assert!(matches!(
            err,
            Error::InsufficientFunds { balance: 1_000, requested: 1_001 }
        ));
    }

    #[test]
    fn test_rejects_non_positive_amounts() {
        let account = Account::new("100000001", "123456789");
        assert!(matches!(
            account.balance_after(TransactionType::Deposit, 0),
            Err(Error::InvalidAmount(0))
        ));
        assert!(matches!(
            account.balance_after(TransactionType::Deposit, -5),
            Err(Error::InvalidAmount(-5))
        ));
    }

    #[test]
    fn test_deposit_overflow() {
        let mut account = Account::new("100000001", "123456789");
        account.balance = i64::MAX - 1;
        assert!(matches!(
            account.balance_after(TransactionType::Deposit, 2),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn test_account_validation() {
        let mut account = Account::new("100000001", "123456789");
        assert!(account.validate().is_ok());

        account.account_number = "12-34".to_string();
        assert!(account.validate().is_err());
    }

    #[test]
    fn test_loads_browser_record() {
        let json = r#"{
            "accountNumber": "100000001",
            "userId": "123456789",
            "balance": 5000000,
            "type": "ahorros",
            "status": "active",
            "transactions": [],
            "createdAt": "2024-05-01T10:00:00.000Z"
        }"#;
        let account: Account = serde_json::from_str(json).unwrap();
        assert_eq!(account.balance, 5_000_000);
        assert_eq!(account.type_label(), "ahorros");
    }

    #[test]
    fn test_rejects_negative_balance() {
        let json = r#"{
            "accountNumber": "100000001",
            "userId": "123456789",
            "balance": -1,
            "createdAt": "2024-05-01T10:00:00Z"
        }"#;
        let err = serde_json::from_str::<Account>(json).unwrap_err();
        assert!(err.to_string().contains("negative balance"));
    }
}
