//! Transaction domain model

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::Number;

use super::result::{Error, Result};

const BASE36_UPPER: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Kind of balance change a transaction records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Deposit,
    Withdrawal,
    Payment,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Deposit => "deposit",
            TransactionType::Withdrawal => "withdrawal",
            TransactionType::Payment => "payment",
        }
    }

    /// Withdrawals and payments take money out of the account
    pub fn is_debit(&self) -> bool {
        !matches!(self, TransactionType::Deposit)
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "deposit" => Ok(TransactionType::Deposit),
            "withdrawal" => Ok(TransactionType::Withdrawal),
            "payment" => Ok(TransactionType::Payment),
            other => Err(Error::InvalidTransactionType(other.to_string())),
        }
    }
}

/// An immutable ledger entry recording one balance change
///
/// Serialized with the camelCase field names of the persisted
/// `transactions` collection. Deserialization goes through
/// [`TransactionRecord`] so malformed entries are rejected at load time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "TransactionRecord")]
pub struct Transaction {
    pub id: String,
    pub account_number: String,
    pub date: DateTime<Utc>,
    pub reference: String,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub description: String,
    /// Always positive, in minor currency units
    pub amount: i64,
    pub balance_after: i64,
}

impl Transaction {
    /// Amount with the sign it has on the balance
    pub fn signed_amount(&self) -> i64 {
        if self.kind.is_debit() {
            -self.amount
        } else {
            self.amount
        }
    }
}

/// Raw persisted shape of a transaction, before validation
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRecord {
    pub id: String,
    pub account_number: String,
    pub date: DateTime<Utc>,
    pub reference: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub description: String,
    pub amount: Number,
    pub balance_after: Number,
}

impl TryFrom<TransactionRecord> for Transaction {
    type Error = Error;

    fn try_from(raw: TransactionRecord) -> Result<Self> {
        if raw.id.trim().is_empty() {
            return Err(Error::malformed("transaction id cannot be empty"));
        }
        if raw.account_number.trim().is_empty() {
            return Err(Error::malformed(format!(
                "transaction {} has no account number",
                raw.id
            )));
        }
        if raw.reference.trim().is_empty() {
            return Err(Error::malformed(format!(
                "transaction {} has no reference",
                raw.id
            )));
        }
        let kind = raw
            .kind
            .parse::<TransactionType>()
            .map_err(|e| Error::malformed(format!("transaction {}: {}", raw.id, e)))?;
        let amount = whole_units(&raw.amount)
            .ok_or_else(|| Error::malformed(format!("transaction {} amount is not a whole number", raw.id)))?;
        if amount <= 0 {
            return Err(Error::malformed(format!(
                "transaction {} amount must be positive",
                raw.id
            )));
        }
        let balance_after = whole_units(&raw.balance_after).ok_or_else(|| {
            Error::malformed(format!(
                "transaction {} balanceAfter is not a whole number",
                raw.id
            ))
        })?;
        if balance_after < 0 {
            return Err(Error::malformed(format!(
                "transaction {} balanceAfter is negative",
                raw.id
            )));
        }

        Ok(Self {
            id: raw.id,
            account_number: raw.account_number,
            date: raw.date,
            reference: raw.reference,
            kind,
            description: raw.description,
            amount,
            balance_after,
        })
    }
}

/// Convert a persisted number to whole minor units
///
/// Integers written by this crate are read exactly. Values written by the
/// browser app may come back as floats and must be integral and within the
/// range a JavaScript number represents exactly.
pub(crate) fn whole_units(value: &Number) -> Option<i64> {
    if let Some(units) = value.as_i64() {
        return Some(units);
    }
    if value.is_u64() {
        return None;
    }
    const LIMIT: f64 = 9_007_199_254_740_992.0; // 2^53
    let value = value.as_f64()?;
    if value.is_finite() && value.fract() == 0.0 && value.abs() <= LIMIT {
        Some(value as i64)
    } else {
        None
    }
}

/// Generate a transaction id: `T` + base36 millis + 5 random chars
pub fn generate_transaction_id(at: DateTime<Utc>) -> String {
    let millis = at.timestamp_millis().max(0) as u64;
    format!("T{}{}", to_base36(millis), random_base36(5))
}

/// Generate a transaction reference: `REF` + 9 random chars
pub fn generate_reference() -> String {
    format!("REF{}", random_base36(9))
}

fn to_base36(mut value: u64) -> String {
    if value == 0 {
        return "0".to_string();
    }
    let mut digits = Vec::new();
    while value > 0 {
        digits.push(BASE36_UPPER[(value % 36) as usize].to_ascii_lowercase());
        value /= 36;
    }
    digits.reverse();
    String::from_utf8_lossy(&digits).into_owned()
}

fn random_base36(len: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..len)
        .map(|_| BASE36_UPPER[rng.gen_range(0..BASE36_UPPER.len())] as char)
        .collect()
}
