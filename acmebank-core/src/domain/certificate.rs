//! Account certificate domain model

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::money::format_currency;

/// A bank certificate stating that a customer holds an account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Certificate {
    pub holder_name: String,
    pub id_type: String,
    pub id_number: String,
    pub account_number: String,
    pub account_type: String,
    pub opened_at: DateTime<Utc>,
    pub balance: i64,
    pub currency: String,
    pub issued_at: DateTime<Utc>,
}

impl fmt::Display for Certificate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "ACME BANK")?;
        writeln!(f, "BANK CERTIFICATE")?;
        writeln!(f)?;
        writeln!(
            f,
            "ACME Bank certifies that {}, identified with {} {},",
            self.holder_name,
            self.id_type.to_uppercase(),
            self.id_number
        )?;
        writeln!(
            f,
            "holds {} account number {}, opened on {}.",
            self.account_type.to_lowercase(),
            self.account_number,
            self.opened_at.format("%Y-%m-%d")
        )?;
        writeln!(
            f,
            "Balance on the date of issue: {}.",
            format_currency(self.balance, &self.currency)
        )?;
        writeln!(f)?;
        write!(f, "Issued on {}.", self.issued_at.format("%Y-%m-%d %H:%M UTC"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_certificate_text() {
        let cert = Certificate {
            holder_name: "Admin Demo".to_string(),
            id_type: "cc".to_string(),
            id_number: "123456789".to_string(),
            account_number: "100000001".to_string(),
            account_type: "Savings".to_string(),
            opened_at: Utc.with_ymd_and_hms(2024, 1, 10, 9, 0, 0).unwrap(),
            balance: 5_500_000,
            currency: "COP".to_string(),
            issued_at: Utc.with_ymd_and_hms(2024, 6, 1, 15, 30, 0).unwrap(),
        };
        let text = cert.to_string();
        assert!(text.contains("Admin Demo, identified with CC 123456789"));
        assert!(text.contains("savings account number 100000001, opened on 2024-01-10"));
        assert!(text.contains("$ 5.500.000"));
        assert!(text.ends_with("Issued on 2024-06-01 15:30 UTC."));
    }
}
