//! Demo data
//!
//! One administrator with a savings account funded with 5,000,000. The
//! funding is recorded as an opening deposit (see `DemoService`) so the
//! ledger replays to the stored balance from the first record.

use chrono::Utc;

use crate::domain::{Account, User};

pub const DEMO_ID_TYPE: &str = "cc";
pub const DEMO_ID_NUMBER: &str = "123456789";
pub const DEMO_EMAIL: &str = "admin@acmebank.com";
pub const DEMO_PASSWORD: &str = "Demo1234";
pub const DEMO_ACCOUNT_NUMBER: &str = "100000001";
pub const DEMO_OPENING_BALANCE: i64 = 5_000_000;
pub const DEMO_OPENING_DESCRIPTION: &str = "Opening balance";

/// Generate the demo administrator
pub fn generate_demo_user() -> User {
    User {
        id_type: DEMO_ID_TYPE.to_string(),
        id_number: DEMO_ID_NUMBER.to_string(),
        first_name: "Admin".to_string(),
        last_name: "Demo".to_string(),
        gender: Some("male".to_string()),
        phone: Some("3001234567".to_string()),
        email: DEMO_EMAIL.to_string(),
        address: Some("Calle 123".to_string()),
        city: Some("Bogotá".to_string()),
        password: DEMO_PASSWORD.to_string(),
        accounts: vec![DEMO_ACCOUNT_NUMBER.to_string()],
        created_at: Utc::now(),
    }
}

/// Generate the demo account, still unfunded
pub fn generate_demo_account() -> Account {
    let mut account = Account::new(DEMO_ACCOUNT_NUMBER, DEMO_ID_NUMBER);
    account.account_type = Some("Savings".to_string());
    account
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_demo_records_are_valid() {
        let account = generate_demo_account();
        assert!(account.validate().is_ok());
        assert_eq!(account.balance, 0);

        let user = generate_demo_user();
        assert_eq!(user.primary_account(), Some(account.account_number.as_str()));
        assert_eq!(account.user_id, user.id_number);
    }
}
