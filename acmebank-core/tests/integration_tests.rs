//! Integration tests for acmebank-core services
//!
//! These tests run the services against a real file-backed store in a
//! temporary directory.
//!
//! Run with: cargo test --test integration_tests -- --nocapture

use std::sync::Arc;
use tempfile::TempDir;

use acmebank_core::adapters::demo::{DEMO_ACCOUNT_NUMBER, DEMO_ID_NUMBER, DEMO_OPENING_BALANCE, DEMO_PASSWORD};
use acmebank_core::adapters::json_file::JsonFileStore;
use acmebank_core::config::Config;
use acmebank_core::ports::Store;
use acmebank_core::services::{DemoService, LedgerService, UserService};
use acmebank_core::{BankContext, Error, NewUser, TransactionType};

// ============================================================================
// Test Helpers
// ============================================================================

fn create_test_store(temp_dir: &TempDir) -> Arc<dyn Store> {
    Arc::new(JsonFileStore::new(temp_dir.path()).expect("Failed to create store"))
}

fn registration_form(id_number: &str, email: &str) -> NewUser {
    NewUser {
        id_type: "cc".to_string(),
        id_number: id_number.to_string(),
        first_name: "Laura".to_string(),
        last_name: "Gómez".to_string(),
        email: email.to_string(),
        password: "claveSegura1".to_string(),
        confirm_password: "claveSegura1".to_string(),
        accept_terms: true,
        ..Default::default()
    }
}

/// Register a user and fund the new account through the ledger
fn funded_account(store: &Arc<dyn Store>, balance: i64) -> String {
    let users = UserService::new(Arc::clone(store), &Config::default());
    let registration = users
        .register_user(registration_form("52123456", "laura@example.com"))
        .unwrap();
    let account_number = registration.account.account_number;
    if balance > 0 {
        LedgerService::new(Arc::clone(store))
            .deposit(&account_number, balance)
            .unwrap();
    }
    account_number
}

// ============================================================================
// Ledger Tests
// ============================================================================

#[test]
fn test_ledger_scenario_persists_across_instances() {
    let temp_dir = TempDir::new().unwrap();
    let store = create_test_store(&temp_dir);
    let account = funded_account(&store, 5_000_000);
    let ledger = LedgerService::new(Arc::clone(&store));

    assert_eq!(ledger.deposit(&account, 500_000).unwrap().balance_after, 5_500_000);

    let err = ledger.withdraw(&account, 6_000_000).unwrap_err();
    assert!(matches!(err, Error::InsufficientFunds { .. }));

    let last = ledger.withdraw(&account, 5_500_000).unwrap();
    assert_eq!(last.balance_after, 0);

    // A fresh store over the same directory sees the same state
    let reopened = LedgerService::new(create_test_store(&temp_dir));
    let stored = reopened.get_account(&account).unwrap();
    assert_eq!(stored.balance, 0);
    assert_eq!(stored.transactions.len(), 3);

    let replay = reopened.replay_balance(&account).unwrap();
    assert!(replay.is_consistent_with(stored.balance));
    assert_eq!(replay.transaction_count, 3);
}

#[test]
fn test_failed_transaction_does_not_touch_files() {
    let temp_dir = TempDir::new().unwrap();
    let store = create_test_store(&temp_dir);
    let account = funded_account(&store, 1_000);
    let ledger = LedgerService::new(Arc::clone(&store));

    let accounts_before = std::fs::read(temp_dir.path().join("accounts.json")).unwrap();
    let log_before = std::fs::read(temp_dir.path().join("transactions.json")).unwrap();

    assert!(ledger.withdraw(&account, 1_001).is_err());
    assert!(ledger.deposit("999999999", 10).is_err());
    assert!(ledger.perform_transaction_raw(&account, 10, "refund", "").is_err());

    assert_eq!(std::fs::read(temp_dir.path().join("accounts.json")).unwrap(), accounts_before);
    assert_eq!(std::fs::read(temp_dir.path().join("transactions.json")).unwrap(), log_before);
}

#[test]
fn test_large_balances_reload_exactly() {
    let temp_dir = TempDir::new().unwrap();
    let store = create_test_store(&temp_dir);
    // 2^53 + 1 has no exact f64 representation
    let account = funded_account(&store, 9_007_199_254_740_993);
    let ledger = LedgerService::new(Arc::clone(&store));

    let reopened = LedgerService::new(create_test_store(&temp_dir));
    assert_eq!(reopened.get_account(&account).unwrap().balance, 9_007_199_254_740_993);

    let tx = ledger.deposit(&account, 10_000_000_000_000_000).unwrap();
    assert_eq!(tx.balance_after, 19_007_199_254_740_993);

    let reopened = LedgerService::new(create_test_store(&temp_dir));
    let stored = reopened.get_account(&account).unwrap();
    assert_eq!(stored.balance, 19_007_199_254_740_993);
    assert_eq!(reopened.deposit(&account, 1).unwrap().balance_after, 19_007_199_254_740_994);

    let replay = reopened.replay_balance(&account).unwrap();
    assert!(replay.is_consistent_with(19_007_199_254_740_994));
}

#[test]
fn test_loads_data_written_by_browser_app() {
    let temp_dir = TempDir::new().unwrap();
    std::fs::write(
        temp_dir.path().join("accounts.json"),
        r#"[{"accountNumber":"100000001","userId":"123456789","balance":5000000,
            "type":"ahorros","status":"active","transactions":[],
            "createdAt":"2024-01-01T00:00:00.000Z"}]"#,
    )
    .unwrap();
    let ledger = LedgerService::new(create_test_store(&temp_dir));

    let tx = ledger
        .perform_transaction("100000001", 250_000, TransactionType::Payment, "Service payment: Gas")
        .unwrap();
    assert_eq!(tx.balance_after, 4_750_000);
    assert_eq!(ledger.get_account("100000001").unwrap().type_label(), "ahorros");
}

#[test]
fn test_malformed_store_is_rejected() {
    let temp_dir = TempDir::new().unwrap();
    std::fs::write(
        temp_dir.path().join("accounts.json"),
        r#"[{"accountNumber":"100000001","userId":"1","balance":-5,
            "transactions":[],"createdAt":"2024-01-01T00:00:00Z"}]"#,
    )
    .unwrap();
    let ledger = LedgerService::new(create_test_store(&temp_dir));

    assert!(matches!(
        ledger.deposit("100000001", 10),
        Err(Error::MalformedRecord(_))
    ));
}

// ============================================================================
// Context and Demo Tests
// ============================================================================

#[test]
fn test_demo_context_end_to_end() {
    let temp_dir = TempDir::new().unwrap();
    DemoService::new(temp_dir.path()).enable().unwrap();

    let ctx = BankContext::new(temp_dir.path()).unwrap();
    assert!(ctx.config.demo_mode);
    assert!(ctx.store_dir.ends_with("demo"));

    let session = ctx.user_service.login(DEMO_ID_NUMBER, DEMO_PASSWORD).unwrap();
    assert_eq!(session.account_number, DEMO_ACCOUNT_NUMBER);

    ctx.ledger_service.deposit(&session.account_number, 500_000).unwrap();
    let certificate = ctx.certificate_service.generate(&session).unwrap();
    assert_eq!(certificate.balance, DEMO_OPENING_BALANCE + 500_000);
    assert!(ctx.format_amount(certificate.balance).contains("5.500.000"));

    let health = ctx.doctor_service.run_checks().unwrap();
    assert!(health.is_healthy());
    assert_eq!(health.summary.warnings, 0);
}

#[test]
fn test_regular_context_starts_empty() {
    let temp_dir = TempDir::new().unwrap();
    let ctx = BankContext::new(temp_dir.path()).unwrap();

    assert!(ctx.store.get_users().unwrap().is_empty());
    assert!(matches!(
        ctx.user_service.login(DEMO_ID_NUMBER, DEMO_PASSWORD),
        Err(Error::InvalidCredentials)
    ));
}
