//! Concurrent ledger access tests
//!
//! These tests verify that concurrent writers against the same store
//! directory serialize through the store lock, so no balance update or log
//! entry is lost and the log still replays to the stored balance.
//!
//! Run with: cargo test --test concurrent_access_test -- --nocapture

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Instant;
use tempfile::TempDir;

use acmebank_core::adapters::json_file::JsonFileStore;
use acmebank_core::adapters::memory::MemoryStore;
use acmebank_core::ports::Store;
use acmebank_core::services::{DoctorService, LedgerService};
use acmebank_core::{Account, Error};

/// Number of concurrent threads for stress tests.
/// Keep this realistic - at most a few CLI processes compete for the lock.
const THREAD_COUNT: usize = 6;

/// Number of iterations per thread
const ITERATIONS_PER_THREAD: usize = 5;

const ACCOUNT: &str = "100000001";

fn seed_store(store: &dyn Store) {
    store
        .save_accounts(&[Account::new(ACCOUNT, "123456789")])
        .unwrap();
}

/// Test: Multiple threads, each with its OWN store instance over the same
/// directory, depositing into one account simultaneously.
///
/// This simulates several CLI invocations running at once.
#[test]
fn test_concurrent_store_instances_depositing() {
    let temp_dir = TempDir::new().unwrap();
    seed_store(&JsonFileStore::new(temp_dir.path()).unwrap());

    let barrier = Arc::new(Barrier::new(THREAD_COUNT));
    let dir = Arc::new(temp_dir.path().to_path_buf());
    let error_count = Arc::new(AtomicUsize::new(0));

    let mut handles = vec![];

    for thread_id in 0..THREAD_COUNT {
        let barrier = Arc::clone(&barrier);
        let dir = Arc::clone(&dir);
        let error_count = Arc::clone(&error_count);

        let handle = thread::spawn(move || {
            let store = JsonFileStore::new(&dir).unwrap();
            let ledger = LedgerService::new(Arc::new(store));

            // Wait for all threads to be ready
            barrier.wait();
            let start = Instant::now();

            for i in 0..ITERATIONS_PER_THREAD {
                if let Err(e) = ledger.deposit(ACCOUNT, 100) {
                    eprintln!("Thread {}: deposit error at iteration {}: {}", thread_id, i, e);
                    error_count.fetch_add(1, Ordering::SeqCst);
                }
            }
            println!(
                "Thread {}: Completed {} deposits in {:?}",
                thread_id,
                ITERATIONS_PER_THREAD,
                start.elapsed()
            );
        });

        handles.push(handle);
    }

    for handle in handles {
        handle.join().unwrap();
    }

    let total_errors = error_count.load(Ordering::SeqCst);
    assert_eq!(total_errors, 0, "Expected 0 errors but got {}", total_errors);

    let ledger = LedgerService::new(Arc::new(JsonFileStore::new(&dir).unwrap()));
    let account = ledger.get_account(ACCOUNT).unwrap();
    let expected_count = THREAD_COUNT * ITERATIONS_PER_THREAD;

    assert_eq!(account.balance, 100 * expected_count as i64);
    assert_eq!(account.transactions.len(), expected_count);

    let replay = ledger.replay_balance(ACCOUNT).unwrap();
    assert_eq!(replay.transaction_count, expected_count);
    assert!(
        replay.is_consistent_with(account.balance),
        "Replay mismatches: {:?}",
        replay.mismatches
    );
}

/// Test: Threads sharing one in-memory store race withdrawals against a
/// balance that cannot cover all of them.
///
/// Exactly as many withdrawals succeed as the balance allows; the rest see
/// InsufficientFunds and leave nothing behind.
#[test]
fn test_concurrent_withdrawals_never_overdraw() {
    let store = Arc::new(MemoryStore::new());
    seed_store(store.as_ref());
    let ledger = Arc::new(LedgerService::new(store.clone()));

    let affordable = THREAD_COUNT * ITERATIONS_PER_THREAD / 2;
    ledger.deposit(ACCOUNT, 10 * affordable as i64).unwrap();

    let barrier = Arc::new(Barrier::new(THREAD_COUNT));
    let successes = Arc::new(AtomicUsize::new(0));
    let rejections = Arc::new(AtomicUsize::new(0));

    let handles: Vec<_> = (0..THREAD_COUNT)
        .map(|_| {
            let ledger = Arc::clone(&ledger);
            let barrier = Arc::clone(&barrier);
            let successes = Arc::clone(&successes);
            let rejections = Arc::clone(&rejections);
            thread::spawn(move || {
                barrier.wait();
                for _ in 0..ITERATIONS_PER_THREAD {
                    match ledger.withdraw(ACCOUNT, 10) {
                        Ok(_) => {
                            successes.fetch_add(1, Ordering::SeqCst);
                        }
                        Err(Error::InsufficientFunds { .. }) => {
                            rejections.fetch_add(1, Ordering::SeqCst);
                        }
                        Err(e) => panic!("unexpected error: {}", e),
                    }
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(successes.load(Ordering::SeqCst), affordable);
    assert_eq!(
        rejections.load(Ordering::SeqCst),
        THREAD_COUNT * ITERATIONS_PER_THREAD - affordable
    );

    let account = ledger.get_account(ACCOUNT).unwrap();
    assert_eq!(account.balance, 0);
    assert_eq!(store.get_transactions().unwrap().len(), affordable + 1);
    assert!(ledger.replay_balance(ACCOUNT).unwrap().is_consistent_with(0));
}

/// Test: Health checks and dashboard reads running against a separate
/// store instance while deposits are committed.
///
/// Readers take the store lock, so they never observe the new log entry
/// together with the old balance.
#[test]
fn test_readers_never_see_half_committed_writes() {
    let temp_dir = TempDir::new().unwrap();
    seed_store(&JsonFileStore::new(temp_dir.path()).unwrap());
    let dir = temp_dir.path().to_path_buf();
    let deposits = THREAD_COUNT * ITERATIONS_PER_THREAD;

    let writer_dir = dir.clone();
    let writer = thread::spawn(move || {
        let ledger = LedgerService::new(Arc::new(JsonFileStore::new(&writer_dir).unwrap()));
        for _ in 0..deposits {
            ledger.deposit(ACCOUNT, 100).unwrap();
        }
    });

    let store: Arc<dyn Store> = Arc::new(JsonFileStore::new(&dir).unwrap());
    let doctor = DoctorService::new(Arc::clone(&store));
    let ledger = LedgerService::new(Arc::clone(&store));
    while !writer.is_finished() {
        let result = doctor.run_checks().unwrap();
        assert!(result.is_healthy(), "Unhealthy mid-write: {:?}", result.checks);

        let (account, recent) = ledger.account_overview(ACCOUNT, usize::MAX).unwrap();
        assert_eq!(recent.len(), account.transactions.len());
        assert_eq!(100 * recent.len() as i64, account.balance);
    }
    writer.join().unwrap();

    let (account, recent) = ledger.account_overview(ACCOUNT, usize::MAX).unwrap();
    assert_eq!(account.balance, 100 * deposits as i64);
    assert_eq!(recent.len(), deposits);
}
