//! In-memory store implementation
//!
//! Used by tests and by callers embedding the ledger without a data
//! directory. Contents live as long as the store value.

use std::sync::{Arc, Condvar, Mutex, MutexGuard};

use crate::domain::result::{Error, Result};
use crate::domain::{Account, Transaction, User};
use crate::ports::{Store, StoreLock};

#[derive(Debug, Default)]
struct Collections {
    users: Vec<User>,
    accounts: Vec<Account>,
    transactions: Vec<Transaction>,
    initialized: bool,
}

/// Writer exclusion for [`MemoryStore::lock`]
#[derive(Debug, Default)]
struct WriteGate {
    held: Mutex<bool>,
    released: Condvar,
}

struct GateGuard(Arc<WriteGate>);

impl Drop for GateGuard {
    fn drop(&mut self) {
        if let Ok(mut held) = self.0.held.lock() {
            *held = false;
        }
        self.0.released.notify_one();
    }
}

/// Store backed by process memory
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Collections>,
    gate: Arc<WriteGate>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with accounts
    pub fn with_accounts(accounts: Vec<Account>) -> Self {
        let store = Self::new();
        if let Ok(mut inner) = store.inner.lock() {
            inner.accounts = accounts;
        }
        store
    }

    fn inner(&self) -> Result<MutexGuard<'_, Collections>> {
        self.inner
            .lock()
            .map_err(|e| Error::storage(format!("Lock poisoned: {}", e)))
    }
}

impl Store for MemoryStore {
    fn lock(&self) -> Result<StoreLock> {
        let poisoned = |e: String| Error::storage(format!("Lock poisoned: {}", e));
        let mut held = self.gate.held.lock().map_err(|e| poisoned(e.to_string()))?;
        while *held {
            held = self
                .gate
                .released
                .wait(held)
                .map_err(|e| poisoned(e.to_string()))?;
        }
        *held = true;
        Ok(StoreLock::new(GateGuard(Arc::clone(&self.gate))))
    }

    fn get_users(&self) -> Result<Vec<User>> {
        Ok(self.inner()?.users.clone())
    }

    fn save_users(&self, users: &[User]) -> Result<()> {
        self.inner()?.users = users.to_vec();
        Ok(())
    }

    fn get_accounts(&self) -> Result<Vec<Account>> {
        Ok(self.inner()?.accounts.clone())
    }

    fn save_accounts(&self, accounts: &[Account]) -> Result<()> {
        self.inner()?.accounts = accounts.to_vec();
        Ok(())
    }

    fn get_transactions(&self) -> Result<Vec<Transaction>> {
        Ok(self.inner()?.transactions.clone())
    }

    fn save_transactions(&self, transactions: &[Transaction]) -> Result<()> {
        self.inner()?.transactions = transactions.to_vec();
        Ok(())
    }

    fn save_ledger(&self, accounts: &[Account], transactions: &[Transaction]) -> Result<()> {
        let mut inner = self.inner()?;
        inner.accounts = accounts.to_vec();
        inner.transactions = transactions.to_vec();
        Ok(())
    }

    fn save_registration(&self, users: &[User], accounts: &[Account]) -> Result<()> {
        let mut inner = self.inner()?;
        inner.users = users.to_vec();
        inner.accounts = accounts.to_vec();
        Ok(())
    }

    fn is_initialized(&self) -> Result<bool> {
        Ok(self.inner()?.initialized)
    }

    fn mark_initialized(&self) -> Result<()> {
        self.inner()?.initialized = true;
        Ok(())
    }
}
