//! Store port - persistence abstraction
//!
//! The store is a key-value layout with three top-level collections:
//! `users`, `accounts` and `transactions`. Collections are always loaded and
//! saved whole; there are no partial updates.

use crate::domain::result::Result;
use crate::domain::{Account, Transaction, User};

/// Exclusive hold on a store, released on drop
///
/// Read-modify-write cycles take this before loading so that no other
/// writer can interleave between the load and the save.
pub struct StoreLock {
    _guard: Box<dyn Send>,
}

impl StoreLock {
    /// Wrap an adapter-specific guard
    pub fn new(guard: impl Send + 'static) -> Self {
        Self {
            _guard: Box::new(guard),
        }
    }
}

/// Persistence abstraction for the bank's collections
pub trait Store: Send + Sync {
    /// Acquire the store-wide write lock
    ///
    /// Save methods do not lock on their own; callers hold this lock for
    /// the whole read-modify-write cycle.
    fn lock(&self) -> Result<StoreLock>;

    // === Users ===

    fn get_users(&self) -> Result<Vec<User>>;

    fn save_users(&self, users: &[User]) -> Result<()>;

    // === Accounts ===

    fn get_accounts(&self) -> Result<Vec<Account>>;

    fn save_accounts(&self, accounts: &[Account]) -> Result<()>;

    // === Transactions ===

    /// All transactions across all accounts, in creation order
    fn get_transactions(&self) -> Result<Vec<Transaction>>;

    fn save_transactions(&self, transactions: &[Transaction]) -> Result<()>;

    // === Paired writes ===

    /// Persist accounts and transactions together
    ///
    /// Nothing is written unless both collections serialize.
    fn save_ledger(&self, accounts: &[Account], transactions: &[Transaction]) -> Result<()>;

    /// Persist users and accounts together (registration)
    fn save_registration(&self, users: &[User], accounts: &[Account]) -> Result<()>;

    // === Metadata ===

    /// Whether initial data has been set up for this store
    fn is_initialized(&self) -> Result<bool>;

    fn mark_initialized(&self) -> Result<()>;
}
