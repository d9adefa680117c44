//! JSON file store implementation
//!
//! Each collection lives in its own file inside the store directory:
//!
//! ```text
//! <dir>/users.json
//! <dir>/accounts.json
//! <dir>/transactions.json
//! <dir>/meta.json
//! <dir>/.lock
//! ```
//!
//! Files hold the same camelCase JSON arrays the browser app kept in
//! `localStorage`, so exported browser data can be dropped in as-is.
//! Writes go to a temporary file in the same directory which is then
//! renamed over the target, so a reader never sees a half-written file.

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use fs2::FileExt;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use crate::domain::result::{Error, Result};
use crate::domain::{Account, Transaction, User};
use crate::ports::{Store, StoreLock};

const USERS_FILE: &str = "users.json";
const ACCOUNTS_FILE: &str = "accounts.json";
const TRANSACTIONS_FILE: &str = "transactions.json";
const META_FILE: &str = "meta.json";
const LOCK_FILE: &str = ".lock";

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoreMeta {
    #[serde(default)]
    initialized: bool,
    #[serde(default)]
    initialized_at: Option<DateTime<Utc>>,
}

/// Holds the advisory lock on `.lock` until dropped
struct FileLockGuard {
    file: File,
}

impl Drop for FileLockGuard {
    fn drop(&mut self) {
        let _ = self.file.unlock();
    }
}

/// File-backed store
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    /// Open (creating if needed) a store rooted at `dir`
    pub fn new(dir: &Path) -> Result<Self> {
        fs::create_dir_all(dir)?;
        Ok(Self {
            dir: dir.to_path_buf(),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn read_collection<T: DeserializeOwned>(&self, name: &str) -> Result<Vec<T>> {
        let path = self.dir.join(name);
        if !path.exists() {
            return Ok(Vec::new());
        }
        let content = fs::read_to_string(&path)?;
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }
        serde_json::from_str(&content).map_err(|e| Error::malformed(format!("{}: {}", name, e)))
    }

    /// Serialize into a temp file next to the target, without replacing it yet
    fn stage<T: Serialize + ?Sized>(&self, value: &T) -> Result<NamedTempFile> {
        let content = serde_json::to_vec_pretty(value)?;
        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(&content)?;
        tmp.as_file().sync_all()?;
        Ok(tmp)
    }

    fn commit(&self, staged: NamedTempFile, name: &str) -> Result<()> {
        staged
            .persist(self.dir.join(name))
            .map_err(|e| Error::Io(e.error))?;
        Ok(())
    }

    fn write_collection<T: Serialize>(&self, name: &str, items: &[T]) -> Result<()> {
        let staged = self.stage(items)?;
        self.commit(staged, name)
    }

    fn read_meta(&self) -> Result<StoreMeta> {
        let path = self.dir.join(META_FILE);
        if !path.exists() {
            return Ok(StoreMeta::default());
        }
        let content = fs::read_to_string(&path)?;
        serde_json::from_str(&content).map_err(|e| Error::malformed(format!("{}: {}", META_FILE, e)))
    }
}

impl Store for JsonFileStore {
    fn lock(&self) -> Result<StoreLock> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(self.dir.join(LOCK_FILE))?;
        file.lock_exclusive()
            .map_err(|e| Error::storage(format!("failed to lock store: {}", e)))?;
        Ok(StoreLock::new(FileLockGuard { file }))
    }

    fn get_users(&self) -> Result<Vec<User>> {
        self.read_collection(USERS_FILE)
    }

    fn save_users(&self, users: &[User]) -> Result<()> {
        self.write_collection(USERS_FILE, users)
    }

    fn get_accounts(&self) -> Result<Vec<Account>> {
        self.read_collection(ACCOUNTS_FILE)
    }

    fn save_accounts(&self, accounts: &[Account]) -> Result<()> {
        self.write_collection(ACCOUNTS_FILE, accounts)
    }

    fn get_transactions(&self) -> Result<Vec<Transaction>> {
        self.read_collection(TRANSACTIONS_FILE)
    }

    fn save_transactions(&self, transactions: &[Transaction]) -> Result<()> {
        self.write_collection(TRANSACTIONS_FILE, transactions)
    }

    fn save_ledger(&self, accounts: &[Account], transactions: &[Transaction]) -> Result<()> {
        // Stage both before replacing either
        let staged_transactions = self.stage(transactions)?;
        let staged_accounts = self.stage(accounts)?;
        self.commit(staged_transactions, TRANSACTIONS_FILE)?;
        self.commit(staged_accounts, ACCOUNTS_FILE)
    }

    fn save_registration(&self, users: &[User], accounts: &[Account]) -> Result<()> {
        let staged_accounts = self.stage(accounts)?;
        let staged_users = self.stage(users)?;
        self.commit(staged_accounts, ACCOUNTS_FILE)?;
        self.commit(staged_users, USERS_FILE)
    }

    fn is_initialized(&self) -> Result<bool> {
        Ok(self.read_meta()?.initialized)
    }

    fn mark_initialized(&self) -> Result<()> {
        let meta = StoreMeta {
            initialized: true,
            initialized_at: Some(Utc::now()),
        };
        let staged = self.stage(&meta)?;
        self.commit(staged, META_FILE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_empty_store() {
        let dir = tempdir().unwrap();
        let store = JsonFileStore::new(dir.path()).unwrap();

        assert!(store.get_users().unwrap().is_empty());
        assert!(store.get_accounts().unwrap().is_empty());
        assert!(store.get_transactions().unwrap().is_empty());
        assert!(!store.is_initialized().unwrap());
    }

    #[test]
    fn test_accounts_round_trip_through_disk() {
        let dir = tempdir().unwrap();
        let store = JsonFileStore::new(dir.path()).unwrap();

        let mut account = Account::new("100000001", "123456789");
        account.balance = 42;
        store.save_accounts(&[account.clone()]).unwrap();

        // A second handle on the same directory sees the write
        let other = JsonFileStore::new(dir.path()).unwrap();
        assert_eq!(other.get_accounts().unwrap(), vec![account]);

        let raw = fs::read_to_string(dir.path().join(ACCOUNTS_FILE)).unwrap();
        assert!(raw.contains("\"accountNumber\""));
    }

    #[test]
    fn test_rejects_malformed_file() {
        let dir = tempdir().unwrap();
        let store = JsonFileStore::new(dir.path()).unwrap();
        fs::write(
            dir.path().join(ACCOUNTS_FILE),
            r#"[{"accountNumber":"100000001","userId":"1","balance":-10,"createdAt":"2024-01-01T00:00:00Z"}]"#,
        )
        .unwrap();

        let err = store.get_accounts().unwrap_err();
        assert!(matches!(err, Error::MalformedRecord(_)));
        assert!(err.to_string().contains("accounts.json"));
    }

    #[test]
    fn test_mark_initialized() {
        let dir = tempdir().unwrap();
        let store = JsonFileStore::new(dir.path()).unwrap();
        store.mark_initialized().unwrap();
        assert!(store.is_initialized().unwrap());
    }

    #[test]
    fn test_lock_is_released_on_drop() {
        let dir = tempdir().unwrap();
        let store = JsonFileStore::new(dir.path()).unwrap();
        {
            let _lock = store.lock().unwrap();
        }
        // Would block forever if the first lock were still held
        let _again = store.lock().unwrap();
    }
}
