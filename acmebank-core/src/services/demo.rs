//! Demo service - manage demo mode
//!
//! Demo mode points the bank at a separate store under `demo/` in the data
//! directory, seeded with one administrator and a funded savings account,
//! so the CLI can be tried without registering anyone.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::adapters::demo::{
    generate_demo_account, generate_demo_user, DEMO_ACCOUNT_NUMBER, DEMO_OPENING_BALANCE,
    DEMO_OPENING_DESCRIPTION,
};
use crate::adapters::json_file::JsonFileStore;
use crate::config::Config;
use crate::domain::result::Result;
use crate::domain::TransactionType;
use crate::ports::Store;
use crate::services::LedgerService;

const DEMO_DIR: &str = "demo";

/// Demo service for managing demo mode
pub struct DemoService {
    data_dir: PathBuf,
}

impl DemoService {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            data_dir: data_dir.to_path_buf(),
        }
    }

    /// Directory of the demo store for a data directory
    pub fn demo_dir(data_dir: &Path) -> PathBuf {
        data_dir.join(DEMO_DIR)
    }

    /// Check if demo mode is currently enabled
    pub fn is_enabled(&self) -> Result<bool> {
        let config = Config::load(&self.data_dir)?;
        Ok(config.demo_mode)
    }

    /// Enable demo mode
    ///
    /// Any previous demo store is discarded and reseeded from scratch.
    pub fn enable(&self) -> Result<()> {
        let demo_dir = Self::demo_dir(&self.data_dir);
        if demo_dir.exists() {
            std::fs::remove_dir_all(&demo_dir)?;
        }

        let mut config = Config::load(&self.data_dir).unwrap_or_default();
        config.enable_demo_mode();
        config.save(&self.data_dir)?;

        let store: Arc<dyn Store> = Arc::new(JsonFileStore::new(&demo_dir)?);
        initialize_if_needed(&store)?;
        Ok(())
    }

    /// Disable demo mode, deleting the demo store if `clean` is set
    pub fn disable(&self, clean: bool) -> Result<()> {
        let mut config = Config::load(&self.data_dir).unwrap_or_default();
        config.disable_demo_mode();
        config.save(&self.data_dir)?;

        let demo_dir = Self::demo_dir(&self.data_dir);
        if clean && demo_dir.exists() {
            std::fs::remove_dir_all(&demo_dir)?;
        }
        Ok(())
    }
}

/// Seed the demo administrator into a store that has never been seeded
///
/// Returns whether anything was written. The opening balance is recorded as
/// a deposit so the account replays to its balance like any other. The store
/// is only marked initialized once the account is funded, so an interrupted
/// run is completed by the next call.
pub fn initialize_if_needed(store: &Arc<dyn Store>) -> Result<bool> {
    let _lock = store.lock()?;
    if store.is_initialized()? {
        return Ok(false);
    }

    let user = generate_demo_user();
    let account = generate_demo_account();
    let mut users = store.get_users()?;
    let mut accounts = store.get_accounts()?;
    let missing_user = !users.iter().any(|u| u.matches_id(&user.id_type, &user.id_number));
    let missing_account = !accounts.iter().any(|a| a.account_number == account.account_number);
    if missing_user {
        users.push(user);
    }
    if missing_account {
        accounts.push(account);
    }
    if missing_user || missing_account {
        store.save_registration(&users, &accounts)?;
    }

    let ledger = LedgerService::new(Arc::clone(store));
    if ledger.account_transactions(DEMO_ACCOUNT_NUMBER)?.is_empty() {
        ledger.apply_locked(
            DEMO_ACCOUNT_NUMBER,
            DEMO_OPENING_BALANCE,
            TransactionType::Deposit,
            DEMO_OPENING_DESCRIPTION,
        )?;
    }
    store.mark_initialized()?;
    Ok(true)
}
