//! ACME Bank Core - ledger, accounts and customers for the demo bank
//!
//! This crate implements the core domain logic following hexagonal architecture:
//!
//! - **domain**: Core business entities (Account, Transaction, User, etc.)
//! - **ports**: Trait definitions for external dependencies (Store)
//! - **services**: Business logic orchestration (ledger, users, statements)
//! - **adapters**: Concrete implementations (JSON files, memory, demo data)

pub mod adapters;
pub mod config;
pub mod domain;
pub mod ports;
pub mod services;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use adapters::json_file::JsonFileStore;
use config::Config;
use ports::Store;
use services::*;

// Re-export commonly used types at crate root
pub use domain::result::{Error, Result};
pub use domain::{
    format_currency, Account, Certificate, NewUser, Transaction, TransactionType, User,
};
pub use services::{Replay, Session, Statement};

/// Main context for bank operations
///
/// This is the primary entry point for all business logic. It holds the
/// store, configuration, and all services for one data directory.
pub struct BankContext {
    pub config: Config,
    pub store: Arc<dyn Store>,
    /// Directory the store's collections live in
    pub store_dir: PathBuf,
    pub ledger_service: LedgerService,
    pub user_service: UserService,
    pub certificate_service: CertificateService,
    pub statement_service: StatementService,
    pub doctor_service: DoctorService,
}

impl BankContext {
    /// Create a new bank context
    ///
    /// In demo mode the store lives in `demo/` and is seeded on first use.
    pub fn new(data_dir: &Path) -> Result<Self> {
        let config = Config::load(data_dir)?;

        let store_dir = if config.demo_mode {
            DemoService::demo_dir(data_dir)
        } else {
            data_dir.to_path_buf()
        };
        let store: Arc<dyn Store> = Arc::new(JsonFileStore::new(&store_dir)?);
        if config.demo_mode {
            services::demo::initialize_if_needed(&store)?;
        }

        Ok(Self::with_store(config, store, store_dir))
    }

    /// Wire services around an existing store
    pub fn with_store(config: Config, store: Arc<dyn Store>, store_dir: PathBuf) -> Self {
        let ledger_service = LedgerService::new(Arc::clone(&store));
        let user_service = UserService::new(Arc::clone(&store), &config);
        let certificate_service = CertificateService::new(Arc::clone(&store), config.currency.clone());
        let statement_service = StatementService::new(Arc::clone(&store));
        let doctor_service = DoctorService::new(Arc::clone(&store));

        Self {
            config,
            store,
            store_dir,
            ledger_service,
            user_service,
            certificate_service,
            statement_service,
            doctor_service,
        }
    }

    /// Format an amount in the configured currency
    pub fn format_amount(&self, amount: i64) -> String {
        format_currency(amount, &self.config.currency)
    }
}
