//! Core domain entities
//!
//! All business entities are defined here. These are pure data structures
//! with validation logic - no I/O or external dependencies.

mod account;
mod certificate;
pub mod money;
pub mod result;
mod transaction;
mod user;

pub use account::{Account, AccountRecord, ACCOUNT_NUMBER_MAX, ACCOUNT_NUMBER_MIN};
pub use certificate::Certificate;
pub use money::format_currency;
pub use transaction::{
    generate_reference, generate_transaction_id, Transaction, TransactionRecord, TransactionType,
};
pub use user::{NewUser, User, UserRecord};
