//! Service layer - business logic orchestration
//!
//! Services coordinate domain logic and port interactions. Each service
//! focuses on a specific use case or feature area.

mod certificate;
pub mod demo;
mod doctor;
mod ledger;
pub mod logging;
mod statement;
mod users;
pub mod views;

pub use certificate::CertificateService;
pub use demo::DemoService;
pub use doctor::{CheckResult, DoctorResult, DoctorService, DoctorSummary};
pub use ledger::{LedgerService, DEPOSIT_DESCRIPTION, WITHDRAWAL_DESCRIPTION};
pub use logging::{EntryPoint, LogEntry, LogEvent, LoggingService};
pub use statement::{Statement, StatementService};
pub use users::{Registration, Session, UserService};
pub use views::{Replay, ReplayMismatch, Totals};
