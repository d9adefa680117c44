//! CLI command implementations

pub mod account;
pub mod demo;
pub mod doctor;
pub mod logs;
pub mod register;
pub mod statement;
pub mod transaction;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use dialoguer::Password;

use acmebank_core::services::{EntryPoint, LogEvent, LoggingService};
use acmebank_core::{BankContext, Session};

/// Credentials for commands that act on an account
#[derive(Args, Debug, Clone)]
pub struct AuthArgs {
    /// Id number or email address
    #[arg(long, short)]
    pub user: String,
    /// Password (prompted for when not given)
    #[arg(long, env = "ACME_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,
}

/// Get the logging service for CLI operations
///
/// Returns None if logging fails to initialize (shouldn't block operations)
pub fn get_logger() -> Option<LoggingService> {
    let data_dir = get_data_dir().ok()?;
    LoggingService::new(&data_dir, EntryPoint::Cli, env!("CARGO_PKG_VERSION")).ok()
}

/// Log an event, ignoring any errors (logging should never break the app)
pub fn log_event(logger: &Option<LoggingService>, event: LogEvent) {
    if let Some(l) = logger {
        let _ = l.log(event);
    }
}

/// Log a failed command by error kind only
///
/// Error messages can carry balances and amounts, so they stay out of the log.
pub fn log_failure(logger: &Option<LoggingService>, command: &str, error: &anyhow::Error) {
    log_event(
        logger,
        LogEvent::new("command_failed")
            .with_command(command)
            .with_error(error_kind(error)),
    );
}

fn error_kind(error: &anyhow::Error) -> &'static str {
    use acmebank_core::Error;

    let core = error
        .chain()
        .find_map(|cause| cause.downcast_ref::<Error>());
    match core {
        Some(Error::AccountNotFound(_)) => "account_not_found",
        Some(Error::InsufficientFunds { .. }) => "insufficient_funds",
        Some(Error::InvalidTransactionType(_)) => "invalid_transaction_type",
        Some(Error::InvalidAmount(_)) => "invalid_amount",
        Some(Error::NotFound(_)) => "not_found",
        Some(Error::AlreadyExists(_)) => "already_exists",
        Some(Error::InvalidCredentials) => "invalid_credentials",
        Some(Error::Validation(_)) => "validation",
        Some(Error::MalformedRecord(_)) => "malformed_record",
        Some(Error::Storage(_)) => "storage",
        Some(Error::Config(_)) => "config",
        Some(Error::Io(_)) => "io",
        Some(Error::Json(_)) => "json",
        Some(Error::Csv(_)) => "csv",
        None => "cli",
    }
}

/// Get the data directory from environment or default
pub fn get_data_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var("ACMEBANK_DIR") {
        return Ok(PathBuf::from(dir));
    }
    let home = dirs::home_dir().context("Could not find home directory")?;
    Ok(home.join(".acmebank"))
}

/// Get or create the bank context
pub fn get_context() -> Result<BankContext> {
    let data_dir = get_data_dir()?;

    // Create directory if it doesn't exist
    std::fs::create_dir_all(&data_dir)
        .with_context(|| format!("Failed to create data directory: {:?}", data_dir))?;

    BankContext::new(&data_dir).context("Failed to initialize bank context")
}

/// Get password from --password flag, ACME_PASSWORD env var, or prompt
fn get_password(password: Option<String>, prompt: &str) -> Result<String> {
    if let Some(p) = password {
        return Ok(p);
    }
    let p = Password::new().with_prompt(prompt).interact()?;
    Ok(p)
}

/// Get a new password, prompting twice when not given
///
/// Returns the password and its confirmation for the core to compare.
fn get_new_password(password: Option<String>) -> Result<(String, String)> {
    if let Some(p) = password {
        return Ok((p.clone(), p));
    }
    let p1 = Password::new().with_prompt("New password").interact()?;
    let p2 = Password::new().with_prompt("Confirm password").interact()?;
    Ok((p1, p2))
}

/// Open the context and log in
pub fn login(auth: AuthArgs) -> Result<(BankContext, Session)> {
    let ctx = get_context()?;
    let password = get_password(auth.password, "Password")?;
    let session = ctx
        .user_service
        .login(&auth.user, &password)
        .context("Login failed")?;
    Ok((ctx, session))
}
