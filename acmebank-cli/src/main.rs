//! ACME Bank CLI - the demo bank in your terminal

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod output;

use acmebank_core::services::LogEvent;
use commands::transaction::Operation;
use commands::{account, demo, doctor, logs, register, statement, transaction, AuthArgs};

/// ACME Bank - accounts, payments and statements
#[derive(Parser)]
#[command(name = "acme", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Register a customer and open a savings account
    Register(register::RegisterArgs),

    /// Reset a forgotten password
    Recover(register::RecoverArgs),

    /// Show balance and recent transactions
    Summary {
        #[command(flatten)]
        auth: AuthArgs,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List account transactions, newest first
    Transactions {
        #[command(flatten)]
        auth: AuthArgs,
        /// Show only the N most recent
        #[arg(short, long)]
        limit: Option<usize>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Deposit money into the account
    Deposit {
        #[command(flatten)]
        auth: AuthArgs,
        /// Amount in whole currency units
        amount: i64,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Withdraw money from the account
    Withdraw {
        #[command(flatten)]
        auth: AuthArgs,
        /// Amount in whole currency units
        amount: i64,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Pay a service (water, electricity, gas, internet...)
    Pay {
        #[command(flatten)]
        auth: AuthArgs,
        /// Service being paid
        service: String,
        /// Amount in whole currency units
        amount: i64,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show a monthly statement
    Statement {
        #[command(flatten)]
        auth: AuthArgs,
        /// Statement year (defaults to the current year)
        #[arg(long)]
        year: Option<i32>,
        /// Statement month, 1-12 (defaults to the current month)
        #[arg(long)]
        month: Option<u32>,
        /// Write the statement lines to a CSV file
        #[arg(long)]
        csv: Option<PathBuf>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Issue an account certificate
    Certificate {
        #[command(flatten)]
        auth: AuthArgs,
        /// Save the certificate to a file instead of printing it
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Run ledger health checks
    Doctor {
        /// Show verbose output
        #[arg(long, short)]
        verbose: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Manage demo mode
    Demo {
        #[command(subcommand)]
        command: Option<demo::DemoCommands>,
    },

    /// View and manage application logs
    Logs {
        #[command(subcommand)]
        command: logs::LogsCommands,
    },
}

impl Commands {
    fn name(&self) -> &'static str {
        match self {
            Commands::Register(_) => "register",
            Commands::Recover(_) => "recover",
            Commands::Summary { .. } => "summary",
            Commands::Transactions { .. } => "transactions",
            Commands::Deposit { .. } => "deposit",
            Commands::Withdraw { .. } => "withdraw",
            Commands::Pay { .. } => "pay",
            Commands::Statement { .. } => "statement",
            Commands::Certificate { .. } => "certificate",
            Commands::Doctor { .. } => "doctor",
            Commands::Demo { .. } => "demo",
            Commands::Logs { .. } => "logs",
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let command = cli.command.name();

    let logger = commands::get_logger();
    commands::log_event(&logger, LogEvent::new("command_executed").with_command(command));

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            commands::log_failure(&logger, command, &e);
            output::error(&format!("{:#}", e));
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Register(args) => register::run(args),
        Commands::Recover(args) => register::run_recover(args),
        Commands::Summary { auth, json } => account::run_summary(auth, json),
        Commands::Transactions { auth, limit, json } => account::run_transactions(auth, limit, json),
        Commands::Deposit { auth, amount, json } => {
            transaction::run(auth, Operation::Deposit, amount, json)
        }
        Commands::Withdraw { auth, amount, json } => {
            transaction::run(auth, Operation::Withdraw, amount, json)
        }
        Commands::Pay { auth, service, amount, json } => {
            transaction::run(auth, Operation::Pay { service }, amount, json)
        }
        Commands::Statement { auth, year, month, csv, json } => {
            statement::run(auth, year, month, csv, json)
        }
        Commands::Certificate { auth, output, json } => account::run_certificate(auth, output, json),
        Commands::Doctor { verbose, json } => doctor::run(verbose, json),
        Commands::Demo { command } => demo::run(command),
        Commands::Logs { command } => logs::run(command),
    }
}
