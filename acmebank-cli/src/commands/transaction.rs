//! Transaction commands - deposit, withdraw and pay services

use anyhow::Result;

use super::{get_logger, log_event, login, AuthArgs};
use crate::output;
use acmebank_core::services::LogEvent;
use acmebank_core::Transaction;

/// What a transaction command does to the session's account
pub enum Operation {
    Deposit,
    Withdraw,
    Pay { service: String },
}

impl Operation {
    fn command(&self) -> &'static str {
        match self {
            Operation::Deposit => "deposit",
            Operation::Withdraw => "withdraw",
            Operation::Pay { .. } => "pay",
        }
    }
}

pub fn run(auth: AuthArgs, operation: Operation, amount: i64, json: bool) -> Result<()> {
    let (ctx, session) = login(auth)?;
    let ledger = &ctx.ledger_service;
    let account = session.account_number.as_str();

    let transaction: Transaction = match &operation {
        Operation::Deposit => ledger.deposit(account, amount)?,
        Operation::Withdraw => ledger.withdraw(account, amount)?,
        Operation::Pay { service } => ledger.pay_service(account, amount, service)?,
    };

    let logger = get_logger();
    log_event(
        &logger,
        LogEvent::new("transaction_completed").with_command(operation.command()),
    );

    if json {
        println!("{}", serde_json::to_string_pretty(&transaction)?);
    } else {
        output::transaction_receipt(&transaction, &ctx.config.currency);
    }
    Ok(())
}
