//! Account commands - dashboard summary, transaction history and certificate

use std::path::PathBuf;

use anyhow::Result;
use colored::Colorize;
use serde::Serialize;

use super::{login, AuthArgs};
use crate::output;
use acmebank_core::Transaction;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Summary {
    holder: String,
    account_number: String,
    account_type: String,
    balance: i64,
    recent_transactions: Vec<Transaction>,
}

/// Show the dashboard: balance and latest movements
pub fn run_summary(auth: AuthArgs, json: bool) -> Result<()> {
    let (ctx, session) = login(auth)?;
    let (account, recent) = ctx
        .ledger_service
        .account_overview(&session.account_number, ctx.config.recent_limit)?;

    if json {
        let summary = Summary {
            holder: session.user.full_name(),
            account_number: account.account_number.clone(),
            account_type: account.type_label().to_string(),
            balance: account.balance,
            recent_transactions: recent,
        };
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!("{}", format!("Welcome, {}", session.user.full_name()).bold());
    println!();

    let mut table = output::create_table();
    table.add_row(vec!["Account", account.account_number.as_str()]);
    table.add_row(vec!["Type", account.type_label()]);
    table.add_row(vec!["Balance", ctx.format_amount(account.balance).as_str()]);
    println!("{}", table);
    println!();

    if recent.is_empty() {
        println!("No transactions yet.");
    } else {
        println!("{}", "Recent Transactions".bold());
        println!("{}", output::transactions_table(&recent, &ctx.config.currency));
    }
    Ok(())
}

/// List transactions, newest first
pub fn run_transactions(auth: AuthArgs, limit: Option<usize>, json: bool) -> Result<()> {
    let (ctx, session) = login(auth)?;
    let transactions = match limit {
        Some(n) => ctx.ledger_service.recent_transactions(&session.account_number, n)?,
        None => ctx
            .ledger_service
            .recent_transactions(&session.account_number, usize::MAX)?,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&transactions)?);
        return Ok(());
    }

    if transactions.is_empty() {
        println!("No transactions found.");
        return Ok(());
    }
    println!("{}", output::transactions_table(&transactions, &ctx.config.currency));
    println!("{} transaction(s)", transactions.len());
    Ok(())
}

/// Print or save the account certificate
pub fn run_certificate(auth: AuthArgs, output_path: Option<PathBuf>, json: bool) -> Result<()> {
    let (ctx, session) = login(auth)?;
    let certificate = ctx.certificate_service.generate(&session)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&certificate)?);
        return Ok(());
    }

    match output_path {
        Some(path) => {
            std::fs::write(&path, format!("{}\n", certificate))?;
            output::success(&format!("Certificate saved to {}", path.display()));
        }
        None => println!("{}", certificate),
    }
    Ok(())
}
