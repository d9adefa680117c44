//! Statement command - monthly statement with optional CSV export

use std::fs::File;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Utc;
use colored::Colorize;

use super::{login, AuthArgs};
use crate::output;
use acmebank_core::services::views::year_month;

pub fn run(
    auth: AuthArgs,
    year: Option<i32>,
    month: Option<u32>,
    csv: Option<PathBuf>,
    json: bool,
) -> Result<()> {
    let (ctx, session) = login(auth)?;
    let (current_year, current_month) = year_month(Utc::now());
    let year = year.unwrap_or(current_year);
    let month = month.unwrap_or(current_month);

    let statement = ctx
        .statement_service
        .statement(&session.account_number, year, month)?;

    if let Some(path) = &csv {
        let file = File::create(path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        ctx.statement_service.write_csv(&statement, file)?;
        if !json {
            output::success(&format!("Statement written to {}", path.display()));
        }
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&statement)?);
        return Ok(());
    }
    if csv.is_some() {
        return Ok(());
    }

    println!(
        "{}",
        format!(
            "Statement {:04}-{:02} - account {}",
            year, month, statement.account_number
        )
        .bold()
    );
    println!();

    if statement.lines.is_empty() {
        println!("No transactions in this period.");
    } else {
        println!(
            "{}",
            output::transactions_table(&statement.lines, &ctx.config.currency)
        );
    }

    let mut table = output::create_table();
    table.add_row(vec![
        "Opening balance".to_string(),
        ctx.format_amount(statement.opening_balance),
    ]);
    table.add_row(vec!["Credits".to_string(), ctx.format_amount(statement.totals.credits)]);
    table.add_row(vec!["Debits".to_string(), ctx.format_amount(statement.totals.debits)]);
    table.add_row(vec![
        "Closing balance".to_string(),
        ctx.format_amount(statement.closing_balance),
    ]);
    println!("{}", table);
    Ok(())
}
