//! Output formatting utilities

use colored::Colorize;
use comfy_table::{presets::UTF8_FULL_CONDENSED, Cell, CellAlignment, ContentArrangement, Table};

use acmebank_core::{format_currency, Transaction};

/// Print a success message
pub fn success(msg: &str) {
    println!("{}", msg.green());
}

/// Print an error message
pub fn error(msg: &str) {
    eprintln!("{}", msg.red());
}

/// Print a warning message
pub fn warning(msg: &str) {
    println!("{}", msg.yellow());
}

/// Print an info message
pub fn info(msg: &str) {
    println!("{}", msg.cyan());
}

/// Create a styled table
pub fn create_table() -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table
}

/// Table of transactions with signed amounts and running balance
pub fn transactions_table(transactions: &[Transaction], currency: &str) -> Table {
    let mut table = create_table();
    table.set_header(vec!["Date", "Reference", "Type", "Description", "Amount", "Balance"]);
    for tx in transactions {
        let amount = format_currency(tx.signed_amount(), currency);
        let amount_cell = if tx.kind.is_debit() {
            Cell::new(amount).fg(comfy_table::Color::Red)
        } else {
            Cell::new(amount).fg(comfy_table::Color::Green)
        };
        table.add_row(vec![
            Cell::new(tx.date.format("%Y-%m-%d %H:%M").to_string()),
            Cell::new(&tx.reference),
            Cell::new(tx.kind.as_str()),
            Cell::new(&tx.description),
            amount_cell.set_alignment(CellAlignment::Right),
            Cell::new(format_currency(tx.balance_after, currency))
                .set_alignment(CellAlignment::Right),
        ]);
    }
    table
}

/// Print a single completed transaction
pub fn transaction_receipt(tx: &Transaction, currency: &str) {
    success(&format!(
        "{} completed: {}",
        capitalize(tx.kind.as_str()),
        format_currency(tx.amount, currency)
    ));
    println!("  Reference: {}", tx.reference);
    println!("  New balance: {}", format_currency(tx.balance_after, currency).bold());
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
