//! `acme logs` - inspect and prune the JSON lines event log

use anyhow::Result;
use chrono::{Duration, TimeZone, Utc};
use clap::Subcommand;
use colored::Colorize;
use dialoguer::Confirm;
use serde::Serialize;

use super::get_data_dir;
use crate::output;
use acmebank_core::services::{EntryPoint, LogEntry, LoggingService};

#[derive(Subcommand)]
pub enum LogsCommands {
    /// Show the newest log entries
    List {
        /// How many entries to show
        #[arg(short, long, default_value = "50")]
        limit: usize,
        /// Only entries that carry an error
        #[arg(long)]
        errors: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Remove entries older than a number of days
    Clear {
        #[arg(long, default_value = "30")]
        older_than_days: i64,
        /// Do not ask for confirmation
        #[arg(long, short = 'f')]
        force: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Entry counts and where the log lives
    Stats {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LogStats {
    entries: u64,
    errors: usize,
    path: String,
    size_bytes: u64,
}

pub fn run(command: LogsCommands) -> Result<()> {
    let data_dir = get_data_dir()?;
    let log = LoggingService::new(&data_dir, EntryPoint::Cli, env!("CARGO_PKG_VERSION"))?;

    match command {
        LogsCommands::List { limit, errors, json } => list(&log, limit, errors, json),
        LogsCommands::Clear {
            older_than_days,
            force,
            json,
        } => clear(&log, older_than_days, force, json),
        LogsCommands::Stats { json } => stats(&log, json),
    }
}

fn list(log: &LoggingService, limit: usize, errors_only: bool, json: bool) -> Result<()> {
    let entries = if errors_only {
        log.get_errors(limit)?
    } else {
        log.get_recent(limit)?
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }
    if entries.is_empty() {
        println!("The log is empty.");
        return Ok(());
    }

    let mut table = output::create_table();
    table.set_header(vec!["Time (UTC)", "Event", "Command", "Error"]);
    for entry in &entries {
        table.add_row(vec![
            timestamp(entry),
            entry.event.clone(),
            entry.command.clone().unwrap_or_default(),
            entry.error_message.clone().unwrap_or_default(),
        ]);
    }
    println!("{}", table);

    let failures = entries.iter().filter(|e| e.error_message.is_some()).count();
    if failures > 0 && !errors_only {
        println!();
        println!(
            "{} of {} entries are failures. Use {} to list only those.",
            failures.to_string().red(),
            entries.len(),
            "acme logs list --errors".bold()
        );
    }
    Ok(())
}

fn clear(log: &LoggingService, days: i64, force: bool, json: bool) -> Result<()> {
    if !force && !json {
        let confirmed = Confirm::new()
            .with_prompt(format!("Remove log entries older than {} days?", days))
            .default(false)
            .interact()?;
        if !confirmed {
            println!("Nothing removed.");
            return Ok(());
        }
    }

    let cutoff = Utc::now() - Duration::days(days);
    let removed = log.delete_before(cutoff.timestamp_millis())?;

    if json {
        println!("{}", serde_json::json!({ "removed": removed }));
    } else {
        output::success(&format!("Removed {} log entries", removed));
    }
    Ok(())
}

fn stats(log: &LoggingService, json: bool) -> Result<()> {
    let stats = LogStats {
        entries: log.count()?,
        errors: log.get_errors(usize::MAX)?.len(),
        path: log.path().display().to_string(),
        size_bytes: std::fs::metadata(log.path()).map_or(0, |m| m.len()),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }

    let mut table = output::create_table();
    table.add_row(vec!["Entries".to_string(), stats.entries.to_string()]);
    table.add_row(vec!["Failures".to_string(), stats.errors.to_string()]);
    table.add_row(vec!["File".to_string(), stats.path]);
    table.add_row(vec!["Size".to_string(), format!("{} bytes", stats.size_bytes)]);
    println!("{}", table);
    Ok(())
}

fn timestamp(entry: &LogEntry) -> String {
    Utc.timestamp_millis_opt(entry.timestamp)
        .single()
        .map_or_else(
            || entry.timestamp.to_string(),
            |at| at.format("%Y-%m-%d %H:%M:%S").to_string(),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timestamp_formatting() {
        let entry: LogEntry = serde_json::from_value(serde_json::json!({
            "id": 1,
            "timestamp": 1_714_658_591_000i64,
            "entryPoint": "cli",
            "appVersion": "0.1.0",
            "platform": "linux",
            "event": "command_executed"
        }))
        .unwrap();
        assert_eq!(timestamp(&entry), "2024-05-02 14:03:11");
    }
}
