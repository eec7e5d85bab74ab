// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::path::PathBuf;

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use tally_core::TransactionType;

/// Parse a transaction type (income or expense, any case).
fn parse_type(s: &str) -> Result<TransactionType, String> {
    s.parse().map_err(|_| "expected 'income' or 'expense'".to_string())
}

/// Parse a non-negative amount.
fn parse_amount(s: &str) -> Result<f64, String> {
    let amount: f64 = s.trim().parse().map_err(|_| format!("invalid amount '{s}'"))?;
    if !amount.is_finite() || amount < 0.0 {
        return Err("amount must be a non-negative number".to_string());
    }
    Ok(amount)
}

/// Parse a date as `YYYY-MM-DD` (midnight UTC) or RFC 3339.
pub fn parse_date(s: &str) -> Result<DateTime<Utc>, String> {
    let s = s.trim();
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Ok(Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN)));
    }
    DateTime::parse_from_rfc3339(s)
        .map(|d| d.with_timezone(&Utc))
        .map_err(|_| format!("invalid date '{s}': expected YYYY-MM-DD or RFC 3339"))
}

/// Parse an inclusive upper bound. A bare date covers the whole day.
pub fn parse_end_date(s: &str) -> Result<DateTime<Utc>, String> {
    let start = parse_date(s)?;
    if NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").is_ok() {
        Ok(start + Duration::days(1) - Duration::milliseconds(1))
    } else {
        Ok(start)
    }
}

/// Output format for commands supporting structured output.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Id,
}

#[derive(Parser)]
#[command(name = "tally")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "A local-first personal finance tracker with optional remote sync")]
pub struct Cli {
    /// Config file (default: platform config dir, or $TALLY_CONFIG)
    #[arg(long, global = true, value_name = "path")]
    pub config: Option<PathBuf>,

    /// Directory holding the database (default: platform data dir, or $TALLY_DATA_DIR)
    #[arg(long, global = true, value_name = "path")]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Record a transaction
    Add {
        /// income or expense
        #[arg(value_parser = parse_type)]
        kind: TransactionType,

        /// Amount (non-negative; the sign comes from the type)
        #[arg(value_parser = parse_amount)]
        amount: f64,

        /// Description
        #[arg(default_value = "")]
        description: String,

        /// Date (YYYY-MM-DD or RFC 3339, default: now)
        #[arg(long, short, value_parser = parse_date)]
        date: Option<DateTime<Utc>>,

        /// Category id
        #[arg(long, short)]
        category: Option<i64>,

        #[arg(long, short, value_enum, default_value_t)]
        output: OutputFormat,
    },

    /// List transactions, newest first
    List {
        #[arg(long = "type", short = 't', value_parser = parse_type)]
        kind: Option<TransactionType>,

        /// Category id
        #[arg(long, short)]
        category: Option<i64>,

        /// Earliest date (inclusive)
        #[arg(long, value_parser = parse_date)]
        from: Option<DateTime<Utc>>,

        /// Latest date (inclusive)
        #[arg(long, value_parser = parse_end_date)]
        to: Option<DateTime<Utc>>,

        #[arg(long, short, value_enum, default_value_t)]
        output: OutputFormat,
    },

    /// Show one transaction
    Show {
        id: i64,

        #[arg(long, short, value_enum, default_value_t)]
        output: OutputFormat,
    },

    /// Change fields of a transaction
    Edit {
        id: i64,

        #[arg(long = "type", short = 't', value_parser = parse_type)]
        kind: Option<TransactionType>,

        #[arg(long, short, value_parser = parse_amount)]
        amount: Option<f64>,

        #[arg(long)]
        description: Option<String>,

        #[arg(long, short, value_parser = parse_date)]
        date: Option<DateTime<Utc>>,

        /// Category id
        #[arg(long, short, conflicts_with = "no_category")]
        category: Option<i64>,

        /// Remove the category
        #[arg(long)]
        no_category: bool,
    },

    /// Delete a transaction
    Rm { id: i64 },

    /// Manage categories
    Category {
        #[command(subcommand)]
        command: CategoryCommand,
    },

    /// Run one sync pass against the remote
    Sync,

    /// Show sync configuration and queue state
    Status,

    /// Keep syncing in the foreground until interrupted
    Daemon {
        /// Seconds between reachability checks
        #[arg(long, default_value_t = 30, value_parser = clap::value_parser!(u64).range(1..))]
        probe_interval: u64,
    },
}

#[derive(Subcommand)]
pub enum CategoryCommand {
    /// Create a category
    Add {
        name: String,

        #[arg(long = "type", short = 't', value_parser = parse_type)]
        kind: TransactionType,
    },

    /// List categories
    List {
        #[arg(long, short, value_enum, default_value_t)]
        output: OutputFormat,
    },

    /// Delete a category; its transactions become uncategorized
    Rm { id: i64 },
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
