//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Tally - Personal expense ledger
#[derive(Parser)]
#[command(name = "tally")]
#[command(about = "Record expenses and report them by period", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Database path (overrides TALLY_DATABASE_NAME)
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database
    Init,

    /// Show table counts and pool occupancy
    Status,

    /// Manage users
    User {
        #[command(subcommand)]
        action: UserAction,
    },

    /// Record an expense, e.g. `tally record 100 RUB food --user 42`
    Record {
        /// Amount (non-negative decimal)
        amount: String,

        /// Currency name (created on first use)
        currency: String,

        /// Category name (created on first use)
        category: String,

        /// External identity of the user
        #[arg(short, long)]
        user: i64,

        /// Date of the expense (YYYY-MM-DD), defaults to today
        #[arg(long)]
        date: Option<String>,
    },

    /// Show expenses for a period
    Report {
        /// Period: today, week, month-to-date, month, year, YYYY-MM-DD, YYYY-MM,
        /// or a month name such as "october 2022"
        #[arg(short, long, default_value = "week")]
        period: String,

        /// Exact date (YYYY-MM-DD); overrides --period
        #[arg(long)]
        day: Option<String>,

        /// Only expenses in this category
        #[arg(short, long)]
        category: Option<String>,

        /// Only expenses of this user (external identity)
        #[arg(short, long)]
        user: Option<i64>,

        /// Output rows as JSON
        #[arg(long)]
        json: bool,
    },

    /// List categories
    Categories,

    /// List currencies
    Currencies,
}

#[derive(Subcommand)]
pub enum UserAction {
    /// Onboard a user
    Add {
        /// External identity (messenger user id)
        #[arg(long)]
        identity: i64,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        last_name: Option<String>,

        #[arg(long)]
        email: Option<String>,
    },

    /// Show a user by external identity
    Show {
        identity: i64,
    },
}
