//! Core command implementations and shared utilities
//!
//! This module contains:
//! - `load_config` - Build the ledger config from env and `--db`
//! - `open_ledger` - Shared utility to open the ledger
//! - `cmd_init` - Initialize the database
//! - `cmd_status` - Show counts and pool occupancy

use std::path::Path;

use anyhow::{Context, Result};
use tally_core::{Ledger, LedgerConfig, Telemetry};

const DATABASE_NAME_VAR: &str = "TALLY_DATABASE_NAME";

/// Read `TALLY_*` configuration, letting `--db` stand in for the database name
pub fn load_config(db_override: Option<&Path>) -> Result<LedgerConfig> {
    let config = match db_override {
        Some(path) => {
            let path = path.to_string_lossy().into_owned();
            LedgerConfig::from_lookup(|key| {
                if key == DATABASE_NAME_VAR {
                    Some(path.clone())
                } else {
                    std::env::var(key).ok()
                }
            })
        }
        None => LedgerConfig::from_env(),
    };
    config.with_context(|| format!("Invalid configuration (set {} or pass --db)", DATABASE_NAME_VAR))
}

/// Open the connection pool and ensure the schema
pub async fn open_ledger(config: LedgerConfig, telemetry: Telemetry) -> Result<Ledger> {
    let path = config.database_name.clone();
    Ledger::connect(config, telemetry)
        .await
        .with_context(|| format!("Failed to open database at {}", path.display()))
}

pub fn cmd_init(ledger: &Ledger) -> Result<()> {
    let db = ledger.database();
    println!("🔧 Initializing database at {}...", db.path().display());

    db.ensure_schema().context("Failed to create schema")?;
    let version = db.schema_version()?;
    println!("   Schema version {}", version);

    println!("✅ Database initialized successfully!");
    println!();
    println!("Next steps:");
    println!("  1. Add a user: tally user add --identity 42");
    println!("  2. Record an expense: tally record 100 RUB food --user 42");
    println!("  3. See the week: tally report --period week");

    Ok(())
}

pub fn cmd_status(ledger: &Ledger) -> Result<()> {
    let db = ledger.database();
    let counts = db.counts()?;
    let pool = ledger.pool_status();

    println!();
    println!("📋 Ledger Status");
    println!("   Database: {}", db.path().display());
    println!("   Schema version: {}", db.schema_version()?);
    println!("   ─────────────────────────────");
    println!("   Users:       {:>8}", counts.users);
    println!("   Categories:  {:>8}", counts.categories);
    println!("   Currencies:  {:>8}", counts.currencies);
    println!("   Expenses:    {:>8}", counts.expenses);
    println!("   ─────────────────────────────");
    println!(
        "   Pool: {} open, {} idle, {} checked out (max {})",
        pool.connections, pool.idle, pool.checked_out, pool.max_size
    );

    Ok(())
}
