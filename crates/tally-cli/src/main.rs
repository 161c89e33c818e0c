//! Tally CLI - Personal expense ledger
//!
//! Usage:
//!   tally init                              Initialize database
//!   tally user add --identity 42            Onboard a user
//!   tally record 100 RUB food --user 42     Record an expense
//!   tally report --period week              Show this week's expenses

mod cli;
mod commands;


use anyhow::Result;
use clap::Parser;
use tally_core::logging;

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let telemetry = logging::init(cli.verbose)?;

    let config = commands::load_config(cli.db.as_deref())?;
    let ledger = commands::open_ledger(config, telemetry.clone()).await?;

    let result = match cli.command {
        Commands::Init => commands::cmd_init(&ledger),
        Commands::Status => commands::cmd_status(&ledger),
        Commands::User { action } => match action {
            UserAction::Add {
                identity,
                name,
                last_name,
                email,
            } => commands::cmd_user_add(&ledger, identity, name, last_name, email).await,
            UserAction::Show { identity } => commands::cmd_user_show(&ledger, identity),
        },
        Commands::Record {
            amount,
            currency,
            category,
            user,
            date,
        } => {
            commands::cmd_record(&ledger, &amount, &currency, &category, user, date.as_deref())
                .await
        }
        Commands::Report {
            period,
            day,
            category,
            user,
            json,
        } => {
            let query = commands::ReportQuery::parse(&period, day.as_deref(), category, user)?;
            commands::cmd_report(&ledger, &query, json).await
        }
        Commands::Categories => commands::cmd_categories(&ledger),
        Commands::Currencies => commands::cmd_currencies(&ledger),
    };

    telemetry.shutdown();
    result
}
