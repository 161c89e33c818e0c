//! Expense recording command

use std::str::FromStr;

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use tally_core::{Error, Ledger};
use tracing::debug;

/// Parse a user-supplied amount
pub fn parse_amount(raw: &str) -> Result<Decimal> {
    let amount = Decimal::from_str(raw.trim())
        .with_context(|| format!("Invalid amount '{}' (expected a decimal number)", raw))?;
    if amount.is_sign_negative() && !amount.is_zero() {
        bail!("Amount must not be negative: {}", raw);
    }
    Ok(amount)
}

pub async fn cmd_record(
    ledger: &Ledger,
    amount: &str,
    currency: &str,
    category: &str,
    identity: i64,
    date: Option<&str>,
) -> Result<()> {
    let amount = parse_amount(amount)?;
    debug!(identity, %amount, currency, category, ?date, "Recording expense");

    let result = match date {
        None => ledger.record_expense(amount, currency, category, identity).await,
        Some(raw) => {
            let day = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .context("Invalid --date format (use YYYY-MM-DD)")?;
            ledger
                .record_expense_on(amount, currency, category, identity, day)
                .await
        }
    };

    match result {
        Ok(id) => {
            println!(
                "✓ Recorded {} {} for {} (expense {})",
                amount,
                currency.trim(),
                category.trim(),
                id
            );
            Ok(())
        }
        Err(Error::UnknownUser(identity)) => {
            bail!(
                "No user with identity {}. Add one with: tally user add --identity {}",
                identity,
                identity
            )
        }
        Err(e) => Err(e).context("Failed to record expense"),
    }
}
