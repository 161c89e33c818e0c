//! Report command implementations

use std::fmt::Write as _;

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use tally_core::{period, totals_by_currency, ExpenseRow, Ledger, PeriodSpec, ReportFilter};
use tracing::debug;

use super::truncate;

/// What a report covers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportTarget {
    /// A resolved-at-query-time window
    Period(PeriodSpec),
    /// Exact date match
    Day(NaiveDate),
}

/// Parsed `tally report` arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportQuery {
    pub target: ReportTarget,
    pub category: Option<String>,
    /// External identity, resolved when the report runs
    pub user: Option<i64>,
}

impl ReportQuery {
    /// `day` takes precedence over `period`
    pub fn parse(
        period: &str,
        day: Option<&str>,
        category: Option<String>,
        user: Option<i64>,
    ) -> Result<Self> {
        let target = match day {
            Some(raw) => ReportTarget::Day(
                NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                    .context("Invalid --day format (use YYYY-MM-DD)")?,
            ),
            None => ReportTarget::Period(
                PeriodSpec::parse_at(period, period::today()).context("Invalid --period")?,
            ),
        };

        Ok(Self {
            target,
            category: category.filter(|c| !c.trim().is_empty()),
            user,
        })
    }

    fn title(&self) -> String {
        match &self.target {
            ReportTarget::Period(spec) => match period::resolve(*spec) {
                Ok(window) => format!("{} ({})", spec, window),
                Err(_) => spec.to_string(),
            },
            ReportTarget::Day(day) => day.to_string(),
        }
    }
}

pub async fn cmd_report(ledger: &Ledger, query: &ReportQuery, json: bool) -> Result<()> {
    let mut filter = ReportFilter {
        category: query.category.clone(),
        user_id: None,
    };

    if let Some(identity) = query.user {
        let Some(user_id) = ledger.resolve_user_id(identity).await? else {
            bail!("No user with identity {}", identity);
        };
        filter = filter.for_user(user_id);
    }

    let rows = match &query.target {
        ReportTarget::Period(spec) => ledger.get_filtered_report(*spec, filter).await,
        ReportTarget::Day(day) => ledger.get_expenses_by_specific_day(*day, filter).await,
    }
    .context("Failed to query expenses")?;
    debug!(rows = rows.len(), target = ?query.target, "Report query complete");

    if json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    println!();
    println!("📊 Expenses: {}", query.title());
    if let Some(category) = &query.category {
        println!("   Category: {}", category);
    }
    print!("{}", render_report(&rows)?);

    Ok(())
}

/// Render report rows as a table followed by per-currency totals
pub fn render_report(rows: &[ExpenseRow]) -> Result<String> {
    let mut out = String::new();

    if rows.is_empty() {
        out.push_str("   No expenses in this period.\n");
        return Ok(out);
    }

    let totals = totals_by_currency(rows).context("Failed to total expenses")?;

    let _ = writeln!(out, "{:<12} {:<20} {:>14} {:<8}", "Date", "Category", "Amount", "Currency");
    let _ = writeln!(out, "{}", "-".repeat(57));
    for row in rows {
        let _ = writeln!(
            out,
            "{:<12} {:<20} {:>14} {:<8}",
            row.created_at.format("%Y-%m-%d"),
            truncate(&row.category, 20),
            row.amount,
            truncate(&row.currency, 8)
        );
    }
    let _ = writeln!(out, "{}", "-".repeat(57));

    for (currency, total) in totals {
        let _ = writeln!(out, "{:<33} {:>14} {:<8}", "Total", total, truncate(&currency, 8));
    }

    Ok(out)
}
