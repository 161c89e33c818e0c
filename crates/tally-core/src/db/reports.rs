//! Period-windowed expense reports
//!
//! Reports return every matching row joined with its category and currency
//! names. Callers aggregate; nothing is summed in SQL.

use chrono::NaiveDate;
use rusqlite::{Connection, ToSql};
use tracing::debug;

use super::expenses::parse_amount;
use super::Database;
use crate::error::Result;
use crate::models::{ExpenseRow, LedgerCounts, ReportFilter};
use crate::period::{self, DateWindow, PeriodSpec};

/// Date predicate applied to `e.created_at`
enum DateMatch {
    /// `created_at BETWEEN start AND end`
    Window(DateWindow),
    /// `created_at = day`
    Exact(NaiveDate),
}

impl Database {
    /// Expenses in a period, optionally limited to one category
    pub fn query(&self, period: PeriodSpec, category: Option<&str>) -> Result<Vec<ExpenseRow>> {
        let filter = ReportFilter {
            category: category.map(str::to_string),
            user_id: None,
        };
        self.query_report(period, &filter)
    }

    /// Expenses in a period matching `filter`.
    ///
    /// The period is resolved against the current date on every call.
    pub fn query_report(&self, period: PeriodSpec, filter: &ReportFilter) -> Result<Vec<ExpenseRow>> {
        let window = period::resolve(period)?;
        debug!(parent: self.span(), %period, %window, "Resolved report period");
        self.query_window(window, filter)
    }

    /// Expenses with `created_at` inside a closed date window
    pub fn query_window(&self, window: DateWindow, filter: &ReportFilter) -> Result<Vec<ExpenseRow>> {
        self.with_conn(|conn| select_rows(conn, DateMatch::Window(window), filter))
    }

    /// Expenses recorded on exactly `day` (date equality, no window)
    pub fn get_expenses_by_specific_day(
        &self,
        day: NaiveDate,
        filter: &ReportFilter,
    ) -> Result<Vec<ExpenseRow>> {
        self.with_conn(|conn| select_rows(conn, DateMatch::Exact(day), filter))
    }

    /// Row counts for every ledger table
    pub fn counts(&self) -> Result<LedgerCounts> {
        self.with_conn(|conn| {
            let count = |table: &str| -> rusqlite::Result<i64> {
                conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| {
                    row.get(0)
                })
            };
            Ok(LedgerCounts {
                users: count("users")?,
                categories: count("categories")?,
                currencies: count("currencies")?,
                expenses: count("expenses")?,
            })
        })
    }
}

fn select_rows(conn: &Connection, date: DateMatch, filter: &ReportFilter) -> Result<Vec<ExpenseRow>> {
    let mut conditions = Vec::new();
    let mut query_params: Vec<Box<dyn ToSql>> = Vec::new();

    match date {
        DateMatch::Window(window) => {
            conditions.push("e.created_at BETWEEN ? AND ?");
            query_params.push(Box::new(window.start));
            query_params.push(Box::new(window.end));
        }
        DateMatch::Exact(day) => {
            conditions.push("e.created_at = ?");
            query_params.push(Box::new(day));
        }
    }

    if let Some(category) = &filter.category {
        conditions.push("ca.name = ?");
        query_params.push(Box::new(category.trim().to_string()));
    }

    if let Some(user_id) = filter.user_id {
        conditions.push("e.user_id = ?");
        query_params.push(Box::new(user_id));
    }

    let sql = format!(
        r#"
        SELECT e.amount, cu.name, ca.name, e.created_at
        FROM expenses e
        JOIN categories ca ON ca.id = e.category_id
        JOIN currencies cu ON cu.id = e.currency_id
        WHERE {}
        ORDER BY e.created_at, e.id
        "#,
        conditions.join(" AND ")
    );

    let param_refs: Vec<&dyn ToSql> = query_params.iter().map(|p| p.as_ref()).collect();
    let mut stmt = conn.prepare(&sql)?;
    let raw = stmt
        .query_map(param_refs.as_slice(), |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, NaiveDate>(3)?,
            ))
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    raw.into_iter()
        .map(|(amount, currency, category, created_at)| {
            Ok(ExpenseRow {
                amount: parse_amount(&amount)?,
                currency,
                category,
                created_at,
            })
        })
        .collect()
}
