//! Expense inserts

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rusqlite::{params, Connection, OptionalExtension};
use tracing::info;

use super::dimensions::{self, Dimension};
use super::{users, write_error, Database};
use crate::error::{Error, Result};
use crate::models::Expense;

impl Database {
    /// Insert an expense dated today (by the storage clock).
    ///
    /// Fails with `InvalidAmount` for negative amounts and with
    /// `ForeignKeyViolation` if any referenced row is missing; nothing is
    /// written in either case.
    pub fn insert_expense(
        &self,
        amount: Decimal,
        currency_id: i64,
        category_id: i64,
        user_id: i64,
    ) -> Result<i64> {
        self.insert_expense_inner(amount, currency_id, category_id, user_id, None)
    }

    /// Insert an expense with an explicit date
    pub fn insert_expense_on(
        &self,
        amount: Decimal,
        currency_id: i64,
        category_id: i64,
        user_id: i64,
        created_at: NaiveDate,
    ) -> Result<i64> {
        self.insert_expense_inner(amount, currency_id, category_id, user_id, Some(created_at))
    }

    fn insert_expense_inner(
        &self,
        amount: Decimal,
        currency_id: i64,
        category_id: i64,
        user_id: i64,
        created_at: Option<NaiveDate>,
    ) -> Result<i64> {
        let id = self.with_transaction(|tx| {
            insert_expense(tx, amount, currency_id, category_id, user_id, created_at)
        })?;
        info!(parent: self.span(), expense_id = id, user_id, "Recorded expense");
        Ok(id)
    }

    /// Record an expense from names and an external identity.
    ///
    /// Resolves the user, looks up or creates the currency and category, and
    /// inserts the expense, all in one transaction on one connection. Fails
    /// with `UnknownUser` if the identity was never onboarded.
    pub fn record_expense(
        &self,
        amount: Decimal,
        currency: &str,
        category: &str,
        external_identity: i64,
    ) -> Result<i64> {
        self.record_expense_inner(amount, currency, category, external_identity, None)
    }

    /// Record an expense by names with an explicit date, in one transaction
    pub fn record_expense_on(
        &self,
        amount: Decimal,
        currency: &str,
        category: &str,
        external_identity: i64,
        created_at: NaiveDate,
    ) -> Result<i64> {
        self.record_expense_inner(amount, currency, category, external_identity, Some(created_at))
    }

    fn record_expense_inner(
        &self,
        amount: Decimal,
        currency: &str,
        category: &str,
        external_identity: i64,
        created_at: Option<NaiveDate>,
    ) -> Result<i64> {
        let amount = validate_amount(amount)?;
        let id = self.with_transaction(|tx| {
            let user_id = users::resolve_user_id(tx, external_identity)?
                .ok_or(Error::UnknownUser(external_identity))?;
            let currency_id = dimensions::lookup_or_insert(tx, Dimension::Currency, currency)?;
            let category_id = dimensions::lookup_or_insert(tx, Dimension::Category, category)?;
            insert_expense(tx, amount, currency_id, category_id, user_id, created_at)
        })?;
        info!(parent: self.span(), expense_id = id, ?created_at, "Recorded expense by name");
        Ok(id)
    }

    /// Get a stored expense by id
    pub fn get_expense(&self, id: i64) -> Result<Option<Expense>> {
        self.with_conn(|conn| {
            let row = conn
                .query_row(
                    "SELECT id, amount, currency_id, category_id, user_id, created_at
                     FROM expenses WHERE id = ?",
                    params![id],
                    |row| {
                        let amount: String = row.get(1)?;
                        Ok((
                            row.get::<_, i64>(0)?,
                            amount,
                            row.get::<_, i64>(2)?,
                            row.get::<_, i64>(3)?,
                            row.get::<_, i64>(4)?,
                            row.get::<_, NaiveDate>(5)?,
                        ))
                    },
                )
                .optional()?;

            row.map(
                |(id, amount, currency_id, category_id, user_id, created_at)| {
                    Ok(Expense {
                        id,
                        amount: parse_amount(&amount)?,
                        currency_id,
                        category_id,
                        user_id,
                        created_at,
                    })
                },
            )
            .transpose()
        })
    }
}

/// Reject negative amounts. `-0` is treated as zero.
pub(crate) fn validate_amount(amount: Decimal) -> Result<Decimal> {
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(Error::InvalidAmount(amount.to_string()));
    }
    Ok(amount.abs())
}

/// Parse an amount read back from the `expenses.amount` column
pub(crate) fn parse_amount(raw: &str) -> Result<Decimal> {
    raw.parse::<Decimal>()
        .map_err(|e| Error::InvalidAmount(format!("stored amount '{}' is unreadable: {}", raw, e)))
}

pub(crate) fn insert_expense(
    conn: &Connection,
    amount: Decimal,
    currency_id: i64,
    category_id: i64,
    user_id: i64,
    created_at: Option<NaiveDate>,
) -> Result<i64> {
    let amount = validate_amount(amount)?;

    match created_at {
        Some(date) => conn.execute(
            "INSERT INTO expenses (amount, currency_id, category_id, user_id, created_at)
             VALUES (?, ?, ?, ?, ?)",
            params![amount.to_string(), currency_id, category_id, user_id, date],
        ),
        None => conn.execute(
            "INSERT INTO expenses (amount, currency_id, category_id, user_id)
             VALUES (?, ?, ?, ?)",
            params![amount.to_string(), currency_id, category_id, user_id],
        ),
    }
    .map_err(write_error)?;

    Ok(conn.last_insert_rowid())
}
