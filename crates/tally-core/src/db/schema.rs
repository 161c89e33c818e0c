//! Schema creation and SQL period functions

use rusqlite::functions::{Context, FunctionFlags};
use rusqlite::Connection;
use tracing::info;

use super::Database;
use crate::error::{Error, Result};
use crate::period;

/// Value written to `PRAGMA user_version` once the schema is in place
pub const SCHEMA_VERSION: i64 = 1;

const SCHEMA: &str = r#"
    -- WAL mode: readers don't block the single writer
    PRAGMA journal_mode = WAL;

    -- Users (one row per onboarded messenger account)
    CREATE TABLE IF NOT EXISTS users (
        id INTEGER PRIMARY KEY,
        name TEXT,
        last_name TEXT,
        email TEXT,
        external_identity INTEGER NOT NULL UNIQUE,
        created_at DATETIME DEFAULT CURRENT_TIMESTAMP
    );

    -- Dimension tables. Names are lookup keys, so they are unique.
    CREATE TABLE IF NOT EXISTS categories (
        id INTEGER PRIMARY KEY,
        name TEXT NOT NULL UNIQUE COLLATE NOCASE
    );

    CREATE TABLE IF NOT EXISTS currencies (
        id INTEGER PRIMARY KEY,
        name TEXT NOT NULL UNIQUE COLLATE NOCASE
    );

    -- Expenses. Amount is canonical decimal text, never REAL.
    CREATE TABLE IF NOT EXISTS expenses (
        id INTEGER PRIMARY KEY,
        amount TEXT NOT NULL CHECK (typeof(amount) = 'text' AND amount NOT LIKE '-%'),
        currency_id INTEGER NOT NULL REFERENCES currencies(id) ON DELETE RESTRICT,
        category_id INTEGER NOT NULL REFERENCES categories(id) ON DELETE RESTRICT,
        user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE RESTRICT,
        created_at DATE NOT NULL DEFAULT CURRENT_DATE
    );

    CREATE INDEX IF NOT EXISTS idx_expenses_created_at ON expenses(created_at);
    CREATE INDEX IF NOT EXISTS idx_expenses_user ON expenses(user_id);
    CREATE INDEX IF NOT EXISTS idx_expenses_category ON expenses(category_id);

    -- Words that hint at a category (not read by any query yet)
    CREATE TABLE IF NOT EXISTS category_dictionary (
        id INTEGER PRIMARY KEY,
        word TEXT NOT NULL,
        category_id INTEGER NOT NULL REFERENCES categories(id) ON DELETE RESTRICT
    );

    CREATE INDEX IF NOT EXISTS idx_category_dictionary_category ON category_dictionary(category_id);
"#;

impl Database {
    /// Create all tables and indexes if they do not exist yet.
    ///
    /// Safe to call any number of times.
    pub fn ensure_schema(&self) -> Result<()> {
        let conn = self.conn()?;
        create_schema(&conn).map_err(|e| Error::Schema(e.to_string()))?;
        info!(parent: self.span(), version = SCHEMA_VERSION, "Database schema initialized");
        Ok(())
    }

    /// Schema version recorded in the database file (0 if never initialized)
    pub fn schema_version(&self) -> Result<i64> {
        let conn = self.conn()?;
        let version = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;
        Ok(version)
    }
}

fn create_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(SCHEMA)?;
    conn.execute_batch(&format!("PRAGMA user_version = {};", SCHEMA_VERSION))
}

fn user_error(err: Error) -> rusqlite::Error {
    rusqlite::Error::UserFunctionError(Box::new(err))
}

fn month_and_year(ctx: &Context<'_>) -> rusqlite::Result<(u32, i32)> {
    let month: i64 = ctx.get(0)?;
    let year: i64 = ctx.get(1)?;
    let month = u32::try_from(month)
        .map_err(|_| user_error(Error::InvalidPeriod(format!("invalid month {}", month))))?;
    let year = i32::try_from(year)
        .map_err(|_| user_error(Error::InvalidPeriod(format!("invalid year {}", year))))?;
    Ok((month, year))
}

/// Register the period-boundary helpers as SQL scalar functions.
///
/// The zero-argument functions read the clock when called, so they are not
/// marked deterministic. All return ISO `YYYY-MM-DD` text, comparable with
/// the `created_at` column.
pub(crate) fn register_period_functions(conn: &Connection) -> rusqlite::Result<()> {
    let flags = FunctionFlags::SQLITE_UTF8;

    conn.create_scalar_function("first_weekday", 0, flags, |_| {
        Ok(period::first_weekday(period::today()).to_string())
    })?;
    conn.create_scalar_function("last_weekday", 0, flags, |_| {
        Ok(period::last_weekday(period::today()).to_string())
    })?;
    conn.create_scalar_function("first_month_day", 0, flags, |_| {
        Ok(period::first_month_day(period::today()).to_string())
    })?;
    conn.create_scalar_function("last_month_day", 0, flags, |_| {
        Ok(period::last_month_day(period::today()).to_string())
    })?;
    conn.create_scalar_function(
        "last_day_of_month",
        2,
        flags | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| {
            let (month, year) = month_and_year(ctx)?;
            period::last_day_of_month(month, year)
                .map(|day| day.to_string())
                .map_err(user_error)
        },
    )?;

    Ok(())
}
