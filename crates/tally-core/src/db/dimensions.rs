//! Category and currency dimension tables
//!
//! Both tables have the same shape (id, unique name), so the SQL is shared
//! and parameterized by [`Dimension`].

use rusqlite::{params, Connection, OptionalExtension};
use tracing::debug;

use super::{is_unique_violation, Database};
use crate::error::{Error, Result};
use crate::models::{Category, Currency};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Dimension {
    Category,
    Currency,
}

impl Dimension {
    fn table(self) -> &'static str {
        match self {
            Dimension::Category => "categories",
            Dimension::Currency => "currencies",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Dimension::Category => "category",
            Dimension::Currency => "currency",
        }
    }
}

impl Database {
    /// Find a category id by name
    pub fn lookup_category(&self, name: &str) -> Result<Option<i64>> {
        self.with_conn(|conn| lookup(conn, Dimension::Category, name))
    }

    /// Insert a new category, returning its id
    pub fn insert_category(&self, name: &str) -> Result<i64> {
        self.with_transaction(|tx| insert(tx, Dimension::Category, name))
    }

    /// Get the id of a category, creating it on first use
    pub fn lookup_or_insert_category(&self, name: &str) -> Result<i64> {
        self.with_transaction(|tx| lookup_or_insert(tx, Dimension::Category, name))
    }

    /// Find a currency id by name
    pub fn lookup_currency(&self, name: &str) -> Result<Option<i64>> {
        self.with_conn(|conn| lookup(conn, Dimension::Currency, name))
    }

    /// Insert a new currency, returning its id
    pub fn insert_currency(&self, name: &str) -> Result<i64> {
        self.with_transaction(|tx| insert(tx, Dimension::Currency, name))
    }

    /// Get the id of a currency, creating it on first use
    pub fn lookup_or_insert_currency(&self, name: &str) -> Result<i64> {
        self.with_transaction(|tx| lookup_or_insert(tx, Dimension::Currency, name))
    }

    /// List all categories by name
    pub fn list_categories(&self) -> Result<Vec<Category>> {
        let rows = self.with_conn(|conn| list(conn, Dimension::Category))?;
        Ok(rows
            .into_iter()
            .map(|(id, name)| Category { id, name })
            .collect())
    }

    /// List all currencies by name
    pub fn list_currencies(&self) -> Result<Vec<Currency>> {
        let rows = self.with_conn(|conn| list(conn, Dimension::Currency))?;
        Ok(rows
            .into_iter()
            .map(|(id, name)| Currency { id, name })
            .collect())
    }
}

/// Trim a dimension name and reject empty ones
pub(crate) fn normalize_name(dimension: Dimension, name: &str) -> Result<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(Error::InvalidName(format!(
            "{} name must not be empty",
            dimension.label()
        )));
    }
    Ok(trimmed.to_string())
}

pub(crate) fn lookup(conn: &Connection, dimension: Dimension, name: &str) -> Result<Option<i64>> {
    let name = normalize_name(dimension, name)?;
    let sql = format!("SELECT id FROM {} WHERE name = ?", dimension.table());
    let id = conn
        .query_row(&sql, params![name], |row| row.get(0))
        .optional()?;
    Ok(id)
}

pub(crate) fn insert(conn: &Connection, dimension: Dimension, name: &str) -> Result<i64> {
    let name = normalize_name(dimension, name)?;
    let sql = format!("INSERT INTO {} (name) VALUES (?)", dimension.table());
    conn.execute(&sql, params![name]).map_err(|e| {
        if is_unique_violation(&e) {
            Error::InvalidName(format!("{} '{}' already exists", dimension.label(), name))
        } else {
            Error::Database(e)
        }
    })?;
    let id = conn.last_insert_rowid();
    debug!(table = dimension.table(), id, name = %name, "Inserted dimension row");
    Ok(id)
}

pub(crate) fn lookup_or_insert(conn: &Connection, dimension: Dimension, name: &str) -> Result<i64> {
    match lookup(conn, dimension, name)? {
        Some(id) => Ok(id),
        None => insert(conn, dimension, name),
    }
}

fn list(conn: &Connection, dimension: Dimension) -> Result<Vec<(i64, String)>> {
    let sql = format!("SELECT id, name FROM {} ORDER BY name", dimension.table());
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}
