//! Data models for the ledger

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A ledger user, keyed externally by their messenger identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub external_identity: i64,
    pub created_at: DateTime<Utc>,
}

/// Fields for onboarding a new user
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NewUser {
    pub name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub external_identity: i64,
}

impl NewUser {
    pub fn new(external_identity: i64) -> Self {
        Self {
            external_identity,
            ..Default::default()
        }
    }
}

/// Expense category dimension row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
}

/// Currency dimension row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Currency {
    pub id: i64,
    pub name: String,
}

/// A stored expense with its foreign keys
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expense {
    pub id: i64,
    pub amount: Decimal,
    pub currency_id: i64,
    pub category_id: i64,
    pub user_id: i64,
    pub created_at: NaiveDate,
}

/// One row of a report: an expense joined with its dimension names
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpenseRow {
    pub amount: Decimal,
    pub currency: String,
    pub category: String,
    pub created_at: NaiveDate,
}

/// Optional narrowing of a report
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportFilter {
    /// Only rows in this category (matched by exact name)
    pub category: Option<String>,
    /// Only rows owned by this user id
    pub user_id: Option<i64>,
}

impl ReportFilter {
    pub fn category(name: impl Into<String>) -> Self {
        Self {
            category: Some(name.into()),
            user_id: None,
        }
    }

    pub fn for_user(mut self, user_id: i64) -> Self {
        self.user_id = Some(user_id);
        self
    }
}

/// Row counts per table
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LedgerCounts {
    pub users: i64,
    pub categories: i64,
    pub currencies: i64,
    pub expenses: i64,
}

/// Sum report rows per currency.
///
/// The ledger never converts between currencies, so totals are kept apart.
/// Fails with `InvalidAmount` when a total exceeds the decimal range.
pub fn totals_by_currency(rows: &[ExpenseRow]) -> Result<BTreeMap<String, Decimal>> {
    let mut totals = BTreeMap::new();
    for row in rows {
        let total = totals.entry(row.currency.clone()).or_insert(Decimal::ZERO);
        *total = total.checked_add(row.amount).ok_or_else(|| {
            Error::InvalidAmount(format!("{} total overflows", row.currency))
        })?;
    }
    Ok(totals)
}
