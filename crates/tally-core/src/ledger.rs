//! Async entry points for request handlers
//!
//! Pool acquisition and SQLite calls block, so every operation runs on
//! tokio's blocking thread pool. If the caller drops the future, the blocking
//! task still runs to completion and returns its connection to the pool.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::config::LedgerConfig;
use crate::db::{Database, PoolStatus};
use crate::error::{Error, Result};
use crate::logging::Telemetry;
use crate::models::{ExpenseRow, NewUser, ReportFilter};
use crate::period::PeriodSpec;

/// Cloneable handle shared by all request handlers
#[derive(Clone)]
pub struct Ledger {
    db: Database,
}

impl Ledger {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Open the pool and ensure the schema, off the async thread
    pub async fn connect(config: LedgerConfig, telemetry: Telemetry) -> Result<Self> {
        let db = tokio::task::spawn_blocking(move || Database::connect(&config, &telemetry))
            .await
            .map_err(|e| Error::Task(e.to_string()))??;
        Ok(Self::new(db))
    }

    /// The underlying synchronous database
    pub fn database(&self) -> &Database {
        &self.db
    }

    pub fn pool_status(&self) -> PoolStatus {
        self.db.status()
    }

    async fn run<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Database) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let db = self.db.clone();
        tokio::task::spawn_blocking(move || f(&db))
            .await
            .map_err(|e| Error::Task(e.to_string()))?
    }

    /// Onboard a user on first authorization
    pub async fn register_user(&self, user: NewUser) -> Result<i64> {
        self.run(move |db| db.create_user(&user)).await
    }

    pub async fn resolve_user_id(&self, external_identity: i64) -> Result<Option<i64>> {
        self.run(move |db| db.resolve_user_id(external_identity)).await
    }

    /// Record an expense for an onboarded user
    pub async fn record_expense(
        &self,
        amount: Decimal,
        currency_name: &str,
        category_name: &str,
        external_identity: i64,
    ) -> Result<i64> {
        let currency = currency_name.to_string();
        let category = category_name.to_string();
        self.run(move |db| db.record_expense(amount, &currency, &category, external_identity))
            .await
    }

    /// Record a backdated expense for an onboarded user
    pub async fn record_expense_on(
        &self,
        amount: Decimal,
        currency_name: &str,
        category_name: &str,
        external_identity: i64,
        created_at: NaiveDate,
    ) -> Result<i64> {
        let currency = currency_name.to_string();
        let category = category_name.to_string();
        self.run(move |db| {
            db.record_expense_on(amount, &currency, &category, external_identity, created_at)
        })
        .await
    }

    /// All users' expenses in `period`, optionally in one category
    pub async fn get_report(
        &self,
        period: PeriodSpec,
        category: Option<&str>,
    ) -> Result<Vec<ExpenseRow>> {
        let category = category.map(str::to_string);
        self.run(move |db| db.query(period, category.as_deref()))
            .await
    }

    /// One user's expenses in `period`, optionally in one category
    pub async fn get_user_report(
        &self,
        external_identity: i64,
        period: PeriodSpec,
        category: Option<&str>,
    ) -> Result<Vec<ExpenseRow>> {
        let category = category.map(str::to_string);
        self.run(move |db| {
            let user_id = db
                .resolve_user_id(external_identity)?
                .ok_or(Error::UnknownUser(external_identity))?;
            let filter = ReportFilter {
                category,
                user_id: Some(user_id),
            };
            db.query_report(period, &filter)
        })
        .await
    }

    /// Expenses in `period` matching an arbitrary filter
    pub async fn get_filtered_report(
        &self,
        period: PeriodSpec,
        filter: ReportFilter,
    ) -> Result<Vec<ExpenseRow>> {
        self.run(move |db| db.query_report(period, &filter)).await
    }

    /// Expenses recorded on exactly `day`
    pub async fn get_expenses_by_specific_day(
        &self,
        day: NaiveDate,
        filter: ReportFilter,
    ) -> Result<Vec<ExpenseRow>> {
        self.run(move |db| db.get_expenses_by_specific_day(day, &filter))
            .await
    }
}
