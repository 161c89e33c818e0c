//! Tally Core Library
//!
//! Expense ledger data layer:
//! - Bounded connection pool with scoped acquisition
//! - Idempotent schema with SQL period-boundary functions
//! - User, category, currency and expense inserts/lookups
//! - Period resolution (day, week, month, year windows)
//! - Period-windowed expense reports
//! - Async facade for request handlers

pub mod config;
pub mod db;
pub mod error;
pub mod ledger;
pub mod logging;
pub mod models;
pub mod period;

pub use config::LedgerConfig;
pub use db::{Database, PoolStatus};
pub use error::{Error, Result};
pub use ledger::Ledger;
pub use logging::Telemetry;
pub use models::{
    totals_by_currency, Category, Currency, Expense, ExpenseRow, LedgerCounts, NewUser,
    ReportFilter, User,
};
pub use period::{DateWindow, PeriodSpec};
