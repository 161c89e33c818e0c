//! Ledger configuration
//!
//! Configuration is read from `TALLY_*` environment variables once at startup.
//! Missing or malformed required fields fail here, never per query.
//!
//! | Variable                   | Required | Default |
//! |----------------------------|----------|---------|
//! | `TALLY_DATABASE_NAME`      | yes      |         |
//! | `TALLY_DATABASE_USER`      | no       |         |
//! | `TALLY_DATABASE_PASSWORD`  | no       |         |
//! | `TALLY_DATABASE_HOST`      | no       |         |
//! | `TALLY_DATABASE_PORT`      | no       |         |
//! | `TALLY_POOL_MIN`           | no       | 1       |
//! | `TALLY_POOL_MAX`           | no       | 10      |
//! | `TALLY_ACQUIRE_TIMEOUT_MS` | no       | 5000    |
//!
//! The store is an embedded SQLite file named by `TALLY_DATABASE_NAME`, so the
//! user/password/host/port fields are validated and kept for reporting only.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::error::{Error, Result};

pub const ENV_PREFIX: &str = "TALLY_";

/// Smallest pool the ledger will run with
pub const MIN_POOL_SIZE: u32 = 1;
/// Largest pool accepted by validation
pub const MAX_POOL_SIZE: u32 = 10;

const DEFAULT_ACQUIRE_TIMEOUT_MS: u64 = 5_000;

/// Connection and pool settings for the ledger database
#[derive(Clone, PartialEq, Eq)]
pub struct LedgerConfig {
    /// Path of the SQLite database file
    pub database_name: PathBuf,
    pub database_user: Option<String>,
    pub database_password: Option<String>,
    pub database_host: Option<String>,
    pub database_port: Option<u16>,
    /// Idle connections kept open by the pool
    pub pool_min: u32,
    /// Upper bound on connections checked out at once
    pub pool_max: u32,
    /// Bounded wait for `acquire()` before `PoolExhausted`
    pub acquire_timeout: Duration,
}

impl LedgerConfig {
    /// Config for a database file with default pool settings
    pub fn new(database_name: impl Into<PathBuf>) -> Self {
        Self {
            database_name: database_name.into(),
            database_user: None,
            database_password: None,
            database_host: None,
            database_port: None,
            pool_min: MIN_POOL_SIZE,
            pool_max: MAX_POOL_SIZE,
            acquire_timeout: Duration::from_millis(DEFAULT_ACQUIRE_TIMEOUT_MS),
        }
    }

    pub fn with_pool_size(mut self, pool_min: u32, pool_max: u32) -> Self {
        self.pool_min = pool_min;
        self.pool_max = pool_max;
        self
    }

    pub fn with_acquire_timeout(mut self, timeout: Duration) -> Self {
        self.acquire_timeout = timeout;
        self
    }

    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    ///
    /// Keys are the full variable names (e.g. `TALLY_POOL_MAX`).
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(&format!("{}{}", ENV_PREFIX, name))
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let database_name = get("DATABASE_NAME").ok_or_else(|| {
            Error::Config(format!("{}DATABASE_NAME is required", ENV_PREFIX))
        })?;

        let mut config = Self::new(database_name);
        config.database_user = get("DATABASE_USER");
        config.database_password = get("DATABASE_PASSWORD");
        config.database_host = get("DATABASE_HOST");
        config.database_port = parse_opt(get("DATABASE_PORT"), "DATABASE_PORT")?;
        if let Some(min) = parse_opt(get("POOL_MIN"), "POOL_MIN")? {
            config.pool_min = min;
        }
        if let Some(max) = parse_opt(get("POOL_MAX"), "POOL_MAX")? {
            config.pool_max = max;
        }
        if let Some(ms) = parse_opt::<u64>(get("ACQUIRE_TIMEOUT_MS"), "ACQUIRE_TIMEOUT_MS")? {
            config.acquire_timeout = Duration::from_millis(ms);
        }

        config.validate()?;
        Ok(config)
    }

    /// Check pool bounds and required fields
    pub fn validate(&self) -> Result<()> {
        if self.database_name.as_os_str().is_empty() {
            return Err(Error::Config("database_name must not be empty".into()));
        }
        if self.pool_min < MIN_POOL_SIZE {
            return Err(Error::Config(format!(
                "pool_min must be at least {}, got {}",
                MIN_POOL_SIZE, self.pool_min
            )));
        }
        if self.pool_max > MAX_POOL_SIZE {
            return Err(Error::Config(format!(
                "pool_max must be at most {}, got {}",
                MAX_POOL_SIZE, self.pool_max
            )));
        }
        if self.pool_min > self.pool_max {
            return Err(Error::Config(format!(
                "pool_min ({}) exceeds pool_max ({})",
                self.pool_min, self.pool_max
            )));
        }
        if self.acquire_timeout.is_zero() {
            return Err(Error::Config("acquire timeout must be positive".into()));
        }
        Ok(())
    }
}

// Keep the password out of logs.
impl fmt::Debug for LedgerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LedgerConfig")
            .field("database_name", &self.database_name)
            .field("database_user", &self.database_user)
            .field(
                "database_password",
                &self.database_password.as_ref().map(|_| "<redacted>"),
            )
            .field("database_host", &self.database_host)
            .field("database_port", &self.database_port)
            .field("pool_min", &self.pool_min)
            .field("pool_max", &self.pool_max)
            .field("acquire_timeout", &self.acquire_timeout)
            .finish()
    }
}

fn parse_opt<T: FromStr>(value: Option<String>, name: &str) -> Result<Option<T>> {
    value
        .map(|v| {
            v.parse::<T>().map_err(|_| {
                Error::Config(format!("{}{} has invalid value '{}'", ENV_PREFIX, name, v))
            })
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_applied() {
        let config = LedgerConfig::from_lookup(lookup(&[("TALLY_DATABASE_NAME", "ledger.db")]))
            .unwrap();
        assert_eq!(config.database_name, PathBuf::from("ledger.db"));
        assert_eq!(config.pool_min, 1);
        assert_eq!(config.pool_max, 10);
        assert_eq!(config.acquire_timeout, Duration::from_millis(5_000));
        assert!(config.database_port.is_none());
    }

    #[test]
    fn test_missing_database_name_fails_fast() {
        let err = LedgerConfig::from_lookup(lookup(&[("TALLY_POOL_MAX", "4")])).unwrap_err();
        assert!(matches!(err, Error::Config(_)));

        let err = LedgerConfig::from_lookup(lookup(&[("TALLY_DATABASE_NAME", "   ")])).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_all_fields_parsed() {
        let config = LedgerConfig::from_lookup(lookup(&[
            ("TALLY_DATABASE_NAME", "/var/lib/tally.db"),
            ("TALLY_DATABASE_USER", "bot"),
            ("TALLY_DATABASE_PASSWORD", "hunter2"),
            ("TALLY_DATABASE_HOST", "localhost"),
            ("TALLY_DATABASE_PORT", "5432"),
            ("TALLY_POOL_MIN", "2"),
            ("TALLY_POOL_MAX", "4"),
            ("TALLY_ACQUIRE_TIMEOUT_MS", "250"),
        ]))
        .unwrap();
        assert_eq!(config.database_user.as_deref(), Some("bot"));
        assert_eq!(config.database_port, Some(5432));
        assert_eq!(config.pool_min, 2);
        assert_eq!(config.pool_max, 4);
        assert_eq!(config.acquire_timeout, Duration::from_millis(250));
    }

    #[test]
    fn test_malformed_numbers_rejected() {
        let err = LedgerConfig::from_lookup(lookup(&[
            ("TALLY_DATABASE_NAME", "ledger.db"),
            ("TALLY_DATABASE_PORT", "not-a-port"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("TALLY_DATABASE_PORT"));
    }

    #[test]
    fn test_pool_bounds_validated() {
        assert!(LedgerConfig::new("a.db").with_pool_size(0, 5).validate().is_err());
        assert!(LedgerConfig::new("a.db").with_pool_size(1, 11).validate().is_err());
        assert!(LedgerConfig::new("a.db").with_pool_size(6, 5).validate().is_err());
        assert!(LedgerConfig::new("a.db").with_pool_size(1, 1).validate().is_ok());
    }

    #[test]
    fn test_debug_redacts_password() {
        let mut config = LedgerConfig::new("a.db");
        config.database_password = Some("hunter2".into());
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("hunter2"));
        assert!(rendered.contains("<redacted>"));
    }
}
