//! User onboarding and identity lookup

use rusqlite::{params, Connection, OptionalExtension};
use tracing::info;

use super::{is_unique_violation, parse_datetime, Database};
use crate::error::{Error, Result};
use crate::models::{NewUser, User};

impl Database {
    /// Create a user. Fails with `DuplicateIdentity` if the external identity exists.
    pub fn create_user(&self, user: &NewUser) -> Result<i64> {
        let id = self.with_transaction(|tx| insert_user(tx, user))?;
        info!(parent: self.span(), user_id = id, "Created user");
        Ok(id)
    }

    /// Resolve the surrogate user id for an external identity
    pub fn resolve_user_id(&self, external_identity: i64) -> Result<Option<i64>> {
        self.with_conn(|conn| resolve_user_id(conn, external_identity))
    }

    /// Get a user by external identity
    pub fn get_user(&self, external_identity: i64) -> Result<Option<User>> {
        let conn = self.conn()?;
        let user = conn
            .query_row(
                "SELECT id, name, last_name, email, external_identity, created_at
                 FROM users WHERE external_identity = ?",
                params![external_identity],
                |row| {
                    let created_at_str: String = row.get(5)?;
                    Ok(User {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        last_name: row.get(2)?,
                        email: row.get(3)?,
                        external_identity: row.get(4)?,
                        created_at: parse_datetime(&created_at_str),
                    })
                },
            )
            .optional()?;
        Ok(user)
    }
}

fn clean(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

pub(crate) fn insert_user(conn: &Connection, user: &NewUser) -> Result<i64> {
    conn.execute(
        "INSERT INTO users (name, last_name, email, external_identity) VALUES (?, ?, ?, ?)",
        params![
            clean(&user.name),
            clean(&user.last_name),
            clean(&user.email),
            user.external_identity
        ],
    )
    .map_err(|e| {
        if is_unique_violation(&e) {
            Error::DuplicateIdentity(user.external_identity)
        } else {
            Error::Database(e)
        }
    })?;
    Ok(conn.last_insert_rowid())
}

pub(crate) fn resolve_user_id(conn: &Connection, external_identity: i64) -> Result<Option<i64>> {
    let id = conn
        .query_row(
            "SELECT id FROM users WHERE external_identity = ?",
            params![external_identity],
            |row| row.get(0),
        )
        .optional()?;
    Ok(id)
}
