//! SQLite-backed durable key-value storage.
//!
//! # Responsibility
//! - Persist string values per `(scope, key)` in the `kv_entries` table.
//!
//! # Invariants
//! - A `scope` behaves like a browser origin: two storages with different
//!   scopes on the same database never observe each other's keys.
//! - `set` is an upsert executed as a single statement.

use super::{KeyValueStorage, StorageResult};
use crate::db::{open_db, open_db_in_memory};
use log::debug;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

/// Durable storage over one owned SQLite connection.
pub struct SqliteStorage {
    conn: Connection,
    scope: String,
}

impl SqliteStorage {
    /// Opens (and migrates) a database file for `scope`.
    pub fn open(path: impl AsRef<Path>, scope: impl Into<String>) -> StorageResult<Self> {
        let conn = open_db(path)?;
        Ok(Self::from_connection(conn, scope))
    }

    /// Opens an in-memory database for `scope`.
    pub fn open_in_memory(scope: impl Into<String>) -> StorageResult<Self> {
        let conn = open_db_in_memory()?;
        Ok(Self::from_connection(conn, scope))
    }

    /// Wraps an already migrated connection.
    pub fn from_connection(conn: Connection, scope: impl Into<String>) -> Self {
        Self {
            conn,
            scope: scope.into(),
        }
    }

    pub fn scope(&self) -> &str {
        &self.scope
    }

    /// Returns the underlying connection, e.g. to share it with another scope.
    pub fn into_connection(self) -> Connection {
        self.conn
    }
}

impl KeyValueStorage for SqliteStorage {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM kv_entries WHERE scope = ?1 AND key = ?2;",
                params![self.scope, key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set(&mut self, key: &str, value: &str) -> StorageResult<()> {
        self.conn.execute(
            "INSERT INTO kv_entries (scope, key, value)
             VALUES (?1, ?2, ?3)
             ON CONFLICT (scope, key) DO UPDATE SET
                value = excluded.value,
                updated_at = (strftime('%s', 'now') * 1000);",
            params![self.scope, key, value],
        )?;
        debug!(
            "event=kv_set module=storage status=ok scope={} key={} bytes={}",
            self.scope,
            key,
            value.len()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::SqliteStorage;
    use crate::storage::KeyValueStorage;

    #[test]
    fn get_returns_none_for_missing_key() {
        let storage = SqliteStorage::open_in_memory("origin-a").unwrap();
        assert_eq!(storage.get("notes").unwrap(), None);
    }

    #[test]
    fn set_upserts_value() {
        let mut storage = SqliteStorage::open_in_memory("origin-a").unwrap();
        storage.set("notes", "[]").unwrap();
        storage.set("notes", "[{}]").unwrap();
        assert_eq!(storage.get("notes").unwrap().as_deref(), Some("[{}]"));
    }

    #[test]
    fn scopes_are_isolated_on_one_connection() {
        let mut first = SqliteStorage::open_in_memory("origin-a").unwrap();
        first.set("notes", "a").unwrap();

        let second = SqliteStorage::from_connection(first.into_connection(), "origin-b");
        assert_eq!(second.scope(), "origin-b");
        assert_eq!(second.get("notes").unwrap(), None);
    }
}
