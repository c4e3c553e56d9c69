//! SQLite bootstrap for the durable key-value store.
//!
//! # Responsibility
//! - Open and configure SQLite connections used by `SqliteStorage`.
//! - Apply schema migrations in deterministic order.
//!
//! # Invariants
//! - Schema version is tracked via `PRAGMA user_version`.
//! - No key-value reads or writes happen before migrations succeed.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory};

pub type DbResult<T> = Result<T, DbError>;

/// Failure while opening or migrating the note database.
#[derive(Debug)]
pub enum DbError {
    /// The driver failed to open, configure or query the file.
    Sqlite(rusqlite::Error),
    /// The file was migrated by a newer build; it is left untouched.
    SchemaTooNew { found: u32, supported: u32 },
}

impl DbError {
    /// Stable code used in `error_code=` log fields.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Sqlite(_) => "sqlite_failure",
            Self::SchemaTooNew { .. } => "schema_too_new",
        }
    }
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "note database unavailable: {err}"),
            Self::SchemaTooNew { found, supported } => write!(
                f,
                "note database uses schema {found}; this build reads up to {supported}"
            ),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::SchemaTooNew { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

#[cfg(test)]
mod tests {
    use super::DbError;
    use std::error::Error;

    #[test]
    fn schema_too_new_names_both_versions_and_has_no_source() {
        let err = DbError::SchemaTooNew {
            found: 7,
            supported: 1,
        };
        assert_eq!(err.code(), "schema_too_new");
        assert_eq!(
            err.to_string(),
            "note database uses schema 7; this build reads up to 1"
        );
        assert!(err.source().is_none());
    }

    #[test]
    fn sqlite_failure_keeps_driver_error_as_source() {
        let err = DbError::from(rusqlite::Error::InvalidQuery);
        assert_eq!(err.code(), "sqlite_failure");
        assert!(err.to_string().starts_with("note database unavailable: "));
        assert!(err.source().is_some());
    }
}
