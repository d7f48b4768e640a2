//! SQLite storage bootstrap.
//!
//! # Responsibility
//! - Open and configure SQLite connections for the contact store.
//! - Create the `contacts` table on demand.
//!
//! # Invariants
//! - Table creation is idempotent (`CREATE TABLE IF NOT EXISTS`).
//! - There is no versioned schema; an existing table is used as-is.

use std::error::Error;
use std::fmt::{Display, Formatter};

mod open;
mod schema;

pub use open::{open_db, open_db_in_memory};
pub use schema::{contacts_table_exists, ensure_contacts_table, CONTACTS_TABLE};

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    InvalidPath(String),
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::InvalidPath(path) => write!(f, "invalid database path `{path}`"),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::InvalidPath(_) => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
