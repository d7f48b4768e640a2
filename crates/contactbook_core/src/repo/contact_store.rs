//! Record store contract.
//!
//! # Responsibility
//! - Describe the asynchronous CRUD surface over the single `contacts` table.
//!
//! # Invariants
//! - `insert` only accepts unsaved records and returns the assigned id.
//! - `update` and `delete` address rows by id and report affected rows.
//! - `fetch_all` returns rows in store order (insertion order).

use crate::db::DbError;
use crate::model::contact::{ContactId, ContactRecord};
use async_trait::async_trait;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type StoreResult<T> = Result<T, StoreError>;

/// Store-level failure. Never recovered locally by sessions or controllers.
#[derive(Debug)]
pub enum StoreError {
    Db(DbError),
    /// `insert` was handed a record that already has an id.
    AlreadyPersisted(ContactId),
    /// `update` was handed a record without an id.
    NotPersisted,
    NotFound(ContactId),
    InvalidData(String),
    /// The backing connection could not be reached.
    Unavailable(String),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::AlreadyPersisted(id) => write!(f, "contact already persisted with id {id}"),
            Self::NotPersisted => write!(f, "contact has not been persisted yet"),
            Self::NotFound(id) => write!(f, "contact not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted contact data: {message}"),
            Self::Unavailable(message) => write!(f, "contact store unavailable: {message}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Asynchronous CRUD over persisted contacts.
#[async_trait]
pub trait ContactStore: Send + Sync {
    /// Creates the backing table when missing.
    async fn ensure_table(&self) -> StoreResult<()>;
    /// Persists an unsaved record and returns it with the assigned id.
    async fn insert(&self, record: ContactRecord) -> StoreResult<ContactRecord>;
    /// Overwrites every field of the row with `record.id`.
    async fn update(&self, record: ContactRecord) -> StoreResult<usize>;
    async fn delete(&self, id: ContactId) -> StoreResult<usize>;
    async fn fetch_all(&self) -> StoreResult<Vec<ContactRecord>>;
}
