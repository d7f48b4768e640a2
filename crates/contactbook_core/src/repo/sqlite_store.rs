//! SQLite-backed record store.
//!
//! # Responsibility
//! - Implement `ContactStore` over the `contacts` table.
//! - Keep rusqlite work off the async executor via `spawn_blocking`.
//!
//! # Invariants
//! - All operations share one connection, serialized by a mutex.
//! - Read paths reject invalid persisted state instead of masking it.

use crate::db::{ensure_contacts_table, open_db, open_db_in_memory};
use crate::model::contact::{ContactId, ContactRecord};
use crate::repo::contact_store::{ContactStore, StoreError, StoreResult};
use async_trait::async_trait;
use log::{debug, error};
use rusqlite::{params, Connection, Row};
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Instant;

const CONTACT_SELECT_SQL: &str = "SELECT
    id,
    first_name,
    last_name,
    phone,
    email,
    is_blocked
FROM contacts";

/// Contact store over a single shared SQLite connection.
#[derive(Clone)]
pub struct SqliteContactStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteContactStore {
    /// Opens (or creates) the database file at `path`.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        Ok(Self::from_connection(open_db(path)?))
    }

    pub fn open_in_memory() -> StoreResult<Self> {
        Ok(Self::from_connection(open_db_in_memory()?))
    }

    pub fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
        }
    }

    async fn run<T, F>(&self, op: &'static str, f: F) -> StoreResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> StoreResult<T> + Send + 'static,
    {
        let started_at = Instant::now();
        let conn = Arc::clone(&self.conn);
        let result = match tokio::task::spawn_blocking(move || {
            let guard = conn
                .lock()
                .map_err(|_| StoreError::Unavailable("connection lock poisoned".to_string()))?;
            f(&*guard)
        })
        .await
        {
            Ok(result) => result,
            Err(err) => Err(StoreError::Unavailable(format!("store task failed: {err}"))),
        };

        match &result {
            Ok(_) => debug!(
                "event=store_{} module=repo status=ok duration_ms={}",
                op,
                started_at.elapsed().as_millis()
            ),
            Err(err) => error!(
                "event=store_{} module=repo status=error duration_ms={} error={}",
                op,
                started_at.elapsed().as_millis(),
                err
            ),
        }
        result
    }
}

#[async_trait]
impl ContactStore for SqliteContactStore {
    async fn ensure_table(&self) -> StoreResult<()> {
        self.run("ensure_table", |conn| Ok(ensure_contacts_table(conn)?))
            .await
    }

    async fn insert(&self, record: ContactRecord) -> StoreResult<ContactRecord> {
        self.run("insert", move |conn| insert_contact(conn, record))
            .await
    }

    async fn update(&self, record: ContactRecord) -> StoreResult<usize> {
        self.run("update", move |conn| update_contact(conn, &record))
            .await
    }

    async fn delete(&self, id: ContactId) -> StoreResult<usize> {
        self.run("delete", move |conn| {
            Ok(conn.execute("DELETE FROM contacts WHERE id = ?1;", [id])?)
        })
        .await
    }

    async fn fetch_all(&self) -> StoreResult<Vec<ContactRecord>> {
        self.run("fetch_all", fetch_all_contacts).await
    }
}

fn insert_contact(conn: &Connection, mut record: ContactRecord) -> StoreResult<ContactRecord> {
    if record.is_persisted() {
        return Err(StoreError::AlreadyPersisted(record.id));
    }

    conn.execute(
        "INSERT INTO contacts (
            first_name,
            last_name,
            phone,
            email,
            is_blocked
        ) VALUES (?1, ?2, ?3, ?4, ?5);",
        params![
            record.first_name.as_str(),
            record.last_name.as_str(),
            record.phone.as_str(),
            record.email.as_str(),
            bool_to_int(record.is_blocked),
        ],
    )?;

    record.id = conn.last_insert_rowid();
    Ok(record)
}

fn update_contact(conn: &Connection, record: &ContactRecord) -> StoreResult<usize> {
    if !record.is_persisted() {
        return Err(StoreError::NotPersisted);
    }

    let changed = conn.execute(
        "UPDATE contacts
         SET
            first_name = ?1,
            last_name = ?2,
            phone = ?3,
            email = ?4,
            is_blocked = ?5
         WHERE id = ?6;",
        params![
            record.first_name.as_str(),
            record.last_name.as_str(),
            record.phone.as_str(),
            record.email.as_str(),
            bool_to_int(record.is_blocked),
            record.id,
        ],
    )?;
    Ok(changed)
}

fn fetch_all_contacts(conn: &Connection) -> StoreResult<Vec<ContactRecord>> {
    let mut stmt = conn.prepare(&format!("{CONTACT_SELECT_SQL} ORDER BY id ASC;"))?;
    let mut rows = stmt.query([])?;
    let mut contacts = Vec::new();

    while let Some(row) = rows.next()? {
        contacts.push(parse_contact_row(row)?);
    }

    Ok(contacts)
}

fn parse_contact_row(row: &Row<'_>) -> StoreResult<ContactRecord> {
    let id: ContactId = row.get("id")?;
    if id <= 0 {
        return Err(StoreError::InvalidData(format!(
            "invalid id `{id}` in contacts.id"
        )));
    }

    let is_blocked = match row.get::<_, i64>("is_blocked")? {
        0 => false,
        1 => true,
        other => {
            return Err(StoreError::InvalidData(format!(
                "invalid is_blocked value `{other}` in contacts.is_blocked"
            )));
        }
    };

    Ok(ContactRecord {
        id,
        first_name: row.get("first_name")?,
        last_name: row.get("last_name")?,
        phone: row.get("phone")?,
        email: row.get("email")?,
        is_blocked,
    })
}

fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}
