//! `contacts` table definition.

use super::DbResult;
use rusqlite::Connection;

pub const CONTACTS_TABLE: &str = "contacts";

const CREATE_CONTACTS_SQL: &str = "CREATE TABLE IF NOT EXISTS contacts (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    first_name TEXT NOT NULL DEFAULT '',
    last_name TEXT NOT NULL DEFAULT '',
    phone TEXT NOT NULL DEFAULT '',
    email TEXT NOT NULL DEFAULT '',
    is_blocked INTEGER NOT NULL DEFAULT 0 CHECK (is_blocked IN (0, 1))
);";

/// Creates the `contacts` table when it does not exist yet.
pub fn ensure_contacts_table(conn: &Connection) -> DbResult<()> {
    conn.execute_batch(CREATE_CONTACTS_SQL)?;
    Ok(())
}

/// Returns whether the `contacts` table is present.
pub fn contacts_table_exists(conn: &Connection) -> DbResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [CONTACTS_TABLE],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

#[cfg(test)]
mod tests {
    use super::{contacts_table_exists, ensure_contacts_table};
    use rusqlite::Connection;

    #[test]
    fn ensure_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        assert!(!contacts_table_exists(&conn).unwrap());

        ensure_contacts_table(&conn).unwrap();
        ensure_contacts_table(&conn).unwrap();

        assert!(contacts_table_exists(&conn).unwrap());
    }
}
