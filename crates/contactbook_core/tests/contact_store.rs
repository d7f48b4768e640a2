use contactbook_core::db::{contacts_table_exists, open_db};
use contactbook_core::{ContactRecord, ContactStore, SqliteContactStore, StoreError};

fn record(first: &str, last: &str) -> ContactRecord {
    ContactRecord {
        first_name: first.to_string(),
        last_name: last.to_string(),
        ..ContactRecord::default()
    }
}

#[tokio::test]
async fn insert_assigns_increasing_ids_and_fetch_keeps_insert_order() {
    let store = SqliteContactStore::open_in_memory().unwrap();
    store.ensure_table().await.unwrap();

    let first = store.insert(record("Ann", "Lee")).await.unwrap();
    let second = store.insert(record("Bo", "Park")).await.unwrap();

    assert_eq!(first.id, 1);
    assert_eq!(second.id, 2);

    let rows = store.fetch_all().await.unwrap();
    assert_eq!(rows, vec![first, second]);
}

#[tokio::test]
async fn insert_rejects_persisted_record() {
    let store = SqliteContactStore::open_in_memory().unwrap();
    store.ensure_table().await.unwrap();

    let mut persisted = record("Ann", "Lee");
    persisted.id = 5;
    let err = store.insert(persisted).await.unwrap_err();
    assert!(matches!(err, StoreError::AlreadyPersisted(5)));
    assert!(store.fetch_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn update_overwrites_all_fields_by_id() {
    let store = SqliteContactStore::open_in_memory().unwrap();
    store.ensure_table().await.unwrap();
    let mut row = store.insert(record("Ann", "Lee")).await.unwrap();

    row.last_name = "Li".to_string();
    row.phone = "555-1234".to_string();
    row.email = "ann@example.com".to_string();
    row.is_blocked = true;
    let affected = store.update(row.clone()).await.unwrap();

    assert_eq!(affected, 1);
    assert_eq!(store.fetch_all().await.unwrap(), vec![row]);
}

#[tokio::test]
async fn update_reports_zero_rows_for_unknown_id_and_rejects_unsaved() {
    let store = SqliteContactStore::open_in_memory().unwrap();
    store.ensure_table().await.unwrap();

    let mut ghost = record("No", "Body");
    ghost.id = 42;
    assert_eq!(store.update(ghost).await.unwrap(), 0);

    let err = store.update(record("Ann", "Lee")).await.unwrap_err();
    assert!(matches!(err, StoreError::NotPersisted));
}

#[tokio::test]
async fn delete_removes_by_id_and_reports_affected_rows() {
    let store = SqliteContactStore::open_in_memory().unwrap();
    store.ensure_table().await.unwrap();
    let ann = store.insert(record("Ann", "Lee")).await.unwrap();
    let bo = store.insert(record("Bo", "Park")).await.unwrap();

    assert_eq!(store.delete(ann.id).await.unwrap(), 1);
    assert_eq!(store.delete(ann.id).await.unwrap(), 0);
    assert_eq!(store.fetch_all().await.unwrap(), vec![bo]);
}

#[tokio::test]
async fn fetch_all_without_table_is_an_error() {
    let store = SqliteContactStore::open_in_memory().unwrap();
    let err = store.fetch_all().await.unwrap_err();
    assert!(matches!(err, StoreError::Db(_)));
}

#[tokio::test]
async fn fetch_all_rejects_corrupt_blocked_flag() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("contacts.db");
    {
        let store = SqliteContactStore::open(&path).unwrap();
        store.ensure_table().await.unwrap();
    }
    let conn = open_db(&path).unwrap();
    conn.execute_batch(
        "DROP TABLE contacts;
         CREATE TABLE contacts (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            first_name TEXT NOT NULL,
            last_name TEXT NOT NULL,
            phone TEXT NOT NULL,
            email TEXT NOT NULL,
            is_blocked INTEGER NOT NULL
         );
         INSERT INTO contacts (first_name, last_name, phone, email, is_blocked)
         VALUES ('Ann', 'Lee', '', '', 7);",
    )
    .unwrap();
    drop(conn);

    let store = SqliteContactStore::open(&path).unwrap();
    let err = store.fetch_all().await.unwrap_err();
    assert!(matches!(err, StoreError::InvalidData(message) if message.contains("is_blocked")));
}

#[tokio::test]
async fn file_store_persists_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("contacts.db");

    let first_open = SqliteContactStore::open(&path).unwrap();
    first_open.ensure_table().await.unwrap();
    let ann = first_open.insert(record("Ann", "Lee")).await.unwrap();
    drop(first_open);

    let conn = open_db(&path).unwrap();
    assert!(contacts_table_exists(&conn).unwrap());
    drop(conn);

    let reopened = SqliteContactStore::open(&path).unwrap();
    reopened.ensure_table().await.unwrap();
    assert_eq!(reopened.fetch_all().await.unwrap(), vec![ann]);
}
