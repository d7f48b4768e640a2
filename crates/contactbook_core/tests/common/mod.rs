#![allow(dead_code)]

use async_trait::async_trait;
use contactbook_core::db::{ensure_contacts_table, open_db_in_memory};
use contactbook_core::{
    Alert, ConfirmRequest, ContactId, ContactRecord, ContactStore, Prompter, SqliteContactStore,
    StoreError, StoreResult,
};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Store wrapper that records every call and can be told to fail writes.
pub struct RecordingStore {
    inner: SqliteContactStore,
    calls: Mutex<Vec<String>>,
    fetch_all_calls: AtomicUsize,
    fail_writes: AtomicBool,
    fail_reads: AtomicBool,
    unsaved_inserts: AtomicBool,
}

impl RecordingStore {
    /// In-memory store whose `contacts` table already exists.
    pub fn new() -> Arc<Self> {
        let conn = open_db_in_memory().unwrap();
        ensure_contacts_table(&conn).unwrap();
        Arc::new(Self {
            inner: SqliteContactStore::from_connection(conn),
            calls: Mutex::new(Vec::new()),
            fetch_all_calls: AtomicUsize::new(0),
            fail_writes: AtomicBool::new(false),
            fail_reads: AtomicBool::new(false),
            unsaved_inserts: AtomicBool::new(false),
        })
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    pub fn fetch_all_calls(&self) -> usize {
        self.fetch_all_calls.load(Ordering::SeqCst)
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Makes `insert` write the row but report it back with id 0.
    pub fn unsaved_inserts(&self, enabled: bool) {
        self.unsaved_inserts.store(enabled, Ordering::SeqCst);
    }

    /// Seeds a row directly, bypassing call recording.
    pub async fn seed(&self, first: &str, last: &str) -> ContactRecord {
        self.inner
            .insert(ContactRecord {
                first_name: first.to_string(),
                last_name: last.to_string(),
                ..ContactRecord::default()
            })
            .await
            .unwrap()
    }

    pub async fn rows(&self) -> Vec<ContactRecord> {
        self.inner.fetch_all().await.unwrap()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    fn check_writable(&self) -> StoreResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("disk full".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl ContactStore for RecordingStore {
    async fn ensure_table(&self) -> StoreResult<()> {
        self.record("ensure_table".to_string());
        self.inner.ensure_table().await
    }

    async fn insert(&self, record: ContactRecord) -> StoreResult<ContactRecord> {
        self.record("insert".to_string());
        self.check_writable()?;
        let mut persisted = self.inner.insert(record).await?;
        if self.unsaved_inserts.load(Ordering::SeqCst) {
            persisted.id = 0;
        }
        Ok(persisted)
    }

    async fn update(&self, record: ContactRecord) -> StoreResult<usize> {
        self.record(format!("update:{}", record.id));
        self.check_writable()?;
        self.inner.update(record).await
    }

    async fn delete(&self, id: ContactId) -> StoreResult<usize> {
        self.record(format!("delete:{id}"));
        self.check_writable()?;
        self.inner.delete(id).await
    }

    async fn fetch_all(&self) -> StoreResult<Vec<ContactRecord>> {
        self.record("fetch_all".to_string());
        self.fetch_all_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("database locked".to_string()));
        }
        self.inner.fetch_all().await
    }
}

/// Prompter answering confirmations from a script and recording dialogs.
#[derive(Default)]
pub struct ScriptedPrompter {
    answers: RefCell<VecDeque<bool>>,
    confirms: RefCell<Vec<ConfirmRequest>>,
    alerts: RefCell<Vec<Alert>>,
}

impl ScriptedPrompter {
    pub fn answering(answers: &[bool]) -> Self {
        Self {
            answers: RefCell::new(answers.iter().copied().collect()),
            ..Self::default()
        }
    }

    pub fn confirms(&self) -> Vec<ConfirmRequest> {
        self.confirms.borrow().clone()
    }

    pub fn alerts(&self) -> Vec<Alert> {
        self.alerts.borrow().clone()
    }
}

#[async_trait(?Send)]
impl Prompter for ScriptedPrompter {
    async fn confirm(&self, request: &ConfirmRequest) -> bool {
        self.confirms.borrow_mut().push(request.clone());
        self.answers.borrow_mut().pop_front().unwrap_or(false)
    }

    async fn alert(&self, alert: &Alert) {
        self.alerts.borrow_mut().push(alert.clone());
    }
}
