//! Observable ordered collection backing the contact list view.
//!
//! # Invariants
//! - Rows are matched by identity (`Rc::ptr_eq`), never by field values.
//! - Every structural change emits exactly one `CollectionChange`.

use crate::model::contact::SharedContact;
use std::rc::Rc;

/// Structural change notification for list views.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionChange {
    /// Contents replaced wholesale.
    Reset { len: usize },
    Added { index: usize },
    Removed { index: usize },
}

type ChangeListener = Box<dyn Fn(CollectionChange)>;

/// Ordered contact rows plus change listeners.
#[derive(Default)]
pub struct ContactCollection {
    rows: Vec<SharedContact>,
    listeners: Vec<ChangeListener>,
}

impl ContactCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces all rows, keeping the given order.
    pub fn reset(&mut self, rows: Vec<SharedContact>) {
        self.rows = rows;
        self.notify(CollectionChange::Reset {
            len: self.rows.len(),
        });
    }

    /// Appends a row at the end.
    pub fn push(&mut self, row: SharedContact) {
        self.rows.push(row);
        self.notify(CollectionChange::Added {
            index: self.rows.len() - 1,
        });
    }

    /// Removes `row` by identity. Returns `false` when it is not present.
    pub fn remove(&mut self, row: &SharedContact) -> bool {
        let Some(index) = self.position(row) else {
            return false;
        };
        self.rows.remove(index);
        self.notify(CollectionChange::Removed { index });
        true
    }

    pub fn position(&self, row: &SharedContact) -> Option<usize> {
        self.rows
            .iter()
            .position(|candidate| Rc::ptr_eq(candidate, row))
    }

    pub fn get(&self, index: usize) -> Option<&SharedContact> {
        self.rows.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &SharedContact> {
        self.rows.iter()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn subscribe(&mut self, listener: impl Fn(CollectionChange) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    fn notify(&self, change: CollectionChange) {
        for listener in &self.listeners {
            listener(change);
        }
    }
}
