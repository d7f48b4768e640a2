//! Contact entity.
//!
//! # Responsibility
//! - Hold one contact's fields and notify observers on actual mutation.
//! - Derive the display name (`full_name`) on read.
//!
//! # Invariants
//! - Assigning an unchanged value is a no-op and notifies nobody.
//! - A `FullName` notification is only ever emitted directly after a
//!   `FirstName` or `LastName` notification.
//! - Observers are never carried over by `detached_copy()`.

use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::fmt::{Debug, Formatter};
use std::rc::Rc;

/// Store-assigned primary key. `0` marks an unsaved contact.
pub type ContactId = i64;

/// Id carried by contacts that have not been written to the store yet.
pub const UNSAVED_CONTACT_ID: ContactId = 0;

/// Shared handle used for rows of the list collection.
///
/// Row identity is pointer identity (`Rc::ptr_eq`), never field equality.
pub type SharedContact = Rc<RefCell<Contact>>;

/// Observable property names of a contact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContactField {
    FirstName,
    LastName,
    /// Derived; emitted together with `FirstName`/`LastName`.
    FullName,
    Phone,
    Email,
    IsBlocked,
}

impl ContactField {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::FirstName => "first_name",
            Self::LastName => "last_name",
            Self::FullName => "full_name",
            Self::Phone => "phone",
            Self::Email => "email",
            Self::IsBlocked => "is_blocked",
        }
    }
}

/// Plain row shape exchanged with the record store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactRecord {
    pub id: ContactId,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub email: String,
    pub is_blocked: bool,
}

impl ContactRecord {
    pub fn is_persisted(&self) -> bool {
        self.id != UNSAVED_CONTACT_ID
    }
}

/// Handle returned by `Contact::subscribe`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Rc<dyn Fn(&Contact, ContactField)>;

/// Observable contact entity.
///
/// Listeners run synchronously and receive the contact itself, so they can
/// read any field without borrowing the owning `SharedContact`. Use
/// `apply_to_shared` to update a list row: it releases the row's mutable
/// borrow before notifying, so listeners may also borrow the row.
#[derive(Default)]
pub struct Contact {
    record: ContactRecord,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_subscription: u64,
}

impl Contact {
    /// Creates an unsaved contact with the given names and empty details.
    pub fn new(first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        Self::from_record(ContactRecord {
            first_name: first_name.into(),
            last_name: last_name.into(),
            ..ContactRecord::default()
        })
    }

    /// Wraps a persisted (or draft) row without any observers.
    pub fn from_record(record: ContactRecord) -> Self {
        Self {
            record,
            listeners: Vec::new(),
            next_subscription: 0,
        }
    }

    /// Wraps this contact into a list-row handle.
    pub fn into_shared(self) -> SharedContact {
        Rc::new(RefCell::new(self))
    }

    /// Returns an independent field-for-field copy with no observers.
    pub fn detached_copy(&self) -> Self {
        Self::from_record(self.record.clone())
    }

    /// Snapshot of the current field values.
    pub fn to_record(&self) -> ContactRecord {
        self.record.clone()
    }

    pub fn id(&self) -> ContactId {
        self.record.id
    }

    pub fn is_persisted(&self) -> bool {
        self.record.is_persisted()
    }

    pub fn first_name(&self) -> &str {
        &self.record.first_name
    }

    pub fn last_name(&self) -> &str {
        &self.record.last_name
    }

    pub fn phone(&self) -> &str {
        &self.record.phone
    }

    pub fn email(&self) -> &str {
        &self.record.email
    }

    pub fn is_blocked(&self) -> bool {
        self.record.is_blocked
    }

    /// Display name, recomputed on every read.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.record.first_name, self.record.last_name)
    }

    pub fn set_first_name(&mut self, value: impl Into<String>) {
        let mut changes = Vec::new();
        self.assign_first_name(value.into(), &mut changes);
        self.notify_all(&changes);
    }

    pub fn set_last_name(&mut self, value: impl Into<String>) {
        let mut changes = Vec::new();
        self.assign_last_name(value.into(), &mut changes);
        self.notify_all(&changes);
    }

    pub fn set_phone(&mut self, value: impl Into<String>) {
        let value = value.into();
        if self.record.phone == value {
            return;
        }
        self.record.phone = value;
        self.notify_all(&[ContactField::Phone]);
    }

    pub fn set_email(&mut self, value: impl Into<String>) {
        let value = value.into();
        if self.record.email == value {
            return;
        }
        self.record.email = value;
        self.notify_all(&[ContactField::Email]);
    }

    pub fn set_blocked(&mut self, value: bool) {
        if self.record.is_blocked == value {
            return;
        }
        self.record.is_blocked = value;
        self.notify_all(&[ContactField::IsBlocked]);
    }

    /// Copies every mutable field from `source`, then notifies once per
    /// changed field in setter order. The id is left untouched.
    pub fn copy_fields_from(&mut self, source: &Contact) {
        let changes = self.assign_fields_from(source);
        self.notify_all(&changes);
    }

    /// Registers a change listener.
    pub fn subscribe(
        &mut self,
        listener: impl Fn(&Contact, ContactField) + 'static,
    ) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.listeners.push((id, Rc::new(listener)));
        id
    }

    /// Removes a listener. Returns `false` when it was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(candidate, _)| *candidate != id);
        self.listeners.len() != before
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Writes the store-issued id onto an unsaved contact.
    ///
    /// Ids are immutable once assigned; a second assignment is ignored.
    pub(crate) fn assign_id(&mut self, id: ContactId) -> bool {
        if self.record.is_persisted() {
            return false;
        }
        self.record.id = id;
        true
    }

    fn assign_first_name(&mut self, value: String, changes: &mut Vec<ContactField>) {
        if self.record.first_name == value {
            return;
        }
        self.record.first_name = value;
        changes.extend([ContactField::FirstName, ContactField::FullName]);
    }

    fn assign_last_name(&mut self, value: String, changes: &mut Vec<ContactField>) {
        if self.record.last_name == value {
            return;
        }
        self.record.last_name = value;
        changes.extend([ContactField::LastName, ContactField::FullName]);
    }

    /// Assigns every mutable field silently and returns the notifications
    /// owed, in the order the setters would have emitted them.
    fn assign_fields_from(&mut self, source: &Contact) -> Vec<ContactField> {
        let mut changes = Vec::new();
        self.assign_first_name(source.first_name().to_string(), &mut changes);
        self.assign_last_name(source.last_name().to_string(), &mut changes);
        if self.record.phone != source.record.phone {
            self.record.phone = source.record.phone.clone();
            changes.push(ContactField::Phone);
        }
        if self.record.email != source.record.email {
            self.record.email = source.record.email.clone();
            changes.push(ContactField::Email);
        }
        if self.record.is_blocked != source.record.is_blocked {
            self.record.is_blocked = source.record.is_blocked;
            changes.push(ContactField::IsBlocked);
        }
        changes
    }

    fn listener_snapshot(&self) -> Vec<Listener> {
        self.listeners
            .iter()
            .map(|(_, listener)| Rc::clone(listener))
            .collect()
    }

    fn notify_all(&self, changes: &[ContactField]) {
        for field in changes {
            for (_, listener) in &self.listeners {
                listener(self, *field);
            }
        }
    }
}

/// Copies every mutable field of `source` into the shared `row`.
///
/// The row's mutable borrow ends before any listener runs; listeners are
/// called under a shared borrow and may read the row through its handle.
pub fn apply_to_shared(row: &SharedContact, source: &Contact) {
    let (changes, listeners) = {
        let mut contact = row.borrow_mut();
        let changes = contact.assign_fields_from(source);
        (changes, contact.listener_snapshot())
    };

    let contact = row.borrow();
    for field in changes {
        for listener in &listeners {
            listener(&contact, field);
        }
    }
}

impl Debug for Contact {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Contact")
            .field("record", &self.record)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::{apply_to_shared, Contact, ContactField};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn recorder(contact: &mut Contact) -> Rc<RefCell<Vec<ContactField>>> {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        contact.subscribe(move |_, field| sink.borrow_mut().push(field));
        seen
    }

    #[test]
    fn assign_id_only_applies_once() {
        let mut contact = Contact::new("Ann", "Lee");
        assert!(contact.assign_id(4));
        assert!(!contact.assign_id(9));
        assert_eq!(contact.id(), 4);
    }

    #[test]
    fn unchanged_detail_fields_do_not_notify() {
        let mut contact = Contact::new("Ann", "Lee");
        let seen = recorder(&mut contact);

        contact.set_phone("");
        contact.set_email("");
        contact.set_blocked(false);
        assert!(seen.borrow().is_empty());

        contact.set_blocked(true);
        assert_eq!(*seen.borrow(), vec![ContactField::IsBlocked]);
    }

    #[test]
    fn unsubscribe_stops_delivery() {
        let mut contact = Contact::default();
        let seen = Rc::new(RefCell::new(0_u32));
        let sink = Rc::clone(&seen);
        let id = contact.subscribe(move |_, _| *sink.borrow_mut() += 1);

        contact.set_email("a@b.c");
        assert!(contact.unsubscribe(id));
        assert!(!contact.unsubscribe(id));
        contact.set_email("x@y.z");

        assert_eq!(*seen.borrow(), 1);
    }

    #[test]
    fn shared_row_listener_can_borrow_row_while_applying() {
        let row = Contact::new("Ann", "Lee").into_shared();
        let names = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&names);
        let handle = Rc::downgrade(&row);
        row.borrow_mut().subscribe(move |_, field| {
            if field == ContactField::FullName {
                if let Some(row) = handle.upgrade() {
                    sink.borrow_mut().push(row.borrow().full_name());
                }
            }
        });

        apply_to_shared(&row, &Contact::new("Ann", "Li"));

        assert_eq!(*names.borrow(), vec!["Ann Li".to_string()]);
        assert_eq!(row.borrow().last_name(), "Li");
    }
}
