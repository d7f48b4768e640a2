//! Contact list controller.
//!
//! # Responsibility
//! - Own the in-memory collection mirroring the `contacts` table.
//! - Load it once per controller lifetime and keep it consistent through
//!   incremental edits driven by edit-session events and delete requests.
//!
//! # Invariants
//! - The store is read by `load_all` only; edits never trigger a reload.
//! - Updates copy fields into the existing row; row identity never changes.
//! - In-memory mutations follow a successful store write, never precede it.
//!
//! # Borrowing
//! Session events are applied synchronously inside `EditSession::commit`.
//! Callers must not hold a `contacts()` borrow, or a borrow of the edited
//! row, across a commit.

use crate::model::collection::{CollectionChange, ContactCollection};
use crate::model::contact::{
    apply_to_shared, Contact, ContactId, SharedContact, UNSAVED_CONTACT_ID,
};
use crate::repo::contact_store::{ContactStore, StoreResult};
use crate::service::edit_session::{EditSession, SessionEvent};
use crate::service::prompt::{ConfirmRequest, Prompter};
use log::{debug, info, warn};
use std::cell::{Ref, RefCell};
use std::rc::Rc;
use std::sync::Arc;
use std::time::Instant;

/// Load-once guard state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    NotLoaded,
    Loaded,
}

/// Result of a delete request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// The user answered no; nothing changed.
    Declined,
    /// `affected` store rows were deleted; `removed` tells whether the row
    /// was present in the collection.
    Deleted { affected: usize, removed: bool },
}

/// Controller behind the contact list view.
pub struct ContactListController {
    store: Arc<dyn ContactStore>,
    prompter: Rc<dyn Prompter>,
    contacts: Rc<RefCell<ContactCollection>>,
    load_state: LoadState,
}

impl ContactListController {
    pub fn new(store: Arc<dyn ContactStore>, prompter: Rc<dyn Prompter>) -> Self {
        Self {
            store,
            prompter,
            contacts: Rc::new(RefCell::new(ContactCollection::new())),
            load_state: LoadState::NotLoaded,
        }
    }

    pub fn load_state(&self) -> LoadState {
        self.load_state
    }

    /// Called whenever the list view becomes active.
    ///
    /// Loads on the first successful call only. Returns whether a load ran.
    /// A failed load keeps `NotLoaded`, so the next activation retries.
    pub async fn activate(&mut self) -> StoreResult<bool> {
        if self.load_state == LoadState::Loaded {
            debug!("event=list_activate module=service status=skipped reason=already_loaded");
            return Ok(false);
        }
        self.load_all().await?;
        Ok(true)
    }

    /// Ensures the table exists and replaces the collection with every row.
    pub async fn load_all(&mut self) -> StoreResult<usize> {
        let started_at = Instant::now();
        self.store.ensure_table().await?;
        let records = self.store.fetch_all().await?;

        let rows = records
            .into_iter()
            .map(|record| Contact::from_record(record).into_shared())
            .collect::<Vec<_>>();
        let count = rows.len();
        self.contacts.borrow_mut().reset(rows);
        self.load_state = LoadState::Loaded;

        info!(
            "event=list_load module=service status=ok count={} duration_ms={}",
            count,
            started_at.elapsed().as_millis()
        );
        Ok(count)
    }

    /// Read access to the rows for rendering.
    pub fn contacts(&self) -> Ref<'_, ContactCollection> {
        self.contacts.borrow()
    }

    /// Registers a structural change listener on the collection.
    ///
    /// The listener runs while the collection is mutably borrowed and must
    /// not call back into `contacts()`.
    pub fn subscribe_changes(&self, listener: impl Fn(CollectionChange) + 'static) {
        self.contacts.borrow_mut().subscribe(listener);
    }

    /// Looks up a loaded row by store id.
    pub fn find_by_id(&self, id: ContactId) -> Option<SharedContact> {
        self.contacts
            .borrow()
            .iter()
            .find(|row| row.borrow().id() == id)
            .cloned()
    }

    /// Starts the add flow. The committed contact is appended to the list.
    pub fn begin_add(&self) -> EditSession {
        let mut session = EditSession::begin(
            &Contact::default(),
            Arc::clone(&self.store),
            Rc::clone(&self.prompter),
        );
        let contacts = Rc::downgrade(&self.contacts);
        session.on_completed(move |event| match (event, contacts.upgrade()) {
            (SessionEvent::Added(contact), Some(contacts)) => {
                append(&contacts, contact);
            }
            (SessionEvent::Added(contact), None) => warn!(
                "event=list_add module=service status=skipped reason=controller_dropped contact_id={}",
                contact.id()
            ),
            (SessionEvent::Updated(_), _) => {}
        });
        session
    }

    /// Handles a row selection from the list view.
    ///
    /// `None` is the echo produced when the view clears its selection and is
    /// ignored. For a row, an edit session is seeded from that row and its
    /// `Updated` event is copied back into the same row. The selection is
    /// treated as cleared once this returns, so the row can be picked again.
    ///
    /// Every `Some` is a fresh selection and yields a fresh session; guarding
    /// against a second navigation while one editor is already shown belongs
    /// to the host view. Each session writes its whole working copy back, so
    /// the last commit wins.
    pub fn select(&self, row: Option<&SharedContact>) -> Option<EditSession> {
        let Some(row) = row else {
            debug!("event=list_select module=service status=skipped reason=no_selection");
            return None;
        };

        let mut session = EditSession::begin(
            &row.borrow(),
            Arc::clone(&self.store),
            Rc::clone(&self.prompter),
        );
        let original = Rc::clone(row);
        session.on_completed(move |event| {
            if let SessionEvent::Updated(edited) = event {
                Self::on_updated(&original, &edited);
            }
        });
        Some(session)
    }

    /// Appends a newly persisted contact and returns its row handle.
    pub fn on_added(&self, contact: Contact) -> SharedContact {
        append(&self.contacts, contact)
    }

    /// Copies every mutable field of `edited` into the existing row.
    ///
    /// Row observers are notified after the row's mutable borrow is released
    /// and may read the row through its shared handle.
    pub fn on_updated(original: &SharedContact, edited: &Contact) {
        let row_id = original.borrow().id();
        if row_id != edited.id() {
            warn!(
                "event=list_update module=service status=mismatch row_id={} edited_id={}",
                row_id,
                edited.id()
            );
        }
        apply_to_shared(original, edited);
        info!(
            "event=list_update module=service status=ok contact_id={}",
            row_id
        );
    }

    /// Asks for confirmation, then deletes the row from the store and from
    /// the collection, in that order.
    ///
    /// # Errors
    /// Store failures propagate and leave the collection untouched.
    pub async fn on_delete_requested(&self, row: &SharedContact) -> StoreResult<DeleteOutcome> {
        let (id, full_name) = {
            let contact = row.borrow();
            (contact.id(), contact.full_name())
        };

        let request = ConfirmRequest::delete_contact(&full_name);
        if !self.prompter.confirm(&request).await {
            info!(
                "event=list_delete module=service status=declined contact_id={}",
                id
            );
            return Ok(DeleteOutcome::Declined);
        }

        let affected = if id != UNSAVED_CONTACT_ID {
            self.store.delete(id).await?
        } else {
            0
        };
        let removed = self.contacts.borrow_mut().remove(row);

        info!(
            "event=list_delete module=service status=ok contact_id={} affected={} removed={}",
            id, affected, removed
        );
        Ok(DeleteOutcome::Deleted { affected, removed })
    }
}

fn append(contacts: &RefCell<ContactCollection>, contact: Contact) -> SharedContact {
    let id = contact.id();
    let row = contact.into_shared();
    contacts.borrow_mut().push(Rc::clone(&row));
    info!(
        "event=list_add module=service status=ok contact_id={}",
        id
    );
    row
}
