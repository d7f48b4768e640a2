//! Edit session over a detached contact copy.
//!
//! # Responsibility
//! - Own a working copy of one contact while it is being added or edited.
//! - Validate and persist the copy with exactly one store call on commit.
//! - Hand the persisted copy to the spawning controller through a one-shot
//!   completion handler.
//!
//! # Invariants
//! - The working copy never aliases the source contact.
//! - A rejected or failed commit leaves the session open and fires nothing.
//! - The completion handler runs at most once, after the store write
//!   succeeded and before `commit` returns.

use crate::model::contact::{Contact, ContactId};
use crate::repo::contact_store::{ContactStore, StoreError};
use crate::service::prompt::{Alert, Prompter};
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::rc::Rc;
use std::sync::Arc;

pub type SessionResult<T> = Result<T, SessionError>;

/// Which flow a session was started for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditMode {
    /// Seeded from an unsaved contact; commit inserts.
    Add,
    /// Seeded from a persisted contact; commit updates.
    Edit,
}

impl EditMode {
    fn for_contact(contact: &Contact) -> Self {
        if contact.is_persisted() {
            Self::Edit
        } else {
            Self::Add
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Edit => "edit",
        }
    }
}

/// Completion event carrying the persisted working copy.
#[derive(Debug)]
pub enum SessionEvent {
    Added(Contact),
    Updated(Contact),
}

impl SessionEvent {
    pub fn contact(&self) -> &Contact {
        match self {
            Self::Added(contact) | Self::Updated(contact) => contact,
        }
    }

    pub fn into_contact(self) -> Contact {
        match self {
            Self::Added(contact) | Self::Updated(contact) => contact,
        }
    }
}

/// Local validation failure reported to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    /// First and last name are both blank.
    EmptyName,
}

impl ValidationError {
    pub fn code(self) -> &'static str {
        match self {
            Self::EmptyName => "empty_name",
        }
    }
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyName => write!(f, "contact name cannot be empty"),
        }
    }
}

impl Error for ValidationError {}

/// Result of a commit attempt that did not fail outright.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    /// Persisted and handed off; the caller should close the session view.
    Committed { id: ContactId, mode: EditMode },
    /// Validation failed and the user was alerted; the session stays open.
    NeedsCorrection(ValidationError),
}

#[derive(Debug)]
pub enum SessionError {
    /// The session was already committed.
    Closed,
    Store(StoreError),
}

impl Display for SessionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Closed => write!(f, "edit session is already closed"),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for SessionError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            Self::Closed => None,
        }
    }
}

impl From<StoreError> for SessionError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

type CompletionHandler = Box<dyn FnOnce(SessionEvent)>;

/// One add/edit flow over a detached working copy.
pub struct EditSession {
    store: Arc<dyn ContactStore>,
    prompter: Rc<dyn Prompter>,
    working: Contact,
    mode: EditMode,
    open: bool,
    on_completed: Option<CompletionHandler>,
}

impl EditSession {
    /// Starts a session over an independent copy of `source`.
    ///
    /// Pass `&Contact::default()` for the add flow.
    pub fn begin(
        source: &Contact,
        store: Arc<dyn ContactStore>,
        prompter: Rc<dyn Prompter>,
    ) -> Self {
        let working = source.detached_copy();
        let mode = EditMode::for_contact(&working);
        info!(
            "event=session_begin module=service status=ok mode={} contact_id={}",
            mode.as_str(),
            working.id()
        );
        Self {
            store,
            prompter,
            working,
            mode,
            open: true,
            on_completed: None,
        }
    }

    /// Registers the handler that receives the completion event.
    ///
    /// Registering again replaces the previous handler.
    pub fn on_completed(&mut self, handler: impl FnOnce(SessionEvent) + 'static) {
        self.on_completed = Some(Box::new(handler));
    }

    pub fn mode(&self) -> EditMode {
        self.mode
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Current working copy. Empty once the session has been committed.
    pub fn working_copy(&self) -> &Contact {
        &self.working
    }

    /// Mutable access for field edits while the session is open.
    pub fn edit(&mut self) -> SessionResult<&mut Contact> {
        if !self.open {
            return Err(SessionError::Closed);
        }
        Ok(&mut self.working)
    }

    /// Validates and persists the working copy.
    ///
    /// # Errors
    /// - `SessionError::Closed` after a successful commit.
    /// - `SessionError::Store` when the store write fails or an insert hands
    ///   back an unusable id; the session stays open and no event fires.
    pub async fn commit(&mut self) -> SessionResult<CommitOutcome> {
        if !self.open {
            return Err(SessionError::Closed);
        }

        if let Err(err) = validate_for_save(&self.working) {
            warn!(
                "event=session_commit module=service status=rejected mode={} reason={}",
                self.mode.as_str(),
                err.code()
            );
            self.prompter.alert(&Alert::missing_name()).await;
            return Ok(CommitOutcome::NeedsCorrection(err));
        }

        let record = self.working.to_record();
        let mode = if record.is_persisted() {
            let id = record.id;
            let affected = self.store.update(record).await?;
            if affected == 0 {
                return Err(SessionError::Store(StoreError::NotFound(id)));
            }
            EditMode::Edit
        } else {
            let persisted = self.store.insert(record).await?;
            if persisted.id <= 0 {
                warn!(
                    "event=session_commit module=service status=rejected mode=add reason=invalid_id contact_id={}",
                    persisted.id
                );
                return Err(SessionError::Store(StoreError::InvalidData(format!(
                    "insert returned invalid id {}",
                    persisted.id
                ))));
            }
            if !self.working.assign_id(persisted.id) {
                return Err(SessionError::Store(StoreError::InvalidData(format!(
                    "working copy already carries id {}",
                    self.working.id()
                ))));
            }
            EditMode::Add
        };

        self.open = false;
        let contact = std::mem::take(&mut self.working);
        let id = contact.id();
        info!(
            "event=session_commit module=service status=ok mode={} contact_id={}",
            mode.as_str(),
            id
        );

        if let Some(handler) = self.on_completed.take() {
            handler(match mode {
                EditMode::Add => SessionEvent::Added(contact),
                EditMode::Edit => SessionEvent::Updated(contact),
            });
        }

        Ok(CommitOutcome::Committed { id, mode })
    }

    /// Abandons the session; the source contact and the list are untouched.
    pub fn cancel(self) {
        info!(
            "event=session_cancel module=service status=ok mode={} contact_id={} committed={}",
            self.mode.as_str(),
            self.working.id(),
            !self.open
        );
    }
}

/// Checks that the contact has a displayable name.
pub fn validate_for_save(contact: &Contact) -> Result<(), ValidationError> {
    if contact.full_name().trim().is_empty() {
        return Err(ValidationError::EmptyName);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{validate_for_save, ValidationError};
    use crate::model::contact::Contact;

    #[test]
    fn whitespace_only_names_are_rejected() {
        let contact = Contact::new("  ", "\t");
        assert_eq!(validate_for_save(&contact), Err(ValidationError::EmptyName));
    }

    #[test]
    fn one_name_is_enough() {
        assert!(validate_for_save(&Contact::new("", "Lee")).is_ok());
        assert!(validate_for_save(&Contact::new("Ann", "")).is_ok());
    }
}
