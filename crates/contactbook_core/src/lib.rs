//! Core data layer for the contact book.
//! Persists contacts, mirrors them in an observable list, and routes edits
//! from detail sessions back into that list without reloading.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::AppConfig;
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::collection::{CollectionChange, ContactCollection};
pub use model::contact::{
    apply_to_shared, Contact, ContactField, ContactId, ContactRecord, SharedContact,
    SubscriptionId, UNSAVED_CONTACT_ID,
};
pub use repo::contact_store::{ContactStore, StoreError, StoreResult};
pub use repo::sqlite_store::SqliteContactStore;
pub use service::contact_list::{ContactListController, DeleteOutcome, LoadState};
pub use service::edit_session::{
    validate_for_save, CommitOutcome, EditMode, EditSession, SessionError, SessionEvent,
    SessionResult, ValidationError,
};
pub use service::prompt::{Alert, ConfirmRequest, Prompter};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
