//! User-facing prompt contracts.
//!
//! # Responsibility
//! - Describe the confirmation and alert dialogs the core needs, without
//!   depending on any UI toolkit.
//! - Provide the texts used by the contact flows.
//!
//! # Invariants
//! - Both calls suspend until the user responds.
//! - Implementations run on the UI thread; futures need not be `Send`.

use async_trait::async_trait;

/// Yes/no question shown before a destructive action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmRequest {
    pub title: String,
    pub message: String,
    pub affirmative: String,
    pub negative: String,
}

impl ConfirmRequest {
    /// Confirmation shown before deleting a contact.
    pub fn delete_contact(full_name: &str) -> Self {
        Self {
            title: "Warning".to_string(),
            message: format!("Are you sure you want to delete {full_name}?"),
            affirmative: "Yes".to_string(),
            negative: "No".to_string(),
        }
    }
}

/// Informational dialog with a single dismiss button.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub title: String,
    pub message: String,
    pub dismiss: String,
}

impl Alert {
    /// Alert shown when a contact is saved without a name.
    pub fn missing_name() -> Self {
        Self {
            title: "Incomplete contact".to_string(),
            message: "Enter name".to_string(),
            dismiss: "OK".to_string(),
        }
    }
}

/// Dialog surface provided by the host UI.
#[async_trait(?Send)]
pub trait Prompter {
    /// Returns `true` only for the affirmative answer.
    async fn confirm(&self, request: &ConfirmRequest) -> bool;
    async fn alert(&self, alert: &Alert);
}
