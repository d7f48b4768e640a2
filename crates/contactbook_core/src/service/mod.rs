//! Contact use-case services.
//!
//! # Responsibility
//! - Orchestrate store calls into the add/edit/delete flows of the list view.
//! - Keep UI layers decoupled from storage details through `Prompter`.

pub mod contact_list;
pub mod edit_session;
pub mod prompt;
