//! Contact domain model and the observable list collection.
//!
//! # Responsibility
//! - Define the persisted row shape (`ContactRecord`) and the observable
//!   entity (`Contact`) bound by list and detail views.
//! - Provide the ordered collection the list controller mutates incrementally.
//!
//! # Invariants
//! - `id == 0` means "not yet persisted"; a positive id is the store key.
//! - The only way to duplicate a `Contact` is `Contact::detached_copy()`.

pub mod collection;
pub mod contact;
