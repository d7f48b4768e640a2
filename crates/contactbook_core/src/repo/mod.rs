//! Record store contract and persistence implementations.
//!
//! # Responsibility
//! - Define the asynchronous CRUD contract used by sessions and controllers.
//! - Isolate SQLite query details from service orchestration.
//!
//! # Invariants
//! - The store assigns ids; callers never choose one.
//! - Store APIs return semantic errors (`AlreadyPersisted`, `NotPersisted`)
//!   in addition to DB transport errors.

pub mod contact_store;
pub mod sqlite_store;
