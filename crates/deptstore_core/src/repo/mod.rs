//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the data access contract the department façade relies on.
//! - Isolate SQLite query details from the façade.
//!
//! # Invariants
//! - Each repository call is a single statement against the store.
//! - Repository APIs separate "store unavailable" from other DB failures.

pub mod department_repo;
