//! Typed records for the department collection.
//!
//! # Responsibility
//! - Define the persisted record shape and the unsaved draft shape.
//! - Define the equality filter and partial patch used by store queries.
//!
//! # Invariants
//! - Every persisted `Department` carries a non-nil `DepartmentId`.
//! - `name` is free text: empty and duplicate values are accepted.

pub mod department;
