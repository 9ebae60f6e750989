//! Use-case services over repositories.
//!
//! # Responsibility
//! - Expose the department façade to callers.
//! - Keep callers decoupled from storage details.

pub mod department_service;
