//! Persistence façade for the department collection.
//!
//! Callers open a connection once with `db::open_store`, wrap it in a
//! `SqliteDepartmentRepository`, drive it through `DepartmentStore`, and
//! release it with `db::close_store`.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::{StoreConfig, StoreTarget};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::department::{
    Department, DepartmentFilter, DepartmentId, DepartmentPatch, DepartmentValidationError,
    NewDepartment,
};
pub use repo::department_repo::{
    DepartmentRepository, MatchScope, SqliteDepartmentRepository, StoreError, StoreResult,
};
pub use service::department_service::DepartmentStore;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
