//! Store connection configuration.
//!
//! # Responsibility
//! - Carry the single `connection_uri` setting for the department store.
//! - Resolve the URI into a concrete storage target.
//!
//! # Invariants
//! - Only `sqlite::memory:`, `:memory:` and `sqlite://<path>` are accepted.
//! - Resolution is pure; nothing is opened here.

use crate::db::{DbError, DbResult};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Environment variable read by `StoreConfig::from_env`.
pub const CONNECTION_URI_ENV: &str = "DEPTSTORE_URI";
/// Connection URI used when nothing else is configured.
pub const DEFAULT_CONNECTION_URI: &str = "sqlite::memory:";

const MEMORY_URIS: &[&str] = &["sqlite::memory:", ":memory:"];
const FILE_URI_PREFIX: &str = "sqlite://";

/// Configuration surface of the department store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    pub connection_uri: String,
}

/// Storage location resolved from a connection URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreTarget {
    Memory,
    File(PathBuf),
}

impl StoreConfig {
    pub fn new(connection_uri: impl Into<String>) -> Self {
        Self {
            connection_uri: connection_uri.into(),
        }
    }

    /// Builds a config from `DEPTSTORE_URI`, falling back to in-memory.
    pub fn from_env() -> Self {
        let uri = std::env::var(CONNECTION_URI_ENV)
            .ok()
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_CONNECTION_URI.to_string());
        Self::new(uri)
    }

    /// Resolves `connection_uri` into a storage target.
    ///
    /// # Errors
    /// - `DbError::InvalidConnectionUri` for unknown schemes or empty paths.
    pub fn target(&self) -> DbResult<StoreTarget> {
        let uri = self.connection_uri.trim();
        if MEMORY_URIS.contains(&uri) {
            return Ok(StoreTarget::Memory);
        }

        match uri.strip_prefix(FILE_URI_PREFIX) {
            Some(path) if !path.is_empty() => Ok(StoreTarget::File(PathBuf::from(path))),
            _ => Err(DbError::InvalidConnectionUri(self.connection_uri.clone())),
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self::new(DEFAULT_CONNECTION_URI)
    }
}
