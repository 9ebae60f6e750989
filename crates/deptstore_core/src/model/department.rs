//! Department domain model.
//!
//! # Responsibility
//! - Separate unsaved drafts (`NewDepartment`) from stored records
//!   (`Department`), so "is this persisted yet" is a type, not a flag.
//! - Describe equality filters and partial field-set patches.
//!
//! # Invariants
//! - `Department::id` is assigned by the store and never changes.
//! - An empty `DepartmentFilter` matches every record.
//! - An empty `DepartmentPatch` changes nothing.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Store-assigned identifier of a department record.
pub type DepartmentId = Uuid;

/// Unsaved department draft.
///
/// Consumed by `insert_one`, which returns the persisted `Department`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NewDepartment {
    pub name: String,
}

impl NewDepartment {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Persisted department record.
///
/// Values are snapshots of stored state at fetch/insert time. Mutate the
/// public fields locally and call `save` to write them back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Department {
    /// Serialized as `_id` to match the document collection naming.
    #[serde(rename = "_id")]
    pub id: DepartmentId,
    pub name: String,
}

impl Department {
    /// Rebuilds a record from a known identifier.
    ///
    /// # Errors
    /// - Returns `DepartmentValidationError::NilId` for `Uuid::nil()`.
    pub fn with_id(
        id: DepartmentId,
        name: impl Into<String>,
    ) -> Result<Self, DepartmentValidationError> {
        let department = Self {
            id,
            name: name.into(),
        };
        department.validate()?;
        Ok(department)
    }

    /// Checks record-level invariants before persistence.
    pub fn validate(&self) -> Result<(), DepartmentValidationError> {
        if self.id.is_nil() {
            return Err(DepartmentValidationError::NilId);
        }
        Ok(())
    }
}

/// Invariant violations on department records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DepartmentValidationError {
    /// Persisted records must carry a non-nil identifier.
    NilId,
}

impl Display for DepartmentValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NilId => write!(f, "department id must not be nil"),
        }
    }
}

impl Error for DepartmentValidationError {}

/// Equality filter over department fields.
///
/// Set fields are combined with AND. `DepartmentFilter::default()` matches
/// everything.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DepartmentFilter {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<DepartmentId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl DepartmentFilter {
    /// Filter matching every record.
    pub fn all() -> Self {
        Self::default()
    }

    pub fn by_id(id: DepartmentId) -> Self {
        Self {
            id: Some(id),
            ..Self::default()
        }
    }

    pub fn by_name(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Returns whether no field constraint is set.
    pub fn is_empty(&self) -> bool {
        self.id.is_none() && self.name.is_none()
    }

    /// In-memory evaluation of the filter against one record.
    pub fn matches(&self, department: &Department) -> bool {
        self.id.map_or(true, |id| id == department.id)
            && self
                .name
                .as_deref()
                .map_or(true, |name| name == department.name)
    }
}

/// Partial field-set applied by `update_one`/`update_many`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DepartmentPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl DepartmentPatch {
    pub fn set_name(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none()
    }

    /// Applies the set fields to an in-memory record.
    pub fn apply_to(&self, department: &mut Department) {
        if let Some(name) = self.name.as_ref() {
            department.name.clone_from(name);
        }
    }
}
