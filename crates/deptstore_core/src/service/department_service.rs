//! Department store façade.
//!
//! # Responsibility
//! - Provide find/insert/update/delete/save entry points over the
//!   department collection.
//! - Emit one structured log event per write.
//!
//! # Invariants
//! - Every call is one repository round trip; nothing is retried.
//! - Absent reads return `None`/empty and absent bulk writes return `0`.
//! - Record-level writes (`save`, `remove`) on a missing record fail with
//!   `StoreError::RecordNotFound`.

use crate::model::department::{
    Department, DepartmentFilter, DepartmentId, DepartmentPatch, NewDepartment,
};
use crate::repo::department_repo::{DepartmentRepository, MatchScope, StoreError, StoreResult};
use log::{error, info};
use std::time::Instant;

/// Façade over a department repository.
pub struct DepartmentStore<R: DepartmentRepository> {
    repo: R,
}

impl<R: DepartmentRepository> DepartmentStore<R> {
    /// Creates a façade using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Returns every persisted department in insertion order.
    pub fn find_all(&self) -> StoreResult<Vec<Department>> {
        self.repo.find(&DepartmentFilter::all(), None)
    }

    /// Returns every department matching `filter`.
    pub fn find(&self, filter: &DepartmentFilter) -> StoreResult<Vec<Department>> {
        self.repo.find(filter, None)
    }

    /// Returns the first department matching `filter`, if any.
    pub fn find_one(&self, filter: &DepartmentFilter) -> StoreResult<Option<Department>> {
        Ok(self.repo.find(filter, Some(1))?.into_iter().next())
    }

    pub fn find_by_id(&self, id: DepartmentId) -> StoreResult<Option<Department>> {
        self.find_one(&DepartmentFilter::by_id(id))
    }

    pub fn count(&self, filter: &DepartmentFilter) -> StoreResult<u64> {
        self.repo.count(filter)
    }

    /// Persists a draft and returns the stored record with its new id.
    pub fn insert_one(&self, draft: NewDepartment) -> StoreResult<Department> {
        let started_at = Instant::now();
        let result = self.repo.insert(&draft);
        log_write("department_insert", started_at, &result, |_| 1);
        result
    }

    /// Applies `patch` to the first match. Returns 0 or 1.
    pub fn update_one(
        &self,
        filter: &DepartmentFilter,
        patch: &DepartmentPatch,
    ) -> StoreResult<u64> {
        let started_at = Instant::now();
        let result = self.repo.update(filter, patch, MatchScope::First);
        log_write("department_update_one", started_at, &result, |count| *count);
        result
    }

    /// Applies `patch` to every match. An empty filter matches everything.
    pub fn update_many(
        &self,
        filter: &DepartmentFilter,
        patch: &DepartmentPatch,
    ) -> StoreResult<u64> {
        let started_at = Instant::now();
        let result = self.repo.update(filter, patch, MatchScope::All);
        log_write("department_update_many", started_at, &result, |count| *count);
        result
    }

    /// Deletes the first match. Returns 0 or 1.
    pub fn delete_one(&self, filter: &DepartmentFilter) -> StoreResult<u64> {
        let started_at = Instant::now();
        let result = self.repo.delete(filter, MatchScope::First);
        log_write("department_delete_one", started_at, &result, |count| *count);
        result
    }

    /// Deletes every match; `None` empties the collection.
    pub fn delete_many(&self, filter: Option<&DepartmentFilter>) -> StoreResult<u64> {
        let started_at = Instant::now();
        let all = DepartmentFilter::all();
        let result = self.repo.delete(filter.unwrap_or(&all), MatchScope::All);
        log_write("department_delete_many", started_at, &result, |count| *count);
        result
    }

    /// Writes the current field values of a fetched record back to the store.
    ///
    /// # Errors
    /// - `StoreError::RecordNotFound` when the record was deleted meanwhile.
    pub fn save(&self, department: &Department) -> StoreResult<()> {
        let started_at = Instant::now();
        let result = self.repo.replace(department);
        log_write("department_save", started_at, &result, |_| 1);
        result
    }

    /// Deletes a fetched record by its id.
    ///
    /// # Errors
    /// - `StoreError::RecordNotFound` when the record is already gone.
    pub fn remove(&self, department: &Department) -> StoreResult<()> {
        let started_at = Instant::now();
        let result = self
            .repo
            .delete(&DepartmentFilter::by_id(department.id), MatchScope::First)
            .and_then(|deleted| match deleted {
                0 => Err(StoreError::RecordNotFound(department.id)),
                _ => Ok(()),
            });
        log_write("department_remove", started_at, &result, |_| 1);
        result
    }
}

fn log_write<T>(
    event: &str,
    started_at: Instant,
    result: &StoreResult<T>,
    affected: impl FnOnce(&T) -> u64,
) {
    match result {
        Ok(value) => info!(
            "event={} module=service status=ok duration_ms={} affected={}",
            event,
            started_at.elapsed().as_millis(),
            affected(value)
        ),
        Err(err) => error!(
            "event={} module=service status=error duration_ms={} unavailable={} error={}",
            event,
            started_at.elapsed().as_millis(),
            err.is_unavailable(),
            err
        ),
    }
}
