//! Department repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide find/insert/update/replace/delete primitives over the
//!   `departments` table.
//! - Translate `DepartmentFilter`/`DepartmentPatch` into parameterized SQL.
//! - Classify SQLite failures into the store error taxonomy.
//!
//! # Invariants
//! - Identifiers are generated here, never by callers.
//! - "First match" means lowest `rowid`, i.e. insertion order.
//! - Read paths reject undecodable rows instead of masking them.

use crate::db::migrations::{current_user_version, latest_version};
use crate::db::DbError;
use crate::model::department::{
    Department, DepartmentFilter, DepartmentId, DepartmentPatch, DepartmentValidationError,
    NewDepartment,
};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, ErrorCode, OptionalExtension, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

const DEPARTMENTS_TABLE: &str = "departments";
const REQUIRED_COLUMNS: &[&str] = &["id", "name", "created_at", "updated_at"];
const DEPARTMENT_SELECT_SQL: &str = "SELECT id, name FROM departments";
const TOUCH_UPDATED_AT_SQL: &str = "updated_at = (strftime('%s', 'now') * 1000)";

pub type StoreResult<T> = Result<T, StoreError>;

/// Error taxonomy for department store operations.
#[derive(Debug)]
pub enum StoreError {
    /// The store could not be reached or stopped answering mid-operation.
    StoreUnavailable(DbError),
    /// A write addressed a record that no longer exists.
    RecordNotFound(DepartmentId),
    /// A record violated a field constraint.
    Validation(DepartmentValidationError),
    /// A persisted row could not be decoded.
    InvalidData(String),
    /// The connection has not been migrated to the expected schema.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
    /// Any other storage failure.
    Db(DbError),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::StoreUnavailable(err) => write!(f, "store unavailable: {err}"),
            Self::RecordNotFound(id) => write!(f, "department not found: {id}"),
            Self::Validation(err) => write!(f, "{err}"),
            Self::InvalidData(message) => {
                write!(f, "invalid persisted department data: {message}")
            }
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection schema version {actual_version} does not match expected {expected_version}; open it through db::open_store"
            ),
            Self::MissingRequiredTable(table) => write!(f, "missing required table `{table}`"),
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "missing required column `{table}.{column}`")
            }
            Self::Db(err) => write!(f, "{err}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::StoreUnavailable(err) | Self::Db(err) => Some(err),
            Self::Validation(err) => Some(err),
            _ => None,
        }
    }
}

impl StoreError {
    /// Returns whether the failure means the store itself is unreachable.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::StoreUnavailable(_))
    }
}

impl From<DepartmentValidationError> for StoreError {
    fn from(value: DepartmentValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        match value {
            DbError::Sqlite(err) if is_unavailable_error(&err) => {
                Self::StoreUnavailable(DbError::Sqlite(err))
            }
            other => Self::Db(other),
        }
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::from(DbError::Sqlite(value))
    }
}

/// How many matching records a write statement may touch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchScope {
    /// Only the first match in insertion order.
    First,
    /// Every match.
    All,
}

/// Repository interface for department persistence.
pub trait DepartmentRepository {
    /// Returns matching records in insertion order, up to `limit` rows.
    fn find(&self, filter: &DepartmentFilter, limit: Option<u32>) -> StoreResult<Vec<Department>>;
    /// Counts matching records.
    fn count(&self, filter: &DepartmentFilter) -> StoreResult<u64>;
    /// Persists a draft under a freshly generated identifier.
    fn insert(&self, draft: &NewDepartment) -> StoreResult<Department>;
    /// Applies `patch` to matching records and returns how many changed.
    fn update(
        &self,
        filter: &DepartmentFilter,
        patch: &DepartmentPatch,
        scope: MatchScope,
    ) -> StoreResult<u64>;
    /// Overwrites the stored record with the same id.
    ///
    /// Returns `StoreError::RecordNotFound` when no such record exists.
    fn replace(&self, department: &Department) -> StoreResult<()>;
    /// Deletes matching records and returns the deleted count.
    fn delete(&self, filter: &DepartmentFilter, scope: MatchScope) -> StoreResult<u64>;
}

/// SQLite-backed department repository.
pub struct SqliteDepartmentRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteDepartmentRepository<'conn> {
    /// Wraps a connection opened through `db::open_store`.
    ///
    /// # Errors
    /// - `UninitializedConnection` when migrations were not applied.
    /// - `MissingRequiredTable`/`MissingRequiredColumn` on schema drift.
    pub fn try_new(conn: &'conn Connection) -> StoreResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl DepartmentRepository for SqliteDepartmentRepository<'_> {
    fn find(&self, filter: &DepartmentFilter, limit: Option<u32>) -> StoreResult<Vec<Department>> {
        let (where_sql, mut bind_values) = where_clause(filter);
        let mut sql = format!("{DEPARTMENT_SELECT_SQL}{where_sql} ORDER BY rowid ASC");
        if let Some(limit) = limit {
            sql.push_str(" LIMIT ?");
            bind_values.push(Value::Integer(i64::from(limit)));
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut departments = Vec::new();
        while let Some(row) = rows.next()? {
            departments.push(parse_department_row(row)?);
        }

        Ok(departments)
    }

    fn count(&self, filter: &DepartmentFilter) -> StoreResult<u64> {
        let (where_sql, bind_values) = where_clause(filter);
        let count: i64 = self.conn.query_row(
            &format!("SELECT COUNT(*) FROM departments{where_sql}"),
            params_from_iter(bind_values),
            |row| row.get(0),
        )?;
        Ok(to_count(count))
    }

    fn insert(&self, draft: &NewDepartment) -> StoreResult<Department> {
        let department = Department::with_id(Uuid::new_v4(), draft.name.as_str())?;

        self.conn.execute(
            "INSERT INTO departments (id, name) VALUES (?1, ?2);",
            params![department.id.to_string(), department.name.as_str()],
        )?;

        Ok(department)
    }

    fn update(
        &self,
        filter: &DepartmentFilter,
        patch: &DepartmentPatch,
        scope: MatchScope,
    ) -> StoreResult<u64> {
        let Some(name) = patch.name.as_ref() else {
            return Ok(0);
        };

        // Rows already holding the patched value are matched but not counted.
        let (target_sql, target_values) = target_clause(filter, scope);
        let unchanged_guard = if target_sql.is_empty() {
            " WHERE name IS NOT ?"
        } else {
            " AND name IS NOT ?"
        };
        let mut bind_values = vec![Value::Text(name.clone())];
        bind_values.extend(target_values);
        bind_values.push(Value::Text(name.clone()));

        let changed = self.conn.execute(
            &format!(
                "UPDATE departments SET name = ?, {TOUCH_UPDATED_AT_SQL}{target_sql}{unchanged_guard};"
            ),
            params_from_iter(bind_values),
        )?;

        Ok(changed as u64)
    }

    fn replace(&self, department: &Department) -> StoreResult<()> {
        department.validate()?;

        let changed = self.conn.execute(
            &format!("UPDATE departments SET name = ?1, {TOUCH_UPDATED_AT_SQL} WHERE id = ?2;"),
            params![department.name.as_str(), department.id.to_string()],
        )?;

        if changed == 0 {
            return Err(StoreError::RecordNotFound(department.id));
        }

        Ok(())
    }

    fn delete(&self, filter: &DepartmentFilter, scope: MatchScope) -> StoreResult<u64> {
        let (target_sql, bind_values) = target_clause(filter, scope);
        let changed = self.conn.execute(
            &format!("DELETE FROM departments{target_sql};"),
            params_from_iter(bind_values),
        )?;

        Ok(changed as u64)
    }
}

fn ensure_connection_ready(conn: &Connection) -> StoreResult<()> {
    let expected_version = latest_version();
    let actual_version = current_user_version(conn)?;
    if actual_version != expected_version {
        return Err(StoreError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    let table_exists = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1;",
            [DEPARTMENTS_TABLE],
            |_| Ok(()),
        )
        .optional()?
        .is_some();
    if !table_exists {
        return Err(StoreError::MissingRequiredTable(DEPARTMENTS_TABLE));
    }

    let mut stmt = conn.prepare("SELECT name FROM pragma_table_info(?1);")?;
    let columns = stmt
        .query_map([DEPARTMENTS_TABLE], |row| row.get::<_, String>(0))?
        .collect::<Result<Vec<_>, _>>()?;
    if let Some(column) = REQUIRED_COLUMNS
        .iter()
        .find(|required| !columns.iter().any(|column| column == *required))
    {
        return Err(StoreError::MissingRequiredColumn {
            table: DEPARTMENTS_TABLE,
            column: *column,
        });
    }

    Ok(())
}

/// Builds ` WHERE ...` (or nothing) plus positional bind values.
fn where_clause(filter: &DepartmentFilter) -> (String, Vec<Value>) {
    let mut conditions = Vec::new();
    let mut bind_values = Vec::new();

    if let Some(id) = filter.id {
        conditions.push("id = ?");
        bind_values.push(Value::Text(id.to_string()));
    }
    if let Some(name) = filter.name.as_ref() {
        conditions.push("name = ?");
        bind_values.push(Value::Text(name.clone()));
    }

    if conditions.is_empty() {
        return (String::new(), bind_values);
    }
    (format!(" WHERE {}", conditions.join(" AND ")), bind_values)
}

/// Narrows a write statement to either the first match or all matches.
fn target_clause(filter: &DepartmentFilter, scope: MatchScope) -> (String, Vec<Value>) {
    let (where_sql, bind_values) = where_clause(filter);
    match scope {
        MatchScope::All => (where_sql, bind_values),
        MatchScope::First => (
            format!(
                " WHERE rowid = (SELECT rowid FROM departments{where_sql} ORDER BY rowid ASC LIMIT 1)"
            ),
            bind_values,
        ),
    }
}

fn parse_department_row(row: &Row<'_>) -> StoreResult<Department> {
    let id_text: String = row.get("id")?;
    let id = Uuid::parse_str(&id_text).map_err(|_| {
        StoreError::InvalidData(format!("invalid uuid value `{id_text}` in departments.id"))
    })?;

    let department = Department {
        id,
        name: row.get("name")?,
    };
    department.validate()?;
    Ok(department)
}

fn is_unavailable_error(err: &rusqlite::Error) -> bool {
    match err {
        rusqlite::Error::SqliteFailure(failure, _) => matches!(
            failure.code,
            ErrorCode::CannotOpen
                | ErrorCode::DatabaseBusy
                | ErrorCode::DatabaseLocked
                | ErrorCode::SystemIoFailure
                | ErrorCode::NotADatabase
                | ErrorCode::PermissionDenied
        ),
        _ => false,
    }
}

fn to_count(value: i64) -> u64 {
    u64::try_from(value).unwrap_or(0)
}
