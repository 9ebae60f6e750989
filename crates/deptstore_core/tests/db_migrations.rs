use deptstore_core::db::migrations::latest_version;
use deptstore_core::db::{close_store, open_db, open_db_in_memory, open_store, DbError};
use deptstore_core::{
    DepartmentFilter, DepartmentStore, NewDepartment, SqliteDepartmentRepository, StoreConfig,
    StoreError,
};
use rusqlite::Connection;

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn), latest_version());
    assert_table_exists(&conn, "departments");
}

#[test]
fn opening_same_database_twice_is_idempotent_and_keeps_data() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("company.db");

    let conn_first = open_db(&path).unwrap();
    {
        let store = DepartmentStore::new(SqliteDepartmentRepository::try_new(&conn_first).unwrap());
        store.insert_one(NewDepartment::new("Finance")).unwrap();
    }
    close_store(conn_first).unwrap();

    let conn_second = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_second), latest_version());
    let store = DepartmentStore::new(SqliteDepartmentRepository::try_new(&conn_second).unwrap());
    assert_eq!(store.count(&DepartmentFilter::all()).unwrap(), 1);
}

#[test]
fn open_store_resolves_file_uri() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("uri.db");
    let config = StoreConfig::new(format!("sqlite://{}", path.display()));

    let conn = open_store(&config).unwrap();
    assert_table_exists(&conn, "departments");
    close_store(conn).unwrap();
    assert!(path.exists());
}

#[test]
fn open_store_rejects_unknown_scheme() {
    let config = StoreConfig::new("mongodb://localhost:27017/companyDBtest");
    assert!(matches!(
        open_store(&config),
        Err(DbError::InvalidConnectionUri(_))
    ));
}

#[test]
fn unreachable_location_maps_to_store_unavailable() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing").join("nested").join("company.db");
    let config = StoreConfig::new(format!("sqlite://{}", path.display()));

    let err = StoreError::from(open_store(&config).unwrap_err());
    assert!(err.is_unavailable(), "unexpected error: {err}");
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    let err = open_db(&path).unwrap_err();
    match err {
        DbError::UnsupportedSchemaVersion {
            db_version,
            latest_supported,
        } => {
            assert_eq!(db_version, 999);
            assert_eq!(latest_supported, latest_version());
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn repository_rejects_uninitialized_connection() {
    let conn = Connection::open_in_memory().unwrap();

    match SqliteDepartmentRepository::try_new(&conn) {
        Err(StoreError::UninitializedConnection {
            expected_version,
            actual_version: 0,
        }) => assert_eq!(expected_version, latest_version()),
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("expected uninitialized connection error"),
    }
}

#[test]
fn repository_rejects_connection_without_departments_table() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(&format!("PRAGMA user_version = {};", latest_version()))
        .unwrap();

    assert!(matches!(
        SqliteDepartmentRepository::try_new(&conn),
        Err(StoreError::MissingRequiredTable("departments"))
    ));
}

#[test]
fn repository_rejects_departments_table_missing_column() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(
        "CREATE TABLE departments (
            id TEXT PRIMARY KEY NOT NULL,
            name TEXT NOT NULL
        );",
    )
    .unwrap();
    conn.execute_batch(&format!("PRAGMA user_version = {};", latest_version()))
        .unwrap();

    assert!(matches!(
        SqliteDepartmentRepository::try_new(&conn),
        Err(StoreError::MissingRequiredColumn {
            table: "departments",
            column: "created_at"
        })
    ));
}

fn schema_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap()
}

fn assert_table_exists(conn: &Connection, table_name: &str) {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = ?1
            );",
            [table_name],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(exists, 1, "table {table_name} does not exist");
}
