//! CLI smoke entry point.
//!
//! Opens the store named by the first argument (or `DEPTSTORE_URI`), runs
//! the two-department insert/find/delete cycle and prints the counts.
//! Logs go to `DEPTSTORE_LOG_DIR` (absolute), or `<tmp>/deptstore-logs`,
//! at `DEPTSTORE_LOG_LEVEL` or the build's default level.

use deptstore_core::db::{close_store, open_store};
use deptstore_core::{
    default_log_level, init_logging, DepartmentFilter, DepartmentStore, NewDepartment,
    SqliteDepartmentRepository, StoreConfig,
};
use std::error::Error;
use std::ffi::OsString;
use std::path::PathBuf;
use std::process::ExitCode;

const LOG_DIR_ENV: &str = "DEPTSTORE_LOG_DIR";
const LOG_LEVEL_ENV: &str = "DEPTSTORE_LOG_LEVEL";
const DEFAULT_LOG_SUBDIR: &str = "deptstore-logs";

fn main() -> ExitCode {
    let config = match std::env::args().nth(1) {
        Some(uri) => StoreConfig::new(uri),
        None => StoreConfig::from_env(),
    };

    match run(&config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("deptstore error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(config: &StoreConfig) -> Result<(), Box<dyn Error>> {
    let (log_level, log_dir) = log_settings(
        std::env::var(LOG_LEVEL_ENV).ok(),
        std::env::var_os(LOG_DIR_ENV),
    );
    init_logging(&log_level, &log_dir)?;

    println!("deptstore_core version={}", deptstore_core::core_version());
    println!("connection_uri={}", config.connection_uri);
    println!("log_dir={}", log_dir.display());

    let conn = open_store(config)?;
    {
        let store = DepartmentStore::new(SqliteDepartmentRepository::try_new(&conn)?);
        store.insert_one(NewDepartment::new("Department #1"))?;
        store.insert_one(NewDepartment::new("Department #2"))?;
        println!("find_all count={}", store.find_all()?.len());

        let found = store.find_one(&DepartmentFilter::by_name("Department #2"))?;
        println!(
            "find_one name={}",
            found.map_or_else(|| "<none>".to_string(), |department| department.name)
        );

        println!("delete_many deleted={}", store.delete_many(None)?);
        println!("find_all count={}", store.find_all()?.len());
    }
    close_store(conn)?;
    Ok(())
}

/// Resolves logger level and directory, falling back to build defaults.
fn log_settings(level: Option<String>, dir: Option<OsString>) -> (String, PathBuf) {
    let level = level
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| default_log_level().to_string());
    let dir = dir
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| std::env::temp_dir().join(DEFAULT_LOG_SUBDIR));
    (level, dir)
}
