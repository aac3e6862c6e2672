//! Where the ledger lives on disk and how a connection to it is opened.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use rusqlite::{Connection, ffi::ErrorCode};

use crate::{ClientError, ClientResult};

pub const HOME_ENV_VAR: &str = "MOTOPECAS_HOME";

const DEFAULT_DIR_NAME: &str = ".motopecas";
const LEDGER_FILE: &str = "ledger.db";
const FEE_SCHEDULE_FILE: &str = "fees.json";
const BUSY_TIMEOUT: Duration = Duration::from_millis(250);

/// The directory holding `ledger.db` and the optional `fees.json`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerHome {
    root: PathBuf,
}

impl LedgerHome {
    /// Picks the home in order: explicit path, `MOTOPECAS_HOME`, `~/.motopecas`.
    /// Relative paths are anchored at the working directory.
    pub fn resolve(explicit: Option<&Path>) -> ClientResult<Self> {
        let chosen = explicit
            .map(Path::to_path_buf)
            .or_else(|| std::env::var_os(HOME_ENV_VAR).map(PathBuf::from))
            .or_else(|| home::home_dir().map(|dir| dir.join(DEFAULT_DIR_NAME)))
            .ok_or_else(|| {
                ClientError::ledger_init_failed(
                    Path::new("."),
                    "No home directory is available to hold the ledger.",
                )
            })?;

        if chosen.is_absolute() {
            return Ok(Self { root: chosen });
        }
        let cwd = std::env::current_dir()
            .map_err(|error| ClientError::ledger_init_failed(&chosen, &error.to_string()))?;
        Ok(Self {
            root: cwd.join(chosen),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn db_path(&self) -> PathBuf {
        self.root.join(LEDGER_FILE)
    }

    pub fn fee_schedule_path(&self) -> PathBuf {
        self.root.join(FEE_SCHEDULE_FILE)
    }

    /// Creates the directory if needed and restricts it to the owner on unix.
    pub fn create(&self) -> ClientResult<()> {
        fs::create_dir_all(&self.root).map_err(|error| io_failure(&self.root, &error))?;
        restrict_to_owner(&self.root);
        Ok(())
    }
}

pub fn open_connection(db_path: &Path) -> ClientResult<Connection> {
    let connection = Connection::open(db_path).map_err(|error| sqlite_failure(db_path, &error))?;
    connection
        .busy_timeout(BUSY_TIMEOUT)
        .map_err(|error| sqlite_failure(db_path, &error))?;
    Ok(connection)
}

/// Translates a SQLite failure into the ledger error a caller can act on.
pub fn sqlite_failure(db_path: &Path, error: &rusqlite::Error) -> ClientError {
    match error.sqlite_error_code() {
        Some(ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked) => {
            ClientError::ledger_locked(db_path)
        }
        Some(ErrorCode::NotADatabase) => ClientError::ledger_corrupt(db_path),
        Some(ErrorCode::CannotOpen | ErrorCode::ReadOnly) => {
            ClientError::ledger_init_permission_denied(db_path, &error.to_string())
        }
        _ => ClientError::ledger_init_failed(db_path, &error.to_string()),
    }
}

fn io_failure(path: &Path, error: &io::Error) -> ClientError {
    match error.kind() {
        io::ErrorKind::PermissionDenied => {
            ClientError::ledger_init_permission_denied(path, &error.to_string())
        }
        _ => ClientError::ledger_init_failed(path, &error.to_string()),
    }
}

#[cfg(unix)]
fn restrict_to_owner(path: &Path) {
    use std::os::unix::fs::PermissionsExt;

    // Best effort: a shared mount may refuse chmod.
    let _ = fs::set_permissions(path, fs::Permissions::from_mode(0o700));
}

#[cfg(not(unix))]
fn restrict_to_owner(_path: &Path) {}
