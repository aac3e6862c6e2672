//! Opens the ledger home, applies migrations, and refuses to hand out a
//! database whose shape does not match what the ledger store expects.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use rusqlite::Connection;

use crate::contracts::types::DataRange;
use crate::migrations::{EXPECTED_USER_VERSION, REQUIRED_META_KEYS, run_pending};
use crate::state::{LedgerHome, open_connection, sqlite_failure};
use crate::{ClientError, ClientResult};

/// Columns each internal table must carry; extra columns are tolerated.
const EXPECTED_SHAPE: [(&str, &[&str]); 3] = [
    ("internal_meta", &["key", "value"]),
    (
        "internal_transactions",
        &[
            "seq",
            "txn_id",
            "occurred_on",
            "description",
            "amount",
            "txn_type",
            "employee_id",
            "category",
            "payment_method",
            "installments",
            "created_at",
            "updated_at",
        ],
    ),
    (
        "internal_employees",
        &[
            "seq",
            "employee_id",
            "name",
            "role",
            "fixed_salary",
            "commission_rate",
            "bonus",
            "created_at",
            "updated_at",
        ],
    ),
];

#[derive(Debug, Clone)]
pub struct SetupContext {
    pub home: LedgerHome,
    pub db_path: PathBuf,
    pub fee_schedule_path: PathBuf,
    pub schema_version: String,
    pub data_range: DataRange,
}

/// Prepares the ledger in the default home (`MOTOPECAS_HOME` or `~/.motopecas`).
pub fn ensure_initialized() -> ClientResult<SetupContext> {
    prepare(LedgerHome::resolve(None)?)
}

pub fn ensure_initialized_at(home: &Path) -> ClientResult<SetupContext> {
    prepare(LedgerHome::resolve(Some(home))?)
}

fn prepare(home: LedgerHome) -> ClientResult<SetupContext> {
    home.create()?;
    let db_path = home.db_path();
    let mut connection = open_connection(&db_path)?;

    run_pending(&mut connection).map_err(|error| migration_failure(&db_path, &error))?;

    let inspector = Inspector {
        connection: &connection,
        db_path: &db_path,
    };
    inspector.check_user_version()?;
    inspector.check_tables()?;
    let meta = inspector.meta()?;
    if REQUIRED_META_KEYS.iter().any(|key| !meta.contains_key(*key)) {
        return Err(ClientError::ledger_corrupt(&db_path));
    }
    let data_range = inspector.data_range()?;

    let schema_version = meta
        .get("schema_version")
        .cloned()
        .unwrap_or_else(|| "v1".to_string());
    tracing::debug!(db_path = %db_path.display(), %schema_version, "ledger ready");

    Ok(SetupContext {
        fee_schedule_path: home.fee_schedule_path(),
        home,
        db_path,
        schema_version,
        data_range,
    })
}

/// Locking, corruption and permission problems surface as themselves even
/// when they happen mid-migration.
fn migration_failure(db_path: &Path, error: &rusqlite_migration::Error) -> ClientError {
    if let rusqlite_migration::Error::RusqliteError { err, .. } = error {
        let mapped = sqlite_failure(db_path, err);
        if matches!(
            mapped.code.as_str(),
            "ledger_locked" | "ledger_corrupt" | "ledger_init_permission_denied"
        ) {
            return mapped;
        }
    }
    ClientError::migration_failed(db_path, &error.to_string())
}

struct Inspector<'a> {
    connection: &'a Connection,
    db_path: &'a Path,
}

impl Inspector<'_> {
    fn fail(&self, error: &rusqlite::Error) -> ClientError {
        sqlite_failure(self.db_path, error)
    }

    fn check_user_version(&self) -> ClientResult<()> {
        let user_version = self
            .connection
            .query_row("PRAGMA user_version", [], |row| row.get::<_, i64>(0))
            .map_err(|error| self.fail(&error))?;
        if user_version == EXPECTED_USER_VERSION {
            Ok(())
        } else {
            Err(ClientError::ledger_corrupt(self.db_path))
        }
    }

    /// A dropped table reports no columns, so it fails the same way a
    /// missing column does.
    fn check_tables(&self) -> ClientResult<()> {
        let mut statement = self
            .connection
            .prepare("SELECT name FROM pragma_table_info(?1)")
            .map_err(|error| self.fail(&error))?;

        for (table, expected) in EXPECTED_SHAPE {
            let present = statement
                .query_map([table], |row| row.get::<_, String>(0))
                .map_err(|error| self.fail(&error))?
                .collect::<Result<Vec<String>, _>>()
                .map_err(|error| self.fail(&error))?;

            let missing = expected
                .iter()
                .find(|column| !present.iter().any(|name| name == *column));
            if let Some(column) = missing {
                tracing::warn!(table, column, "ledger table is missing a column");
                return Err(ClientError::ledger_corrupt(self.db_path));
            }
        }
        Ok(())
    }

    fn meta(&self) -> ClientResult<HashMap<String, String>> {
        let mut statement = self
            .connection
            .prepare("SELECT key, value FROM internal_meta")
            .map_err(|error| self.fail(&error))?;
        statement
            .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))
            .map_err(|error| self.fail(&error))?
            .collect::<Result<HashMap<String, String>, _>>()
            .map_err(|error| self.fail(&error))
    }

    fn data_range(&self) -> ClientResult<DataRange> {
        self.connection
            .query_row(
                "SELECT MIN(occurred_on), MAX(occurred_on) FROM internal_transactions",
                [],
                |row| {
                    Ok(DataRange {
                        earliest: row.get(0)?,
                        latest: row.get(1)?,
                    })
                },
            )
            .map_err(|error| self.fail(&error))
    }
}
