use rusqlite::Connection;
use rusqlite_migration::{M, Migrations};

const BOOTSTRAP_SQL: &str = include_str!("migrations/0001_bootstrap.sql");

pub const EXPECTED_USER_VERSION: i64 = 1;

pub const REQUIRED_META_KEYS: [&str; 2] = ["schema_version", "ledger_version"];

pub fn run_pending(conn: &mut Connection) -> rusqlite_migration::Result<()> {
    let migrations = Migrations::new(vec![M::up(BOOTSTRAP_SQL)]);
    migrations.to_latest(conn)
}

#[cfg(test)]
mod tests {
    use rusqlite::Connection;

    use super::{EXPECTED_USER_VERSION, run_pending};

    #[test]
    fn migrations_apply_cleanly_and_seed_meta() {
        let connection = Connection::open_in_memory();
        assert!(connection.is_ok());
        if let Ok(mut conn) = connection {
            assert!(run_pending(&mut conn).is_ok());

            let user_version = conn.query_row("PRAGMA user_version", [], |row| row.get::<_, i64>(0));
            assert!(matches!(user_version, Ok(EXPECTED_USER_VERSION)));

            let ledger_version = conn.query_row(
                "SELECT value FROM internal_meta WHERE key = 'ledger_version'",
                [],
                |row| row.get::<_, String>(0),
            );
            assert!(matches!(ledger_version.as_deref(), Ok("0")));
        }
    }

    #[test]
    fn migrations_are_idempotent() {
        let connection = Connection::open_in_memory();
        assert!(connection.is_ok());
        if let Ok(mut conn) = connection {
            assert!(run_pending(&mut conn).is_ok());
            assert!(run_pending(&mut conn).is_ok());
        }
    }
}
