use crate::config::DbConfig;
use crate::error::Error;
use duckdb::Connection;
use tracing::debug;

/// Open a connection to the configured database, creating the file on first
/// use. The caller owns the handle and is responsible for dropping it; there
/// is no pooling and no retry.
pub fn connect(cfg: &DbConfig) -> Result<Connection, Error> {
    let path = cfg.db_path();
    debug!(path = %path.display(), "opening database");
    Connection::open(&path).map_err(|source| Error::Connection {
        database: path.display().to_string(),
        source,
    })
}

/// Open an in-memory database. Used by tests and one-off inspection.
pub fn connect_in_memory() -> Result<Connection, Error> {
    Connection::open_in_memory().map_err(|source| Error::Connection {
        database: ":memory:".to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn connect_creates_the_database_file() {
        let dir = tempdir().unwrap();
        let cfg = DbConfig::at(dir.path(), "sales").unwrap();
        let conn = connect(&cfg).unwrap();
        let one: i64 = conn.query_row("SELECT 1", [], |r| r.get(0)).unwrap();
        assert_eq!(one, 1);
        drop(conn);
        assert!(cfg.db_path().exists());
    }

    #[test]
    fn unreachable_location_is_a_connection_error() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("no-such-subdir");
        let cfg = DbConfig::new("duckdb", &missing, "sales").unwrap();
        let err = connect(&cfg).unwrap_err();
        assert!(matches!(err, Error::Connection { .. }), "got {err:?}");
    }
}
