use crate::error::Error;
use std::env;
use std::path::{Path, PathBuf};

/// Driver identifier used when `DB_DRIVER` is not set.
pub const DEFAULT_DRIVER: &str = "duckdb";

/// Database settings, read once at process start and passed down explicitly.
///
/// `server` is the directory hosting the database file and `database` the
/// file stem; keeping them separate lets deployments relocate storage
/// without renaming the database.
#[derive(Debug, Clone)]
pub struct DbConfig {
    pub driver: String,
    pub server: PathBuf,
    pub database: String,
}

impl DbConfig {
    /// Build and validate a configuration.
    ///
    /// `server` and `database` are required; an empty value is a fatal
    /// configuration error. Only the `duckdb` driver is understood.
    pub fn new(
        driver: impl Into<String>,
        server: impl Into<PathBuf>,
        database: impl Into<String>,
    ) -> Result<Self, Error> {
        let cfg = Self {
            driver: driver.into(),
            server: server.into(),
            database: database.into(),
        };
        if cfg.server.as_os_str().is_empty() || cfg.database.is_empty() {
            return Err(Error::Configuration(
                "DB_SERVER and DB_DATABASE must be set".to_string(),
            ));
        }
        if cfg.driver != DEFAULT_DRIVER {
            return Err(Error::Configuration(format!(
                "unsupported driver `{}`",
                cfg.driver
            )));
        }
        Ok(cfg)
    }

    /// Read `DB_DRIVER`, `DB_SERVER` and `DB_DATABASE` from the environment.
    pub fn from_env() -> Result<Self, Error> {
        let driver = env::var("DB_DRIVER").unwrap_or_else(|_| DEFAULT_DRIVER.to_string());
        let server = env::var("DB_SERVER").unwrap_or_default();
        let database = env::var("DB_DATABASE").unwrap_or_default();
        Self::new(driver, server, database)
    }

    /// Configuration pointing at `dir`, used by tests and one-off tooling.
    pub fn at(dir: &Path, database: &str) -> Result<Self, Error> {
        Self::new(DEFAULT_DRIVER, dir, database)
    }

    /// Filesystem location of the database file.
    pub fn db_path(&self) -> PathBuf {
        self.server.join(format!("{}.duckdb", self.database))
    }
}
