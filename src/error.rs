use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Failures surfaced by the loading pipeline.
///
/// Each variant marks a different operation boundary: `Configuration` aborts
/// the run before any table is touched, `Parse` fires before a connection is
/// opened, and `Load` always means the transaction was rolled back and the
/// target table is untouched.
#[derive(Debug, Error)]
pub enum Error {
    /// A required setting is absent or unusable.
    #[error("configuration: {0}")]
    Configuration(String),

    /// The database could not be opened or the session was rejected.
    #[error("connection: cannot open database `{database}`: {source}")]
    Connection {
        database: String,
        #[source]
        source: duckdb::Error,
    },

    /// The source file is missing, malformed, or lacks an expected column.
    #[error("parse: {}: {kind}", path.display())]
    Parse { path: PathBuf, kind: ParseKind },

    /// Insert or commit failed mid-transaction; everything was rolled back.
    #[error("load into `{table}` failed and was rolled back: {cause}")]
    Load { table: String, cause: LoadCause },
}

/// What went wrong while reading a source file.
#[derive(Debug, Error)]
pub enum ParseKind {
    #[error("file not found")]
    NotFound,

    #[error("malformed csv: {0}")]
    Csv(#[from] csv::Error),

    #[error("missing expected column `{0}`")]
    MissingColumn(String),
}

/// Why a load was rolled back.
#[derive(Debug, Error)]
pub enum LoadCause {
    #[error("{0}")]
    Execute(#[from] duckdb::Error),

    #[error("exceeded time budget of {0:?}")]
    Timeout(Duration),
}

impl Error {
    /// Shorthand used wherever a statement against `table` fails.
    pub fn load(table: &str, source: duckdb::Error) -> Self {
        Error::Load {
            table: table.to_string(),
            cause: LoadCause::Execute(source),
        }
    }
}
