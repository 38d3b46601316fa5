//! Bulk CSV-to-table loading with transactional rollback.
//!
//! One [`LoadRequest`] is one unit of work: parse the source file, open a
//! connection, insert every row inside a single transaction, commit. Any
//! failure after the transaction starts rolls the whole load back, so the
//! target table either gains every row of the file or none of them.

pub(crate) mod csv;
pub mod value;

use crate::config::DbConfig;
use crate::db;
use crate::error::{Error, LoadCause};
use duckdb::{params_from_iter, Connection};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::{debug, info};

use self::csv::{CsvTable, ReadFailure};

/// One (file, table, insert statement) unit of work. Immutable for the
/// duration of the invocation.
#[derive(Debug, Clone)]
pub struct LoadRequest {
    pub source: PathBuf,
    pub table: String,
    /// Parameterized insert with one `?` per expected column. Row values are
    /// always bound positionally, never spliced into the statement text.
    pub insert_sql: String,
    /// Columns to pull from the source, in bind order. Empty means the
    /// file's native column order.
    pub columns: Vec<String>,
}

impl LoadRequest {
    pub fn new(
        source: impl Into<PathBuf>,
        table: &str,
        insert_sql: &str,
        columns: &[&str],
    ) -> Self {
        Self {
            source: source.into(),
            table: table.to_string(),
            insert_sql: insert_sql.to_string(),
            columns: columns.iter().map(|c| c.to_string()).collect(),
        }
    }
}

/// Knobs for one load invocation.
#[derive(Debug, Clone)]
pub struct LoadOptions {
    /// Time budget covering file parsing and the insert/commit phase.
    pub timeout: Duration,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(120),
        }
    }
}

/// The invocation's time budget, checked at record granularity while
/// parsing and again before commit.
pub(crate) struct Deadline {
    start: Instant,
    budget: Duration,
}

impl Deadline {
    pub(crate) fn new(budget: Duration) -> Self {
        Self {
            start: Instant::now(),
            budget,
        }
    }

    pub(crate) fn expired(&self) -> bool {
        self.start.elapsed() >= self.budget
    }
}

/// Load `request` with the default options.
pub fn load(cfg: &DbConfig, request: &LoadRequest) -> Result<u64, Error> {
    load_with(cfg, request, &LoadOptions::default())
}

/// Load every row of the source file into the target table, all or nothing.
///
/// Returns the number of rows committed. The source is parsed before any
/// connection is opened, so a bad file never costs a database session. Past
/// that point every failure rolls the transaction back and the error names
/// the table and the underlying cause.
pub fn load_with(
    cfg: &DbConfig,
    request: &LoadRequest,
    options: &LoadOptions,
) -> Result<u64, Error> {
    let deadline = Deadline::new(options.timeout);

    let source = CsvTable::read(&request.source, &deadline)
        .map_err(|failure| read_failure_to_error(request, failure, options.timeout))?;
    let rows = if request.columns.is_empty() {
        source.rows
    } else {
        source.project(&request.columns).map_err(|kind| Error::Parse {
            path: request.source.clone(),
            kind,
        })?
    };
    debug!(table = %request.table, rows = rows.len(), "parsed source file");

    let mut conn = db::connect(cfg)?;
    let count = insert_all(&mut conn, request, &rows, &deadline)?;
    info!(table = %request.table, rows = count, "committed");
    Ok(count)
}

fn read_failure_to_error(request: &LoadRequest, failure: ReadFailure, budget: Duration) -> Error {
    match failure {
        ReadFailure::Parse(kind) => Error::Parse {
            path: request.source.clone(),
            kind,
        },
        ReadFailure::TimedOut => Error::Load {
            table: request.table.clone(),
            cause: LoadCause::Timeout(budget),
        },
    }
}

fn insert_all(
    conn: &mut Connection,
    request: &LoadRequest,
    rows: &[Vec<String>],
    deadline: &Deadline,
) -> Result<u64, Error> {
    // Dropping `tx` without an explicit commit rolls the transaction back,
    // which covers every early return below.
    let tx = conn
        .transaction()
        .map_err(|e| Error::load(&request.table, e))?;

    let mut inserted = 0u64;
    {
        let mut stmt = tx
            .prepare(&request.insert_sql)
            .map_err(|e| Error::load(&request.table, e))?;
        for row in rows {
            stmt.execute(params_from_iter(row.iter().map(|f| value::bind_value(f))))
                .map_err(|e| Error::load(&request.table, e))?;
            inserted += 1;
        }
    }

    if deadline.expired() {
        return Err(Error::Load {
            table: request.table.clone(),
            cause: LoadCause::Timeout(deadline.budget),
        });
    }
    tx.commit().map_err(|e| Error::load(&request.table, e))?;
    Ok(inserted)
}
