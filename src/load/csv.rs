use crate::error::ParseKind;
use std::fs::File;
use std::path::Path;

use super::Deadline;

/// Signal from the reading loop: a parse problem, or the invocation's time
/// budget ran out mid-file.
#[derive(Debug)]
pub(crate) enum ReadFailure {
    Parse(ParseKind),
    TimedOut,
}

impl From<ParseKind> for ReadFailure {
    fn from(kind: ParseKind) -> Self {
        ReadFailure::Parse(kind)
    }
}

/// A parsed source file: trimmed header names plus rows in file order.
#[derive(Debug, Clone)]
pub struct CsvTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl CsvTable {
    /// Read the whole file into memory, checking the deadline as rows
    /// accumulate. Ragged rows surface as malformed-csv errors.
    pub(crate) fn read(path: &Path, deadline: &Deadline) -> Result<Self, ReadFailure> {
        if !path.is_file() {
            return Err(ParseKind::NotFound.into());
        }
        let file = File::open(path).map_err(|e| ParseKind::Csv(e.into()))?;
        let mut reader = csv::Reader::from_reader(file);

        let headers: Vec<String> = reader
            .headers()
            .map_err(ParseKind::Csv)?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        let mut rows = Vec::new();
        for (i, record) in reader.records().enumerate() {
            if i % 1024 == 0 && deadline.expired() {
                return Err(ReadFailure::TimedOut);
            }
            let record = record.map_err(ParseKind::Csv)?;
            rows.push(record.iter().map(|f| f.to_string()).collect());
        }

        Ok(Self { headers, rows })
    }

    /// Reorder/select each row's fields to match `columns`.
    pub(crate) fn project(&self, columns: &[String]) -> Result<Vec<Vec<String>>, ParseKind> {
        let mut indices = Vec::with_capacity(columns.len());
        for col in columns {
            match self.headers.iter().position(|h| h == col) {
                Some(i) => indices.push(i),
                None => return Err(ParseKind::MissingColumn(col.clone())),
            }
        }
        Ok(self
            .rows
            .iter()
            .map(|row| indices.iter().map(|&i| row[i].clone()).collect())
            .collect())
    }
}
