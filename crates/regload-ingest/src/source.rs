//! Streaming CSV data source.

use std::fs::File;
use std::path::Path;

use tracing::debug;

use regload_model::{ImportError, RawRow};

/// Rows between commit-cadence signals to the store. A durability hint, not
/// a transaction boundary: a fault between checkpoints leaves the file
/// partially applied, and a re-run relies on the duplicate-identifier check.
pub const CHECKPOINT_INTERVAL: u64 = 1000;

/// Forward-only, non-restartable stream of data rows.
///
/// Opening validates that every declared source column is present in the
/// file's header; a miss is fatal for the whole run. The underlying file
/// handle lives for the stream's lifetime and is released when the source
/// drops, on every exit path.
#[derive(Debug)]
pub struct CsvSource {
    reader: csv::Reader<File>,
    header: Vec<String>,
    path: String,
    rows_read: u64,
}

impl CsvSource {
    pub fn open(path: &Path, declared_columns: &[String]) -> Result<Self, ImportError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_path(path)
            .map_err(|err| csv_error(path, err))?;
        let header: Vec<String> = reader
            .headers()
            .map_err(|err| csv_error(path, err))?
            .iter()
            .map(str::to_string)
            .collect();

        for column in declared_columns {
            if !header.iter().any(|h| h == column) {
                return Err(ImportError::MissingColumn {
                    path: path.display().to_string(),
                    column: column.clone(),
                });
            }
        }
        debug!(path = %path.display(), columns = header.len(), "data file header validated");

        Ok(Self {
            reader,
            header,
            path: path.display().to_string(),
            rows_read: 0,
        })
    }

    /// Reads the next data line, or `None` at end of file.
    pub fn next_row(&mut self) -> Result<Option<RawRow>, ImportError> {
        let mut record = csv::StringRecord::new();
        let more = self
            .reader
            .read_record(&mut record)
            .map_err(|err| csv_error(self.path.as_ref(), err))?;
        if !more {
            return Ok(None);
        }
        self.rows_read += 1;
        let row = self
            .header
            .iter()
            .zip(record.iter())
            .map(|(column, value)| (column.clone(), value.to_string()))
            .collect();
        Ok(Some(row))
    }

    pub fn rows_read(&self) -> u64 {
        self.rows_read
    }

    /// True right after every [`CHECKPOINT_INTERVAL`]th row.
    pub fn at_checkpoint(&self) -> bool {
        self.rows_read > 0 && self.rows_read.is_multiple_of(CHECKPOINT_INTERVAL)
    }
}

fn csv_error(path: &Path, err: csv::Error) -> ImportError {
    let path = path.display().to_string();
    if !err.is_io_error() {
        return ImportError::parse(path, err);
    }
    match err.into_kind() {
        csv::ErrorKind::Io(io) => ImportError::Io(io),
        other => ImportError::parse(path, format!("{other:?}")),
    }
}
