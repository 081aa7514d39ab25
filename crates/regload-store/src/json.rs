//! File-backed store for operator runs.
//!
//! Layout inside the store directory:
//! - `records.jsonl`: one JSON object per created record, append-only.
//! - `identifiers.json`: the identifier registry plus the id counter,
//!   rewritten at every checkpoint.
//!
//! A fault between checkpoints can leave records on disk whose identifiers
//! were never flushed; the next run then re-attempts those rows and the
//! duplicate check only catches what the registry knows. Same commit cadence
//! as the pipeline itself.

use std::collections::BTreeMap;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use regload_model::{ExternalId, ImportError, PersistableRow, RecordId};

use crate::traits::{IdentifierRegistry, RecordStore};

const RECORDS_FILE: &str = "records.jsonl";
const IDENTIFIERS_FILE: &str = "identifiers.json";

#[derive(Debug, Serialize)]
struct StoredRecord<'a> {
    id: RecordId,
    model: &'a str,
    fields: &'a PersistableRow,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredIdentifier {
    model: String,
    record: RecordId,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct RegistryState {
    next_id: i64,
    identifiers: BTreeMap<String, StoredIdentifier>,
}

pub struct JsonStore {
    state: RegistryState,
    records: BufWriter<File>,
    identifiers_path: PathBuf,
}

impl JsonStore {
    /// Opens (or initializes) a store directory. Reopening an existing
    /// directory restores the registry, so re-runs deduplicate against
    /// everything a previous run flushed.
    pub fn open(dir: &Path) -> Result<Self, ImportError> {
        std::fs::create_dir_all(dir)?;
        let identifiers_path = dir.join(IDENTIFIERS_FILE);
        let state = if identifiers_path.exists() {
            let contents = std::fs::read_to_string(&identifiers_path)?;
            serde_json::from_str(&contents).map_err(|err| {
                ImportError::Store(format!(
                    "{}: {err}",
                    identifiers_path.display()
                ))
            })?
        } else {
            RegistryState::default()
        };
        let records = OpenOptions::new()
            .create(true)
            .append(true)
            .open(dir.join(RECORDS_FILE))?;
        debug!(
            dir = %dir.display(),
            identifiers = state.identifiers.len(),
            next_id = state.next_id,
            "store opened"
        );
        Ok(Self {
            state,
            records: BufWriter::new(records),
            identifiers_path,
        })
    }

    fn flush_identifiers(&self) -> Result<(), ImportError> {
        let json = serde_json::to_string_pretty(&self.state)
            .map_err(|err| ImportError::Store(err.to_string()))?;
        std::fs::write(&self.identifiers_path, json)?;
        Ok(())
    }
}

impl IdentifierRegistry for JsonStore {
    fn resolve(&self, id: &ExternalId) -> Option<RecordId> {
        self.state
            .identifiers
            .get(&id.to_string())
            .map(|stored| stored.record)
    }

    fn register(&mut self, id: &ExternalId, model: &str, record: RecordId) {
        self.state.identifiers.insert(
            id.to_string(),
            StoredIdentifier {
                model: model.to_string(),
                record,
            },
        );
    }
}

impl RecordStore for JsonStore {
    fn create(&mut self, model: &str, record: &PersistableRow) -> Result<RecordId, ImportError> {
        self.state.next_id += 1;
        let id = RecordId(self.state.next_id);
        let line = serde_json::to_string(&StoredRecord {
            id,
            model,
            fields: record,
        })
        .map_err(|err| ImportError::Store(err.to_string()))?;
        writeln!(self.records, "{line}")?;
        Ok(id)
    }

    fn checkpoint(&mut self) -> Result<(), ImportError> {
        self.records.flush()?;
        self.flush_identifiers()?;
        debug!(identifiers = self.state.identifiers.len(), "checkpoint flushed");
        Ok(())
    }
}
