//! In-memory backend for tests and dry runs.

use std::collections::BTreeMap;

use regload_model::{ExternalId, ImportError, PersistableRow, RecordId};

use crate::traits::{IdentifierRegistry, RecordStore};

#[derive(Debug, Clone, PartialEq)]
pub struct CreatedRecord {
    pub id: RecordId,
    pub model: String,
    pub fields: PersistableRow,
}

/// Registry and store in one value, nothing persisted.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    records: Vec<CreatedRecord>,
    identifiers: BTreeMap<String, (String, RecordId)>,
    next_id: i64,
    checkpoints: u64,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-seeds an identifier, e.g. reference data the engine resolves
    /// against (countries, states, taxonomies) or parents from earlier runs.
    pub fn seed(&mut self, id: &ExternalId, record: RecordId) {
        self.identifiers
            .insert(id.to_string(), ("seed".to_string(), record));
    }

    pub fn records(&self) -> &[CreatedRecord] {
        &self.records
    }

    pub fn checkpoints(&self) -> u64 {
        self.checkpoints
    }
}

impl IdentifierRegistry for MemoryBackend {
    fn resolve(&self, id: &ExternalId) -> Option<RecordId> {
        self.identifiers
            .get(&id.to_string())
            .map(|(_, record)| *record)
    }

    fn register(&mut self, id: &ExternalId, model: &str, record: RecordId) {
        self.identifiers
            .insert(id.to_string(), (model.to_string(), record));
    }
}

impl RecordStore for MemoryBackend {
    fn create(&mut self, model: &str, record: &PersistableRow) -> Result<RecordId, ImportError> {
        self.next_id += 1;
        let id = RecordId(self.next_id);
        self.records.push(CreatedRecord {
            id,
            model: model.to_string(),
            fields: record.clone(),
        });
        Ok(id)
    }

    fn checkpoint(&mut self) -> Result<(), ImportError> {
        self.checkpoints += 1;
        Ok(())
    }
}
