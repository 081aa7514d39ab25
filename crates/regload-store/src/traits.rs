//! Boundary traits for the persistence collaborators.
//!
//! The engine and the writer are the only clients; both take the
//! implementation as an injected parameter so tests can substitute
//! [`crate::MemoryBackend`].

use regload_model::{ExternalId, ImportError, PersistableRow, RecordId};

/// Resolves and records external identifiers.
pub trait IdentifierRegistry {
    /// A plain miss is `None`, never an error.
    fn resolve(&self, id: &ExternalId) -> Option<RecordId>;

    fn register(&mut self, id: &ExternalId, model: &str, record: RecordId);
}

/// Durably stores created records.
pub trait RecordStore {
    fn create(&mut self, model: &str, record: &PersistableRow) -> Result<RecordId, ImportError>;

    /// Commit-cadence hint from the pipeline. No atomicity is implied.
    fn checkpoint(&mut self) -> Result<(), ImportError>;
}
