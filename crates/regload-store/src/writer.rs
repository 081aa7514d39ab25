//! Record writer: the duplicate gate in front of the store.

use tracing::{debug, warn};

use regload_model::{ExternalId, ImportError, PersistableRow, RecordId};

use crate::traits::{IdentifierRegistry, RecordStore};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOutcome {
    Created(RecordId),
    /// The external identifier was already registered; no create attempted.
    Duplicate(ExternalId),
}

/// Persists one resolved record, create-only.
///
/// When the record carries an external identifier, an existing registration
/// abandons the write; after a successful create the identifier is
/// registered so later rows and later runs observe it.
pub fn write_record<B>(
    backend: &mut B,
    model: &str,
    record: &PersistableRow,
    external_id: Option<&ExternalId>,
) -> Result<WriteOutcome, ImportError>
where
    B: IdentifierRegistry + RecordStore,
{
    if let Some(id) = external_id
        && let Some(existing) = backend.resolve(id)
    {
        warn!(external_id = %id, record = %existing, "external id already registered, skipping");
        return Ok(WriteOutcome::Duplicate(id.clone()));
    }

    let created = backend.create(model, record)?;
    if let Some(id) = external_id {
        backend.register(id, model, created);
    } else {
        debug!(record = %created, "created without external id, re-runs cannot deduplicate it");
    }
    Ok(WriteOutcome::Created(created))
}
