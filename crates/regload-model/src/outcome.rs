use crate::{ExternalId, RecordId};

/// Row-level result of one pass through the pipeline. Never escalates to a
/// run-level error; the run continues with the next row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowOutcome {
    Created {
        id: RecordId,
        address: Option<RecordId>,
    },
    /// A skip-class rule matched, or the row named an unsupported country.
    SkippedByRule { field: String, reason: String },
    /// The row's external identifier was already registered.
    SkippedDuplicate(ExternalId),
}
