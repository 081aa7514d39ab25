use serde::{Deserialize, Serialize};

use crate::RowOutcome;

/// Per-run counts, accumulated row by row and rendered at the end of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Data lines read from the source file.
    pub rows: u64,
    pub created_primary: u64,
    pub created_address: u64,
    pub skipped_by_rule: u64,
    pub skipped_duplicate: u64,
    /// Parent/state/taxonomy lookups that missed; the field was dropped but
    /// the row still went through.
    pub failed_reference_lookups: u64,
}

impl RunSummary {
    pub fn record_primary(&mut self, outcome: &RowOutcome) {
        match outcome {
            RowOutcome::Created { .. } => self.created_primary += 1,
            RowOutcome::SkippedByRule { .. } => self.skipped_by_rule += 1,
            RowOutcome::SkippedDuplicate(_) => self.skipped_duplicate += 1,
        }
    }

    pub fn record_address(&mut self, outcome: &RowOutcome) {
        match outcome {
            RowOutcome::Created { .. } => self.created_address += 1,
            RowOutcome::SkippedByRule { .. } => self.skipped_by_rule += 1,
            RowOutcome::SkippedDuplicate(_) => self.skipped_duplicate += 1,
        }
    }
}
