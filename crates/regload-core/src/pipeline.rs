//! The import pipeline: streams data rows through rename, normalization and
//! the transformation engine, then persists the results.
//!
//! Each row yields a worklist of at most two records: the primary record and,
//! when the mapping derives one, its visitation address. The address is
//! written after the primary so it can point at the freshly created parent.

use std::path::Path;

use tracing::{debug, info, info_span, warn};

use regload_ingest::CsvSource;
use regload_map::load_mapping;
use regload_model::{
    FieldValue, ImportError, MappingSpec, NormalizedRow, RecordId, RowOutcome, RunSummary,
};
use regload_store::{IdentifierRegistry, RecordStore, WriteOutcome, write_record};
use regload_transform::{AddressRecord, EngineConfig, TransformEngine, normalize};

/// Runs one full import of a data file under its mapping file.
///
/// Row-level problems (skip rules, foreign countries, duplicate identifiers,
/// reference misses) are counted and never abort the run; only structural
/// problems with the mapping, the data file header or the store do.
pub fn run_import<B>(
    mapping_path: &Path,
    data_path: &Path,
    config: EngineConfig,
    backend: &mut B,
) -> Result<RunSummary, ImportError>
where
    B: IdentifierRegistry + RecordStore,
{
    let span = info_span!(
        "import",
        mapping = %mapping_path.display(),
        data = %data_path.display()
    );
    let _guard = span.enter();

    let spec = load_mapping(mapping_path)?;
    let mut source = CsvSource::open(data_path, spec.source_columns())?;
    let engine = TransformEngine::new(config);
    let model = engine.config().model.clone();

    let mut summary = RunSummary::default();
    while let Some(raw) = source.next_row()? {
        summary.rows += 1;
        let row = normalize(spec.rename(&raw), spec.transforms());
        if row.is_empty() {
            debug!(line = source.rows_read(), "row is empty after renaming, skipping");
        } else {
            process_row(backend, &engine, &model, row, &spec, &source, &mut summary)?;
        }

        if source.at_checkpoint() {
            backend.checkpoint()?;
            info!(rows = source.rows_read(), "checkpoint");
        }
    }
    backend.checkpoint()?;

    info!(
        rows = summary.rows,
        created_primary = summary.created_primary,
        created_address = summary.created_address,
        skipped_by_rule = summary.skipped_by_rule,
        skipped_duplicate = summary.skipped_duplicate,
        failed_reference_lookups = summary.failed_reference_lookups,
        "import finished"
    );
    Ok(summary)
}

/// First slot of the row's worklist: resolve and persist the primary record,
/// then chain the derived address when one exists.
fn process_row<B>(
    backend: &mut B,
    engine: &TransformEngine,
    model: &str,
    row: NormalizedRow,
    spec: &MappingSpec,
    source: &CsvSource,
    summary: &mut RunSummary,
) -> Result<(), ImportError>
where
    B: IdentifierRegistry + RecordStore,
{
    match engine.resolve(row, spec.transforms(), backend) {
        Ok(resolution) => {
            summary.failed_reference_lookups += resolution.reference_misses;
            let outcome = match write_record(
                backend,
                model,
                &resolution.record,
                resolution.external_id.as_ref(),
            )? {
                WriteOutcome::Created(id) => {
                    let address = match resolution.address {
                        Some(address) => {
                            write_address(backend, engine, model, id, address, summary)?
                        }
                        None => None,
                    };
                    RowOutcome::Created { id, address }
                }
                WriteOutcome::Duplicate(id) => RowOutcome::SkippedDuplicate(id),
            };
            summary.record_primary(&outcome);
        }
        Err(skip) => {
            warn!(
                line = source.rows_read(),
                field = skip.field(),
                reason = %skip.reason(),
                "row skipped"
            );
            summary.record_primary(&RowOutcome::SkippedByRule {
                field: skip.field().to_string(),
                reason: skip.reason(),
            });
        }
    }
    Ok(())
}

/// Second slot of the row's worklist: the derived address record, parented
/// to the just-created primary record and run through the same resolution
/// path under its own local rule set.
fn write_address<B>(
    backend: &mut B,
    engine: &TransformEngine,
    model: &str,
    parent: RecordId,
    address: AddressRecord,
    summary: &mut RunSummary,
) -> Result<Option<RecordId>, ImportError>
where
    B: IdentifierRegistry + RecordStore,
{
    let AddressRecord { mut row, transforms } = address;
    row.insert("parent_id", FieldValue::Ref(parent));
    let row = normalize(row, &transforms);

    match engine.resolve(row, &transforms, backend) {
        Ok(resolution) => {
            summary.failed_reference_lookups += resolution.reference_misses;
            let outcome = match write_record(
                backend,
                model,
                &resolution.record,
                resolution.external_id.as_ref(),
            )? {
                WriteOutcome::Created(id) => RowOutcome::Created { id, address: None },
                WriteOutcome::Duplicate(id) => RowOutcome::SkippedDuplicate(id),
            };
            summary.record_address(&outcome);
            Ok(match outcome {
                RowOutcome::Created { id, .. } => Some(id),
                _ => None,
            })
        }
        Err(skip) => {
            warn!(field = skip.field(), reason = %skip.reason(), "address record skipped");
            summary.record_address(&RowOutcome::SkippedByRule {
                field: skip.field().to_string(),
                reason: skip.reason(),
            });
            Ok(None)
        }
    }
}

/// Validates the mapping file and the data file header without writing
/// anything. Returns the parsed mapping for reporting.
pub fn check_inputs(mapping_path: &Path, data_path: &Path) -> Result<MappingSpec, ImportError> {
    let spec = load_mapping(mapping_path)?;
    let source = CsvSource::open(data_path, spec.source_columns())?;
    info!(
        mapping = %mapping_path.display(),
        data = %data_path.display(),
        columns = spec.source_columns().len(),
        renames = spec.field_map().len(),
        rules = spec.transforms().len(),
        rows_read = source.rows_read(),
        "inputs validated"
    );
    Ok(spec)
}
