//! Mapping file loader.
//!
//! A mapping file is a CSV with one row per source column:
//!
//! ```text
//! arbetsgivare.csv,Note,Transformation,TargetField
//! ORGNR,,"",vat
//! KUNDNR,,"external_id,part_emplr_",external_id
//! RADERAD,,"skip_if_j,",deleted_marker
//! ```
//!
//! The first header cell names the entity's data file and varies per entity
//! type, so columns are read positionally. A `TargetField` containing `!` is
//! a commented-out rule and produces no rename. The `Transformation` cell is
//! `"<code>,<parameter>"`, split on the first comma.

use std::collections::BTreeMap;
use std::path::Path;

use tracing::debug;

use regload_model::{ImportError, MappingSpec, TransformCode, TransformRule, TransformSet};

const SOURCE_COLUMN: usize = 0;
const TRANSFORMATION_COLUMN: usize = 2;
const TARGET_COLUMN: usize = 3;
const REQUIRED_COLUMNS: usize = 4;

/// Parses a mapping file into rename rules and transformation rules.
///
/// Transformation rules are keyed by the target field their source column
/// renames to, so the engine can match them against renamed row keys; a rule
/// on a column with no rename keeps its source key and simply never fires.
pub fn load_mapping(path: &Path) -> Result<MappingSpec, ImportError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .map_err(|err| csv_error(path, err))?;

    let header_len = reader
        .headers()
        .map_err(|err| csv_error(path, err))?
        .len();
    if header_len < REQUIRED_COLUMNS {
        return Err(ImportError::MappingHeader {
            path: path.display().to_string(),
            found: header_len,
        });
    }

    let mut source_columns = Vec::new();
    let mut field_map: BTreeMap<String, String> = BTreeMap::new();
    let mut transforms = TransformSet::default();

    for record in reader.records() {
        let record = record.map_err(|err| csv_error(path, err))?;
        let source = record.get(SOURCE_COLUMN).unwrap_or("").trim();
        if source.is_empty() {
            continue;
        }
        let target = record.get(TARGET_COLUMN).unwrap_or("").trim();
        let transformation = record.get(TRANSFORMATION_COLUMN).unwrap_or("").trim();

        let renamed_to = if !target.is_empty() && !target.contains('!') {
            field_map.insert(target.to_string(), source.to_string());
            Some(target.to_string())
        } else {
            None
        };

        if !transformation.is_empty() {
            let rule = parse_rule(path, source, transformation)?;
            let key = renamed_to.unwrap_or_else(|| source.to_string());
            debug!(column = source, key = %key, code = ?rule.code, param = %rule.param, "transformation rule");
            transforms.insert(key, rule);
        }

        source_columns.push(source.to_string());
    }

    debug!(
        path = %path.display(),
        columns = source_columns.len(),
        renames = field_map.len(),
        rules = transforms.len(),
        "mapping loaded"
    );
    Ok(MappingSpec::new(source_columns, field_map, transforms))
}

fn parse_rule(path: &Path, column: &str, cell: &str) -> Result<TransformRule, ImportError> {
    let (code, param) = match cell.split_once(',') {
        Some((code, param)) => (code.trim(), param.trim()),
        None => (cell, ""),
    };
    let code = TransformCode::parse(code).ok_or_else(|| ImportError::UnknownTransform {
        path: path.display().to_string(),
        column: column.to_string(),
        code: code.to_string(),
    })?;
    Ok(TransformRule::new(code, param))
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
