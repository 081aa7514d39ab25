//! Command implementations.

use std::collections::BTreeMap;
use std::fs;

use anyhow::{Context, Result, anyhow};
use tracing::{info, info_span};

use regload_core::{check_inputs, run_import};
use regload_model::{ExternalId, MappingSpec, RecordId, RunSummary};
use regload_store::{IdentifierRegistry, JsonStore, MemoryBackend, RecordStore};
use regload_transform::EngineConfig;

use crate::cli::{CheckArgs, ImportArgs, SeedArgs};

pub fn run_import_command(args: &ImportArgs) -> Result<RunSummary> {
    let entity = entity_label(args);
    let span = info_span!("entity", name = %entity);
    let _guard = span.enter();

    let mut config = EngineConfig::default();
    if let Some(module) = &args.module {
        config = config.with_module(module);
    }

    let summary = if args.dry_run {
        info!("dry run, using an in-memory store");
        let mut backend = MemoryBackend::new();
        run_import(&args.mapping, &args.data, config, &mut backend)?
    } else {
        let mut backend = JsonStore::open(&args.store)
            .with_context(|| format!("opening store at {}", args.store.display()))?;
        run_import(&args.mapping, &args.data, config, &mut backend)?
    };
    Ok(summary)
}

pub fn run_check(args: &CheckArgs) -> Result<MappingSpec> {
    let spec = check_inputs(&args.mapping, &args.data)
        .with_context(|| format!("checking {}", args.mapping.display()))?;
    Ok(spec)
}

/// Registers reference identifiers from a JSON file into the store's
/// registry, keyed as `<module>.<name>`, then checkpoints so they survive.
pub fn run_seed(args: &SeedArgs) -> Result<u64> {
    let contents = fs::read_to_string(&args.file)
        .with_context(|| format!("reading {}", args.file.display()))?;
    let entries: BTreeMap<String, i64> = serde_json::from_str(&contents)
        .with_context(|| format!("parsing {}", args.file.display()))?;

    let mut store = JsonStore::open(&args.store)
        .with_context(|| format!("opening store at {}", args.store.display()))?;
    for (key, record) in &entries {
        let (module, name) = key
            .split_once('.')
            .ok_or_else(|| anyhow!("identifier '{key}' is not of the form <module>.<name>"))?;
        store.register(&ExternalId::new(module, name), "reference", RecordId(*record));
    }
    store.checkpoint().context("flushing the identifier registry")?;
    info!(identifiers = entries.len(), store = %args.store.display(), "reference data seeded");
    Ok(entries.len() as u64)
}

fn entity_label(args: &ImportArgs) -> String {
    args.entity.clone().unwrap_or_else(|| {
        args.mapping
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| args.mapping.display().to_string())
    })
}
