//! CLI argument definitions for the registry loader.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "regload",
    version,
    about = "Partner registry loader - bulk-import national registry extracts",
    long_about = "Bulk-import national registry CSV extracts into the partner registry.\n\n\
                  Each entity type pairs a data file with a declarative mapping file\n\
                  that renames columns and attaches transformation rules. Re-runs are\n\
                  create-only: rows whose external identifier already exists are skipped."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Import one data file under its mapping file.
    Import(ImportArgs),

    /// Validate a mapping file and a data file header without writing.
    Check(CheckArgs),

    /// Register reference identifiers (countries, states, taxonomies) in a
    /// store so imports can resolve them.
    Seed(SeedArgs),
}

#[derive(Parser)]
pub struct ImportArgs {
    /// Path to the per-entity mapping file (CSV).
    #[arg(value_name = "MAPPING")]
    pub mapping: PathBuf,

    /// Path to the data file (CSV extract).
    #[arg(value_name = "DATA")]
    pub data: PathBuf,

    /// Store directory for created records and the identifier registry.
    #[arg(long = "store", value_name = "DIR", default_value = "store")]
    pub store: PathBuf,

    /// Entity label for logs (default: the mapping file stem).
    #[arg(long = "entity", value_name = "NAME")]
    pub entity: Option<String>,

    /// Identifier namespace for created records.
    #[arg(long = "module", value_name = "NAME")]
    pub module: Option<String>,

    /// Run the full pipeline against an in-memory store; nothing is written.
    #[arg(long = "dry-run")]
    pub dry_run: bool,

    /// Print the run summary as JSON instead of a table.
    #[arg(long = "json")]
    pub json: bool,
}

#[derive(Parser)]
pub struct CheckArgs {
    /// Path to the per-entity mapping file (CSV).
    #[arg(value_name = "MAPPING")]
    pub mapping: PathBuf,

    /// Path to the data file (CSV extract).
    #[arg(value_name = "DATA")]
    pub data: PathBuf,
}

#[derive(Parser)]
pub struct SeedArgs {
    /// JSON file mapping identifiers to record ids,
    /// e.g. {"base.se": 74, "base.state_se_0180": 311}.
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Store directory to register the identifiers in.
    #[arg(long = "store", value_name = "DIR", default_value = "store")]
    pub store: PathBuf,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
