use thiserror::Error;

/// Run-fatal failures. Anything softer (skipped rows, reference-lookup
/// misses) is reported through [`crate::RowOutcome`] and the run summary
/// instead of an error.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("mapping file {path}: expected columns [source, note, transformation, target], found {found}")]
    MappingHeader { path: String, found: usize },
    #[error("mapping file {path}: unknown transformation code '{code}' for column '{column}'")]
    UnknownTransform {
        path: String,
        column: String,
        code: String,
    },
    #[error("data file {path}: missing declared column '{column}'")]
    MissingColumn { path: String, column: String },
    #[error("{path}: {message}")]
    Parse { path: String, message: String },
    #[error("store: {0}")]
    Store(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl ImportError {
    pub fn parse(path: impl Into<String>, message: impl ToString) -> Self {
        Self::Parse {
            path: path.into(),
            message: message.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ImportError>;
